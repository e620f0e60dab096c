use async_trait::async_trait;
use chrono::{DateTime, Utc};
use frame_config::TrackingConfig;
use frame_core::Result;
use serde::Serialize;
use tracing::{debug, warn};

/// Minimal view of a document node for the ancestor walk.
pub trait TrackNode: Sized {
    fn attribute(&self, name: &str) -> Option<String>;
    fn parent(&self) -> Option<Self>;
}

/// Beacon body sent for a tracked click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub action: String,
    pub page:   String,
    pub at:     DateTime<Utc>,
}

/// Content type beacons are sent with; the endpoint only accepts JSON.
pub const BEACON_CONTENT_TYPE: &str = "application/json";

impl Interaction {
    /// Body of a browser beacon: `{"action": …, "page": …}`.
    pub fn beacon_body(&self) -> String {
        serde_json::json!({ "action": self.action, "page": self.page }).to_string()
    }
}

/// Delivers interaction beacons.
#[async_trait(?Send)]
pub trait BeaconSink {
    async fn send(&self, endpoint: &str, interaction: &Interaction) -> Result<()>;
}

/// Turns clicks on marked elements into interaction beacons.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    config: TrackingConfig,
    page:   String,
}

impl ClickTracker {
    pub fn new(config: TrackingConfig, page: impl Into<String>) -> Self {
        Self { config, page: page.into() }
    }

    /// Marker value on `node` or one of its ancestors.
    ///
    /// Looks at the node itself plus at most `max_depth` ancestors, never
    /// further towards the root.
    pub fn find_action<N: TrackNode>(&self, node: &N) -> Option<String> {
        if let Some(action) = node.attribute(&self.config.attribute) {
            return Some(action);
        }
        let mut current = node.parent();
        for _ in 0..self.config.max_depth {
            let n = current?;
            if let Some(action) = n.attribute(&self.config.attribute) {
                return Some(action);
            }
            current = n.parent();
        }
        None
    }

    /// Handle a click: find the marker and send a beacon.  Delivery is best
    /// effort; failures are logged and never reach the page.
    pub async fn on_click<N: TrackNode>(
        &self,
        node: &N,
        sink: &dyn BeaconSink,
    ) -> Option<Interaction> {
        if !self.config.enabled {
            return None;
        }
        let action = self.find_action(node)?;
        let interaction = Interaction {
            action,
            page: self.page.clone(),
            at:   Utc::now(),
        };
        debug!("track {} on {}", interaction.action, interaction.page);
        if let Err(e) = sink.send(&self.config.endpoint, &interaction).await {
            warn!("beacon to {} failed: {e}", self.config.endpoint);
        }
        Some(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Node in a parent-pointer arena: index into `Tree::nodes`.
    #[derive(Clone)]
    struct Node {
        tree: Rc<Tree>,
        idx:  usize,
    }

    struct Tree {
        /// `(parent, marker)` per node.
        nodes: Vec<(Option<usize>, Option<&'static str>)>,
        visits: RefCell<usize>,
    }

    impl TrackNode for Node {
        fn attribute(&self, name: &str) -> Option<String> {
            *self.tree.visits.borrow_mut() += 1;
            assert_eq!(name, "track");
            self.tree.nodes[self.idx].1.map(str::to_string)
        }

        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.idx]
                .0
                .map(|idx| Node { tree: Rc::clone(&self.tree), idx })
        }
    }

    /// Linear chain of `len` nodes, leaf last; `marker_at` is the index of
    /// the marked node counting from the root.
    fn chain(len: usize, marker_at: Option<usize>) -> Node {
        let nodes = (0..len)
            .map(|i| {
                let parent = i.checked_sub(1);
                let marker = (Some(i) == marker_at).then_some("play-asteroids");
                (parent, marker)
            })
            .collect();
        let tree = Rc::new(Tree { nodes, visits: RefCell::new(0) });
        Node { tree, idx: len - 1 }
    }

    fn tracker() -> ClickTracker {
        ClickTracker::new(TrackingConfig { enabled: true, ..TrackingConfig::default() }, "/")
    }

    #[test]
    fn finds_marker_on_node_or_close_ancestor() {
        assert_eq!(tracker().find_action(&chain(3, Some(2))).as_deref(), Some("play-asteroids"));
        assert_eq!(tracker().find_action(&chain(3, Some(0))).as_deref(), Some("play-asteroids"));
    }

    #[test]
    fn walk_stops_at_depth_cap() {
        // Leaf is index 9; five ancestors reach index 4, index 3 is out of range.
        let leaf = chain(10, Some(3));
        assert_eq!(tracker().find_action(&leaf), None);
        assert_eq!(*leaf.tree.visits.borrow(), 6);

        assert!(tracker().find_action(&chain(10, Some(4))).is_some());
    }

    struct Recorder(RefCell<Vec<(String, String)>>);

    #[async_trait(?Send)]
    impl BeaconSink for Recorder {
        async fn send(&self, endpoint: &str, interaction: &Interaction) -> Result<()> {
            self.0
                .borrow_mut()
                .push((endpoint.to_string(), interaction.action.clone()));
            Err(frame_core::FrameError::Page("offline".into()))
        }
    }

    #[tokio::test]
    async fn click_sends_beacon_and_swallows_failure() {
        let sink = Recorder(RefCell::new(Vec::new()));
        let hit = tracker().on_click(&chain(2, Some(0)), &sink).await;

        assert_eq!(hit.map(|i| i.action).as_deref(), Some("play-asteroids"));
        assert_eq!(
            sink.0.borrow()[0],
            ("/interact".to_string(), "play-asteroids".to_string())
        );
    }

    #[test]
    fn beacon_body_is_json_action_and_page() {
        let interaction = Interaction {
            action: "play-asteroids".into(),
            page:   "/games".into(),
            at:     Utc::now(),
        };
        let body: serde_json::Value = serde_json::from_str(&interaction.beacon_body()).unwrap();
        assert_eq!(body, serde_json::json!({ "action": "play-asteroids", "page": "/games" }));
        assert_eq!(BEACON_CONTENT_TYPE, "application/json");
    }

    #[tokio::test]
    async fn disabled_tracker_sends_nothing() {
        let sink = Recorder(RefCell::new(Vec::new()));
        let tracker = ClickTracker::new(TrackingConfig::default(), "/");
        assert!(tracker.on_click(&chain(1, Some(0)), &sink).await.is_none());
        assert!(sink.0.borrow().is_empty());
    }
}
