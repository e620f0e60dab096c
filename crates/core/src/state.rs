use serde::{Deserialize, Serialize};

/// Lifecycle of a single widget instance.
///
/// ```text
/// Idle ──► Loading ──► Ready
///             │  ▲
///             ▼  │ (retry)
///           Failed
/// ```
///
/// `Ready` is terminal.  Only the owning widget moves between states.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum WidgetState {
    /// Cover and load control visible, surface hidden.
    #[default]
    Idle,
    /// Busy indicator visible while the payload is fetched and bootstrapped.
    Loading,
    /// Surface visible and running.
    Ready,
    /// Last activation attempt failed; carries the user-facing message.
    Failed(String),
}

impl WidgetState {
    /// `true` when `activate()` may start a new attempt from this state.
    ///
    /// `Failed` only counts when the widget was configured to allow retry.
    pub fn can_activate(&self, retry: bool) -> bool {
        match self {
            Self::Idle      => true,
            Self::Failed(_) => retry,
            Self::Loading | Self::Ready => false,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Lower-case name used in logs and in `data-state` attributes.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle      => "idle",
            Self::Loading   => "loading",
            Self::Ready     => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Snapshot of everything the load pipeline needs, taken at activation.
///
/// Later attribute changes cannot affect an attempt already in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    /// Payload locator (URL or local path).
    pub source:   String,
    /// CSS selector of the execution surface, e.g. `#main-canvas`.
    pub selector: String,
    /// Surface width in pixels (declared or measured from layout).
    pub width:    u32,
    /// Declared surface height in pixels.
    pub height:   u32,
}

impl LoadPlan {
    pub fn new(source: impl Into<String>, surface_id: &str, width: u32, height: u32) -> Self {
        Self {
            source:   source.into(),
            selector: format!("#{surface_id}"),
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_and_retryable_failure_can_activate() {
        assert!(WidgetState::Idle.can_activate(false));
        assert!(!WidgetState::Loading.can_activate(true));
        assert!(!WidgetState::Ready.can_activate(true));
        assert!(WidgetState::Failed("x".into()).can_activate(true));
        assert!(!WidgetState::Failed("x".into()).can_activate(false));
    }

    #[test]
    fn plan_prefixes_surface_selector() {
        let plan = LoadPlan::new("/a.bin", "main-canvas", 640, 480);
        assert_eq!(plan.selector, "#main-canvas");
    }

    #[test]
    fn state_json_carries_failure_reason() {
        let failed = WidgetState::Failed("offline".into());
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"state":"failed","reason":"offline"}"#
        );
        assert_eq!(serde_json::to_string(&WidgetState::Idle).unwrap(), r#"{"state":"idle"}"#);

        let back: WidgetState = serde_json::from_str(r#"{"state":"ready"}"#).unwrap();
        assert_eq!(back, WidgetState::Ready);
    }
}
