use async_trait::async_trait;
use frame_config::{NavConfig, NavLink, TrackingConfig};
use frame_core::{FrameError, Result as FrameResult};
use frame_page::{
    BeaconSink, ClickTracker, Interaction, NavHighlighter, TrackNode, BEACON_CONTENT_TYPE,
};
use js_sys::Array;
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Blob, BlobPropertyBag, Element, Event, HtmlAnchorElement};

/// Mark the link under `scope` that matches the current location with
/// `active_class`.  Returns the matched `href`, if any.
#[wasm_bindgen]
pub fn highlight_nav(scope: Element, active_class: String) -> Result<Option<String>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let current = window.location().pathname()?;

    let nodes = scope.query_selector_all("a[href]")?;
    let anchors: Vec<HtmlAnchorElement> = (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|n| n.dyn_into().ok())
        .collect();

    let nav = NavHighlighter::new(NavConfig {
        active_class,
        links: anchors
            .iter()
            .map(|a| NavLink {
                label: a.text().unwrap_or_default(),
                href:  a.get_attribute("href").unwrap_or_default(),
            })
            .collect(),
    });
    let Some(index) = nav.active(&current) else {
        return Ok(None);
    };
    anchors[index].class_list().add_1(nav.active_class())?;
    Ok(Some(nav.links()[index].href.clone()))
}

/// Send an interaction beacon for clicks inside `scope` that land on (or
/// near) an element carrying `attribute`.
#[wasm_bindgen]
pub fn track_clicks(
    scope: Element,
    endpoint: String,
    attribute: String,
    max_depth: usize,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let page = window.location().pathname()?;
    let tracker = Rc::new(ClickTracker::new(
        TrackingConfig { enabled: true, endpoint, attribute, max_depth },
        page,
    ));

    let cb = Closure::wrap(Box::new(move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let tracker = Rc::clone(&tracker);
        spawn_local(async move {
            tracker.on_click(&DomNode(target), &Beacon).await;
        });
    }) as Box<dyn FnMut(Event)>);
    scope.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

struct DomNode(Element);

impl TrackNode for DomNode {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent_element().map(DomNode)
    }
}

/// `navigator.sendBeacon`, which outlives page navigation.  The body goes
/// out as a typed blob; a plain string would be sent as `text/plain`.
struct Beacon;

impl Beacon {
    fn blob(interaction: &Interaction) -> FrameResult<Blob> {
        let options = BlobPropertyBag::new();
        options.set_type(BEACON_CONTENT_TYPE);
        let parts = Array::of1(&JsValue::from_str(&interaction.beacon_body()));
        Blob::new_with_str_sequence_and_options(&parts, &options)
            .map_err(|_| FrameError::Page("cannot build beacon body".into()))
    }
}

#[async_trait(?Send)]
impl BeaconSink for Beacon {
    async fn send(&self, endpoint: &str, interaction: &Interaction) -> FrameResult<()> {
        let body = Self::blob(interaction)?;
        let window = web_sys::window().ok_or_else(|| FrameError::Page("no window".into()))?;
        let queued = window
            .navigator()
            .send_beacon_with_opt_blob(endpoint, Some(&body))
            .map_err(|_| FrameError::Page(format!("sendBeacon to {endpoint} threw")))?;
        if !queued {
            return Err(FrameError::Page(format!("beacon to {endpoint} not queued")));
        }
        debug!("beacon {} queued", interaction.action);
        Ok(())
    }
}
