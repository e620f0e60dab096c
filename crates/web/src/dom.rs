use crate::attrs::{config_from_attributes, part_selector};
use crate::console;
use async_trait::async_trait;
use frame_config::WidgetKind;
use frame_core::{BootstrapStage, FrameWidget, LoadError, Part, View};
use frame_loader::{Loader, ModuleBootstrap, Retriever};
use frame_renderer::render_parts;
use frame_theme::style::WIDGET_CLASS;
use frame_widgets::{FullscreenApi, FullscreenHost, Widget};
use js_sys::{Array, Function, Promise, Reflect, Uint8Array};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlElement, Response};

#[wasm_bindgen(start)]
pub fn start() {
    console::init("info");
}

/// Handle returned to JS for a mounted widget element.
#[wasm_bindgen]
pub struct WidgetHandle {
    inner: Rc<Mounted>,
}

#[wasm_bindgen]
impl WidgetHandle {
    /// Current lifecycle state name.
    pub fn state(&self) -> String {
        self.inner.widget.borrow().view().state.name().to_string()
    }

    /// Current state as `{"state": …, "reason": …}`; `reason` only when failed.
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        let state = self.inner.widget.borrow().view().state;
        serde_json::to_string(&state).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Forward an attribute change.  Rejected once the widget is attached.
    #[wasm_bindgen(js_name = attributeChanged)]
    pub fn attribute_changed(&self, key: &str, value: &str) -> Result<(), JsValue> {
        self.inner
            .widget
            .borrow_mut()
            .as_widget_mut()
            .on_config_change(key, value)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[wasm_bindgen(inline_js = "export function import_module(path) { return import(new URL(path, document.baseURI).href); }")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn import_module(path: &str) -> Result<Promise, JsValue>;
}

/// Mount a lazy loader on `root`.
///
/// The hosted build's JS glue, exposing `initSync`, `init` and `run`, is
/// imported from the `script-path` attribute on first activation.  An
/// already imported `module` takes precedence when given.
#[wasm_bindgen]
pub fn mount_loader(root: HtmlElement, module: JsValue) -> Result<WidgetHandle, JsValue> {
    let config = read_config(&root, WidgetKind::WasmLoader)?;
    let source = if !module.is_undefined() && !module.is_null() {
        ModuleSource::Loaded(module)
    } else if let Some(path) = &config.script {
        ModuleSource::Script(path.clone())
    } else {
        return Err(JsValue::from_str(&format!(
            "'{}': no module given and no script-path attribute",
            config.id
        )));
    };
    let loader = Loader::new(
        FetchRetriever,
        config.codec,
        JsModuleBootstrap { source },
    );
    let mounted = Mounted::attach(root, Widget::from_config(config), Some(loader))?;
    mounted.on(Part::LoadControl, "click", Mounted::start_loader)?;
    mounted.on(Part::FullscreenControl, "click", Mounted::fullscreen)?;
    Ok(WidgetHandle { inner: mounted })
}

/// Mount the embedded-frame variant on `root`.
#[wasm_bindgen]
pub fn mount_frame(root: HtmlElement) -> Result<WidgetHandle, JsValue> {
    let config = read_config(&root, WidgetKind::WasmFrame)?;
    let mounted = Mounted::attach(root, Widget::from_config(config), None)?;
    mounted.on(Part::LoadControl, "click", Mounted::start_frame)?;
    mounted.on(Part::Surface, "load", Mounted::frame_loaded)?;
    mounted.on(Part::Surface, "error", Mounted::frame_failed)?;
    mounted.on(Part::FullscreenControl, "click", Mounted::fullscreen)?;
    Ok(WidgetHandle { inner: mounted })
}

fn read_config(
    root: &HtmlElement,
    kind: WidgetKind,
) -> Result<frame_config::WidgetConfig, JsValue> {
    let id = match root.id() {
        id if id.is_empty() => kind.as_str().to_string(),
        id => id,
    };
    let attrs: Vec<(String, String)> = root
        .get_attribute_names()
        .iter()
        .filter_map(|name| name.as_string())
        .filter_map(|name| root.get_attribute(&name).map(|value| (name, value)))
        .collect();
    config_from_attributes(kind, &id, attrs).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_reason(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| Reflect::get(value, &"message".into()).ok()?.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

struct Mounted {
    root:   HtmlElement,
    widget: RefCell<Widget>,
    /// Taken while a load is in flight.
    loader: RefCell<Option<Loader>>,
    /// View last reflected onto the DOM.
    shown:  RefCell<View>,
}

impl Mounted {
    fn attach(
        root: HtmlElement,
        mut widget: Widget,
        loader: Option<Loader>,
    ) -> Result<Rc<Self>, JsValue> {
        root.class_list().add_1(WIDGET_CLASS)?;
        root.set_attribute("data-kind", widget.as_widget().kind())?;
        let initial = widget.view();
        root.set_inner_html(&render_parts(&initial));
        if let Some(msg) = widget.as_widget_mut().on_attach() {
            debug!("{msg:?}");
        }

        let mounted = Rc::new(Self {
            root,
            widget: RefCell::new(widget),
            loader: RefCell::new(loader),
            shown:  RefCell::new(initial),
        });
        mounted.sync();
        Ok(mounted)
    }

    fn part(&self, part: Part) -> Option<HtmlElement> {
        self.root
            .query_selector(&part_selector(part))
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into().ok())
    }

    /// Run `action` whenever `part` fires `event`.  Parts absent from the
    /// markup are skipped.
    fn on(self: &Rc<Self>, part: Part, event: &str, action: fn(&Rc<Self>)) -> Result<(), JsValue> {
        let Some(el) = self.part(part) else {
            return Ok(());
        };
        let this = Rc::clone(self);
        let cb = Closure::wrap(Box::new(move || action(&this)) as Box<dyn FnMut()>);
        el.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
        cb.forget();
        Ok(())
    }

    /// Reflect the current view onto the existing part elements.
    fn sync(&self) {
        let view = self.widget.borrow().view();
        let previous = self.shown.replace(view.clone());
        let _ = self.root.set_attribute("data-state", view.state.name());

        // A failed frame loses its src here, so a retry navigates again.
        for (part, key) in view.dropped_attrs(&previous) {
            if let Some(el) = self.part(part) {
                let _ = el.remove_attribute(&key);
            }
        }
        for part in &view.parts {
            let Some(el) = self.part(part.part) else {
                continue;
            };
            for (key, value) in &part.attrs {
                // Re-assigning an unchanged frame src would reload it.
                if el.get_attribute(key).as_deref() != Some(value.as_str()) {
                    let _ = el.set_attribute(key, value);
                }
            }
            el.set_hidden(!part.visible);
            if let Some(text) = &part.text {
                el.set_text_content(Some(text));
            }
        }
    }

    fn start_loader(self: &Rc<Self>) {
        let Some(mut loader) = self.loader.borrow_mut().take() else {
            debug!("load already in flight");
            return;
        };
        let width = u32::try_from(self.root.client_width()).unwrap_or(0);

        let plan = match &mut *self.widget.borrow_mut() {
            Widget::Loader(w) => w.begin_activation(width),
            Widget::Frame(_) => return,
        };
        let plan = match plan {
            Ok(plan) => plan,
            Err(e) => {
                debug!("{e}");
                self.loader.replace(Some(loader));
                return;
            }
        };
        self.sync();
        if let Some(busy) = self.part(Part::BusyIndicator) {
            busy.scroll_into_view();
        }

        let this = Rc::clone(self);
        spawn_local(async move {
            let outcome = loader.load(&plan).await;
            this.loader.replace(Some(loader));
            if let Widget::Loader(w) = &mut *this.widget.borrow_mut() {
                // Failures are already logged and reflected in the view.
                let _ = w.complete_activation(outcome);
            }
            this.sync();
        });
    }

    fn start_frame(self: &Rc<Self>) {
        let started = match &mut *self.widget.borrow_mut() {
            Widget::Frame(w) => w.activate(),
            Widget::Loader(_) => return,
        };
        match started {
            Ok(src) => {
                info!("embedding {src}");
                self.arm_frame_timeout();
            }
            Err(e) => debug!("{e}"),
        }
        self.sync();
    }

    /// Fail the current frame attempt if no `load` arrives in time; frames
    /// report no `error` for unreachable pages.
    fn arm_frame_timeout(self: &Rc<Self>) {
        let (attempt, secs) = match &*self.widget.borrow() {
            Widget::Frame(w) => (w.attempts(), w.config().frame_timeout_secs),
            Widget::Loader(_) => return,
        };
        if secs == 0 {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };

        let this = Rc::clone(self);
        let cb = Closure::wrap(Box::new(move || {
            let expired = match &mut *this.widget.borrow_mut() {
                Widget::Frame(w) => w.on_load_timeout(attempt),
                Widget::Loader(_) => false,
            };
            if expired {
                this.sync();
            }
        }) as Box<dyn FnMut()>);
        let millis = i32::try_from(u64::from(secs) * 1000).unwrap_or(i32::MAX);
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            millis,
        ) {
            warn!("cannot arm frame timeout: {}", js_reason(&e));
        }
        cb.forget();
    }

    fn frame_loaded(self: &Rc<Self>) {
        if let Widget::Frame(w) = &mut *self.widget.borrow_mut() {
            // An empty frame fires `load` on insertion; the widget ignores it.
            if let Err(e) = w.on_surface_loaded() {
                debug!("{e}");
            }
        }
        self.sync();
    }

    fn frame_failed(self: &Rc<Self>) {
        if let Widget::Frame(w) = &mut *self.widget.borrow_mut() {
            let _ = w.on_surface_error("frame error event");
        }
        self.sync();
    }

    fn fullscreen(self: &Rc<Self>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let mut host = DomFullscreen { document };
        let entered = match &*self.widget.borrow() {
            Widget::Loader(w) => w.request_fullscreen(&mut host),
            Widget::Frame(w) => w.request_fullscreen(&mut host),
        };
        debug!("fullscreen requested: {entered}");
    }
}

/// Fullscreen through whichever request method the browser exposes.
struct DomFullscreen {
    document: Document,
}

impl DomFullscreen {
    fn method(target: &Element, api: FullscreenApi) -> Option<Function> {
        Reflect::get(target, &api.method().into())
            .ok()
            .and_then(|m| m.dyn_into::<Function>().ok())
    }
}

impl FullscreenHost for DomFullscreen {
    fn supports(&self, api: FullscreenApi) -> bool {
        self.document
            .document_element()
            .is_some_and(|root| Self::method(&root, api).is_some())
    }

    fn enter(&mut self, api: FullscreenApi, surface_id: &str) -> bool {
        let Some(surface) = self.document.get_element_by_id(surface_id) else {
            warn!("no surface element #{surface_id}");
            return false;
        };
        match Self::method(&surface, api).map(|m| m.call0(&surface)) {
            Some(Ok(_)) => true,
            Some(Err(e)) => {
                warn!("{} failed: {}", api.method(), js_reason(&e));
                false
            }
            None => false,
        }
    }
}

/// Retrieves payloads with `window.fetch`.
#[derive(Debug)]
struct FetchRetriever;

#[async_trait(?Send)]
impl Retriever for FetchRetriever {
    async fn retrieve(&self, source: &str) -> Result<Vec<u8>, LoadError> {
        let failed = |e: JsValue| LoadError::RetrievalFailed(format!("{source}: {}", js_reason(&e)));

        let window = web_sys::window()
            .ok_or_else(|| LoadError::RetrievalFailed("no window".into()))?;
        let response: Response = JsFuture::from(window.fetch_with_str(source))
            .await
            .map_err(failed)?
            .dyn_into()
            .map_err(failed)?;
        if !response.ok() {
            return Err(LoadError::RetrievalFailed(format!(
                "{source}: HTTP {}",
                response.status()
            )));
        }
        let body = JsFuture::from(response.array_buffer().map_err(failed)?)
            .await
            .map_err(failed)?;
        let bytes = Uint8Array::new(&body).to_vec();
        debug!("fetched {} bytes from {source}", bytes.len());
        Ok(bytes)
    }
}

enum ModuleSource {
    Loaded(JsValue),
    /// Imported on first use; a failed import is retried next activation.
    Script(String),
}

/// Drives the hosted build's JS glue: `initSync(bytes)`, `init()`, then
/// `run(selector, width, height)`.  Returned promises are awaited.
struct JsModuleBootstrap {
    source: ModuleSource,
}

impl std::fmt::Debug for JsModuleBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("JsModuleBootstrap");
        if let ModuleSource::Script(path) = &self.source {
            s.field("script", path);
        }
        s.finish_non_exhaustive()
    }
}

impl JsModuleBootstrap {
    async fn module(&mut self, stage: BootstrapStage) -> Result<JsValue, LoadError> {
        let path = match &self.source {
            ModuleSource::Loaded(module) => return Ok(module.clone()),
            ModuleSource::Script(path) => path.clone(),
        };
        let failed = |e: JsValue| LoadError::BootstrapFailed {
            stage,
            reason: format!("cannot import {path}: {}", js_reason(&e)),
        };

        let promise = import_module(&path).map_err(failed)?;
        let module = JsFuture::from(promise).await.map_err(failed)?;
        debug!("imported {path}");
        self.source = ModuleSource::Loaded(module.clone());
        Ok(module)
    }

    async fn call(&mut self, stage: BootstrapStage, name: &str, args: Array) -> Result<(), LoadError> {
        let module = self.module(stage).await?;
        let failed = |reason: String| LoadError::BootstrapFailed { stage, reason };

        let function: Function = Reflect::get(&module, &name.into())
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| failed(format!("module has no `{name}` export")))?;
        let returned = function
            .apply(&module, &args)
            .map_err(|e| failed(js_reason(&e)))?;
        if let Ok(promise) = returned.dyn_into::<Promise>() {
            JsFuture::from(promise)
                .await
                .map_err(|e| failed(js_reason(&e)))?;
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl ModuleBootstrap for JsModuleBootstrap {
    async fn initialize(&mut self, module: Vec<u8>) -> Result<(), LoadError> {
        let bytes = Uint8Array::from(module.as_slice());
        self.call(BootstrapStage::Initialize, "initSync", Array::of1(&bytes))
            .await
    }

    async fn setup(&mut self) -> Result<(), LoadError> {
        self.call(BootstrapStage::Setup, "init", Array::new()).await
    }

    async fn run(&mut self, selector: &str, width: u32, height: u32) -> Result<(), LoadError> {
        let args = Array::of3(&selector.into(), &width.into(), &height.into());
        self.call(BootstrapStage::Run, "run", args).await
    }
}

