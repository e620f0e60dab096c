use crate::fullscreen::{enter_fullscreen, FullscreenHost};
use frame_config::WidgetConfig;
use frame_core::{FrameError, FrameWidget, Message, Part, PartView, Result, View, WidgetState};
use tracing::{debug, error, info, warn};

/// Variant whose surface is an embedded frame pointed at a page that boots
/// its own module.
///
/// Activation only assigns the frame source; the host reports back through
/// [`on_surface_loaded`](Self::on_surface_loaded) or
/// [`on_surface_error`](Self::on_surface_error).  Frames never report
/// network failures, so the host also arms a timer and reports expiry through
/// [`on_load_timeout`](Self::on_load_timeout).  Always offers fullscreen.
#[derive(Debug)]
pub struct EmbedFrameWidget {
    config:   WidgetConfig,
    state:    WidgetState,
    attached: bool,
    attempts: u32,
}

impl EmbedFrameWidget {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            state:    WidgetState::Idle,
            attached: false,
            attempts: 0,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Number of activations started so far; identifies the current load.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Move to `Loading` and return the source the host must assign to the
    /// frame.
    pub fn activate(&mut self) -> Result<String> {
        if !self.state.can_activate(self.config.retry) {
            warn!("{}: activate ignored in state {}", self.config.id, self.state.name());
            return Err(FrameError::Widget(format!(
                "'{}' cannot be activated while {}",
                self.config.id,
                self.state.name()
            )));
        }
        self.attempts += 1;
        self.transition(WidgetState::Loading);
        Ok(self.config.source.clone())
    }

    pub fn on_surface_loaded(&mut self) -> Result<()> {
        self.expect_loading()?;
        self.transition(WidgetState::Ready);
        Ok(())
    }

    pub fn on_surface_error(&mut self, reason: &str) -> Result<()> {
        self.expect_loading()?;
        error!("{}: embedded frame failed: {reason}", self.config.id);
        self.transition(WidgetState::Failed(
            "The embedded game could not be loaded.".to_string(),
        ));
        Ok(())
    }

    /// Timer armed for activation `attempt` expired.  Fails the widget when
    /// that load is still in flight; returns whether it did.
    pub fn on_load_timeout(&mut self, attempt: u32) -> bool {
        if attempt != self.attempts || self.state != WidgetState::Loading {
            debug!("{}: stale load timer for attempt {attempt}", self.config.id);
            return false;
        }
        let reason = format!("no load event after {}s", self.config.frame_timeout_secs);
        self.on_surface_error(&reason).is_ok()
    }

    pub fn request_fullscreen(&self, host: &mut dyn FullscreenHost) -> bool {
        if !self.state.is_ready() {
            debug!("{}: fullscreen ignored in state {}", self.config.id, self.state.name());
            return false;
        }
        enter_fullscreen(host, &self.config.surface)
    }

    fn expect_loading(&self) -> Result<()> {
        if self.state == WidgetState::Loading {
            Ok(())
        } else {
            Err(FrameError::Widget(format!(
                "'{}' has no frame load in flight",
                self.config.id
            )))
        }
    }

    fn transition(&mut self, next: WidgetState) {
        info!("{}: {} → {}", self.config.id, self.state.name(), next.name());
        self.state = next;
    }

    fn visible(&self, part: Part) -> bool {
        part.visible_in(&self.state, true, self.config.retry)
    }
}

impl FrameWidget for EmbedFrameWidget {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn kind(&self) -> &'static str {
        self.config.kind.as_str()
    }

    fn on_attach(&mut self) -> Option<Message> {
        self.attached = true;
        Some(Message::Attached(self.config.id.clone()))
    }

    fn on_config_change(&mut self, key: &str, value: &str) -> Result<()> {
        if self.attached {
            return Err(FrameError::Config(format!(
                "'{}': attribute '{key}' is immutable once attached",
                self.config.id
            )));
        }
        if !self.config.apply_attribute(key, value)? {
            debug!("{}: ignoring unobserved attribute '{key}'", self.config.id);
        }
        Ok(())
    }

    fn view(&self) -> View {
        let cfg = &self.config;

        let mut cover = PartView::new(Part::Cover, self.visible(Part::Cover)).attr("alt", &cfg.id);
        if !cfg.cover.is_empty() {
            cover = cover.attr("src", &cfg.cover);
        }

        // The frame only receives its source once activated, and loses it on
        // failure so a retry navigates again.
        let mut surface = PartView::new(Part::Surface, self.visible(Part::Surface))
            .attr("id", &cfg.surface);
        if matches!(self.state, WidgetState::Loading | WidgetState::Ready) {
            surface = surface.attr("src", &cfg.source);
        }

        let label = if self.state.is_failed() { "Retry" } else { cfg.load_label() };
        let message = match &self.state {
            WidgetState::Failed(reason) => reason.clone(),
            _ => String::new(),
        };

        View {
            id: cfg.id.clone(),
            kind: self.kind(),
            state: self.state.clone(),
            height: cfg.height,
            parts: vec![
                cover,
                PartView::new(Part::LoadControl, self.visible(Part::LoadControl)).text(label),
                PartView::new(Part::BusyIndicator, self.visible(Part::BusyIndicator))
                    .text("Loading"),
                surface,
                PartView::new(Part::FullscreenControl, self.visible(Part::FullscreenControl))
                    .attr("title", "Fullscreen")
                    .text("⛶"),
                PartView::new(Part::ErrorMessage, self.visible(Part::ErrorMessage)).text(message),
            ],
        }
    }
}
