use crate::fullscreen::{enter_fullscreen, FullscreenHost};
use frame_config::WidgetConfig;
use frame_core::{
    FrameError, FrameWidget, LoadError, LoadPlan, Message, Part, PartView, Result, View,
    WidgetState,
};
use frame_loader::Loader;
use tracing::{debug, error, info, warn};

/// Cover image plus a "Load & Play" control that, once pressed, fetches a
/// compressed module, bootstraps it onto a canvas and reveals the canvas.
///
/// Nothing is fetched until [`activate`](Self::activate): pages with many
/// widgets only pay for the ones a visitor actually starts.
#[derive(Debug)]
pub struct WasmLoaderWidget {
    config:   WidgetConfig,
    state:    WidgetState,
    attached: bool,
    attempts: u32,
}

impl WasmLoaderWidget {
    /// Build the inert widget in `Idle`.  No network activity.
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

    /// Number of activation attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run the whole load sequence: `Loading`, the pipeline, then `Ready` or
    /// `Failed`.
    ///
    /// `layout_width` is the surface width measured by the host; a declared
    /// `width` attribute takes precedence.
    pub async fn activate(&mut self, loader: &mut Loader, layout_width: u32) -> Result<()> {
        let plan = self.begin_activation(layout_width)?;
        let outcome = loader.load(&plan).await;
        self.complete_activation(outcome)
    }

    /// First half of [`activate`](Self::activate): check the precondition,
    /// move to `Loading` and freeze the plan for this attempt.
    ///
    /// Hosts that cannot keep the widget borrowed across the pipeline's
    /// suspension points call this, drive the [`Loader`] themselves, then
    /// report back through [`complete_activation`](Self::complete_activation).
    pub fn begin_activation(&mut self, layout_width: u32) -> Result<LoadPlan> {
        if !self.state.can_activate(self.config.retry) {
            warn!(
                "{}: activate ignored in state {}",
                self.config.id,
                self.state.name()
            );
            return Err(FrameError::Widget(format!(
                "'{}' cannot be activated while {}",
                self.config.id,
                self.state.name()
            )));
        }

        self.attempts += 1;
        self.transition(WidgetState::Loading);

        Ok(LoadPlan::new(
            self.config.source.clone(),
            &self.config.surface,
            self.config.width.unwrap_or(layout_width),
            self.config.height,
        ))
    }

    /// Second half of [`activate`](Self::activate): record the pipeline
    /// outcome.
    pub fn complete_activation(&mut self, outcome: std::result::Result<(), LoadError>) -> Result<()> {
        if self.state != WidgetState::Loading {
            return Err(FrameError::Widget(format!(
                "'{}' has no activation in flight",
                self.config.id
            )));
        }

        match outcome {
            Ok(()) => {
                self.transition(WidgetState::Ready);
                Ok(())
            }
            Err(e) => {
                error!("{}: {e}", self.config.id);
                self.transition(WidgetState::Failed(e.user_message()));
                Err(e.into())
            }
        }
    }

    /// Make the surface full screen.  Only effective once `Ready` and when
    /// the fullscreen control is enabled; returns whether a request was made.
    pub fn request_fullscreen(&self, host: &mut dyn FullscreenHost) -> bool {
        if !self.config.fullscreen || !self.state.is_ready() {
            debug!("{}: fullscreen ignored in state {}", self.config.id, self.state.name());
            return false;
        }
        enter_fullscreen(host, &self.config.surface)
    }

    fn transition(&mut self, next: WidgetState) {
        info!("{}: {} → {}", self.config.id, self.state.name(), next.name());
        self.state = next;
    }

    fn visible(&self, part: Part) -> bool {
        part.visible_in(&self.state, self.config.fullscreen, self.config.retry)
    }
}

impl FrameWidget for WasmLoaderWidget {
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

        let load_label = if self.state.is_failed() { "Retry" } else { cfg.load_label() };

        let mut surface = PartView::new(Part::Surface, self.visible(Part::Surface))
            .attr("id", &cfg.surface)
            .attr("height", cfg.height.to_string());
        if let Some(width) = cfg.width {
            surface = surface.attr("width", width.to_string());
        }

        let mut parts = vec![
            cover,
            PartView::new(Part::LoadControl, self.visible(Part::LoadControl)).text(load_label),
            PartView::new(Part::BusyIndicator, self.visible(Part::BusyIndicator)).text("Loading"),
            surface,
        ];
        if cfg.fullscreen {
            parts.push(
                PartView::new(Part::FullscreenControl, self.visible(Part::FullscreenControl))
                    .attr("title", "Fullscreen")
                    .text("⛶"),
            );
        }
        let message = match &self.state {
            WidgetState::Failed(reason) => reason.clone(),
            _ => String::new(),
        };
        parts.push(PartView::new(Part::ErrorMessage, self.visible(Part::ErrorMessage)).text(message));

        View {
            id: cfg.id.clone(),
            kind: self.kind(),
            state: self.state.clone(),
            height: cfg.height,
            parts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fullscreen::{tests::RecordingHost, FullscreenApi};
    use frame_core::BootstrapStage;
    use frame_loader::fake::{Call, CallLog, FakeBootstrap, FakeDecompressor, FakeRetriever};

    fn config() -> WidgetConfig {
        WidgetConfig {
            cover: "/a.png".into(),
            surface: "main-canvas".into(),
            height: 480,
            fullscreen: true,
            ..WidgetConfig::new("demo", "/a.bin")
        }
    }

    fn attached(config: WidgetConfig) -> WasmLoaderWidget {
        let mut widget = WasmLoaderWidget::new(config);
        widget.on_attach();
        widget
    }

    #[test]
    fn fresh_widget_is_idle_with_cover_and_control() {
        let widget = attached(config());
        let view = widget.view();

        assert_eq!(widget.state(), &WidgetState::Idle);
        assert_eq!(view.visible_parts(), vec![Part::Cover, Part::LoadControl]);
        assert!(!view.is_visible(Part::Surface));
        assert_eq!(view.part(Part::Cover).unwrap().get_attr("src"), Some("/a.png"));
    }

    #[tokio::test]
    async fn end_to_end_activation_runs_pipeline_in_order() {
        let log = CallLog::new();
        let mut loader = log.loader(b"B", b"D");
        let mut widget = attached(config());

        widget.activate(&mut loader, 1024).await.unwrap();

        assert_eq!(widget.state(), &WidgetState::Ready);
        assert_eq!(
            log.calls(),
            vec![
                Call::Retrieve("/a.bin".into()),
                Call::Decompress(b"B".to_vec()),
                Call::Initialize(b"D".to_vec()),
                Call::Setup,
                Call::Run("#main-canvas".into(), 1024, 480),
            ]
        );
        let view = widget.view();
        assert_eq!(view.visible_parts(), vec![Part::Surface, Part::FullscreenControl]);
    }

    #[tokio::test]
    async fn declared_width_overrides_layout() {
        let log = CallLog::new();
        let mut loader = log.loader(b"B", b"D");
        let mut widget = attached(WidgetConfig { width: Some(640), ..config() });

        widget.activate(&mut loader, 1024).await.unwrap();

        assert_eq!(log.calls().last(), Some(&Call::Run("#main-canvas".into(), 640, 480)));
    }

    #[tokio::test]
    async fn activate_is_rejected_once_ready() {
        let log = CallLog::new();
        let mut loader = log.loader(b"B", b"D");
        let mut widget = attached(config());
        widget.activate(&mut loader, 800).await.unwrap();

        let err = widget.activate(&mut loader, 800).await.unwrap_err();

        assert!(matches!(err, FrameError::Widget(_)));
        assert_eq!(widget.state(), &WidgetState::Ready);
        assert_eq!(log.calls().len(), 5);
        assert_eq!(widget.attempts(), 1);
    }

    #[test]
    fn activate_is_rejected_while_loading() {
        let mut widget = attached(config());
        widget.begin_activation(800).unwrap();

        assert!(widget.begin_activation(800).is_err());
        assert_eq!(widget.state(), &WidgetState::Loading);
        assert!(widget.view().is_visible(Part::BusyIndicator));
    }

    #[tokio::test]
    async fn retrieval_failure_fails_without_later_calls() {
        let log = CallLog::new();
        let mut loader = Loader::new(
            FakeRetriever::failing(&log, "404"),
            FakeDecompressor::ok(&log, b"D"),
            FakeBootstrap::ok(&log),
        );
        let mut widget = attached(config());

        let err = widget.activate(&mut loader, 800).await.unwrap_err();

        assert!(matches!(err, FrameError::Load(LoadError::RetrievalFailed(_))));
        assert!(widget.state().is_failed());
        assert_eq!(log.calls(), vec![Call::Retrieve("/a.bin".into())]);

        let view = widget.view();
        assert!(view.is_visible(Part::ErrorMessage));
        assert!(!view.is_visible(Part::BusyIndicator));
        assert!(!view.part(Part::ErrorMessage).unwrap().text.as_deref().unwrap_or("").is_empty());
    }

    #[tokio::test]
    async fn decompression_failure_skips_bootstrap() {
        let log = CallLog::new();
        let mut loader = Loader::new(
            FakeRetriever::ok(&log, b"B"),
            FakeDecompressor::failing(&log, "bad header"),
            FakeBootstrap::ok(&log),
        );
        let mut widget = attached(config());

        let err = widget.activate(&mut loader, 800).await.unwrap_err();

        assert!(matches!(err, FrameError::Load(LoadError::DecompressionFailed(_))));
        assert!(widget.state().is_failed());
        assert!(log
            .calls()
            .iter()
            .all(|c| !matches!(c, Call::Initialize(_) | Call::Setup | Call::Run(..))));
    }

    #[tokio::test]
    async fn bootstrap_failure_fails_widget() {
        let log = CallLog::new();
        let mut loader = Loader::new(
            FakeRetriever::ok(&log, b"B"),
            FakeDecompressor::ok(&log, b"D"),
            FakeBootstrap::failing_at(&log, BootstrapStage::Initialize),
        );
        let mut widget = attached(config());

        widget.activate(&mut loader, 800).await.unwrap_err();

        assert!(widget.state().is_failed());
        assert!(!log.calls().contains(&Call::Setup));
    }

    #[tokio::test]
    async fn run_failure_keeps_surface_hidden() {
        let log = CallLog::new();
        let mut loader = Loader::new(
            FakeRetriever::ok(&log, b"B"),
            FakeDecompressor::ok(&log, b"D"),
            FakeBootstrap::failing_at(&log, BootstrapStage::Run),
        );
        let mut widget = attached(config());

        let err = widget.activate(&mut loader, 800).await.unwrap_err();

        assert!(matches!(
            err,
            FrameError::Load(LoadError::BootstrapFailed { stage: BootstrapStage::Run, .. })
        ));
        assert!(widget.state().is_failed());
        assert_eq!(log.calls().last(), Some(&Call::Run("#main-canvas".into(), 800, 480)));

        let view = widget.view();
        assert!(!view.is_visible(Part::Surface));
        assert!(!view.is_visible(Part::FullscreenControl));
        assert!(!view.is_visible(Part::BusyIndicator));
        assert!(view.is_visible(Part::ErrorMessage));
    }

    #[tokio::test]
    async fn retry_from_failed_reruns_pipeline() {
        let log = CallLog::new();
        let mut failing = Loader::new(
            FakeRetriever::failing(&log, "offline"),
            FakeDecompressor::ok(&log, b"D"),
            FakeBootstrap::ok(&log),
        );
        let mut widget = attached(config());
        widget.activate(&mut failing, 800).await.unwrap_err();
        assert_eq!(
            widget.view().part(Part::LoadControl).unwrap().text.as_deref(),
            Some("Retry")
        );

        let retry_log = CallLog::new();
        let mut loader = retry_log.loader(b"B", b"D");
        widget.activate(&mut loader, 800).await.unwrap();

        assert_eq!(widget.state(), &WidgetState::Ready);
        assert_eq!(widget.attempts(), 2);
        assert_eq!(retry_log.calls().len(), 5);
    }

    #[tokio::test]
    async fn failed_widget_without_retry_stays_failed() {
        let log = CallLog::new();
        let mut loader = Loader::new(
            FakeRetriever::failing(&log, "offline"),
            FakeDecompressor::ok(&log, b"D"),
            FakeBootstrap::ok(&log),
        );
        let mut widget = attached(WidgetConfig { retry: false, ..config() });
        widget.activate(&mut loader, 800).await.unwrap_err();

        assert!(widget.activate(&mut loader, 800).await.is_err());
        assert_eq!(log.calls().len(), 1);
        assert!(!widget.view().is_visible(Part::LoadControl));
    }

    #[tokio::test]
    async fn fullscreen_only_when_ready() {
        let mut host = RecordingHost {
            supported: vec![FullscreenApi::Standard],
            ..RecordingHost::default()
        };
        let log = CallLog::new();
        let mut loader = log.loader(b"B", b"D");
        let mut widget = attached(config());

        assert!(!widget.request_fullscreen(&mut host));
        widget.activate(&mut loader, 800).await.unwrap();
        assert!(widget.request_fullscreen(&mut host));
        assert_eq!(host.entered, vec![(FullscreenApi::Standard, "main-canvas".to_string())]);
    }

    #[tokio::test]
    async fn fullscreen_disabled_variant_never_requests() {
        let mut host = RecordingHost {
            supported: vec![FullscreenApi::Standard],
            ..RecordingHost::default()
        };
        let log = CallLog::new();
        let mut loader = log.loader(b"B", b"D");
        let mut widget = attached(WidgetConfig { fullscreen: false, ..config() });
        widget.activate(&mut loader, 800).await.unwrap();

        assert!(!widget.request_fullscreen(&mut host));
        assert!(widget.view().part(Part::FullscreenControl).is_none());
    }

    #[test]
    fn config_changes_apply_until_attached() {
        let mut widget = WasmLoaderWidget::new(config());
        widget.on_config_change("height", "600").unwrap();
        widget.on_config_change("some-attribute", "x").unwrap();
        assert_eq!(widget.config().height, 600);

        widget.on_attach();
        let err = widget.on_config_change("height", "700").unwrap_err();
        assert!(matches!(err, FrameError::Config(_)));
        assert_eq!(widget.config().height, 600);
    }

    #[test]
    fn completing_without_activation_is_an_error() {
        let mut widget = attached(config());
        assert!(widget.complete_activation(Ok(())).is_err());
        assert_eq!(widget.state(), &WidgetState::Idle);
    }
}
