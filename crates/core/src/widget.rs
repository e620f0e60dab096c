use crate::{error::Result, event::Message, view::View};

/// Every loader widget variant implements this trait.
///
/// Lifecycle maps onto any component model:
/// - construction → the widget's own `new(config)`
/// - attachment   → [`FrameWidget::on_attach`]
/// - attribute    → [`FrameWidget::on_config_change`]
///
/// Rendering is handled by hosts (`frame-renderer`, `frame-web`), which only
/// ever consume [`View`]s.
pub trait FrameWidget: std::fmt::Debug {
    /// Unique instance identifier, e.g. `"asteroids"`.
    fn id(&self) -> &str;

    /// Widget kind, e.g. `"wasm-loader"`.
    fn kind(&self) -> &'static str;

    /// Called once when the widget is placed into its host.
    /// Configuration is immutable from here on.
    fn on_attach(&mut self) -> Option<Message> {
        None
    }

    /// Called when a single configuration attribute changes.
    fn on_config_change(&mut self, key: &str, value: &str) -> Result<()>;

    /// Snapshot of the widget in its current state.
    fn view(&self) -> View;
}
