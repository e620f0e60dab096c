pub mod error;
pub mod event;
pub mod state;
pub mod view;
pub mod widget;

pub use error::{BootstrapStage, FrameError, LoadError, Result};
pub use event::Message;
pub use state::{LoadPlan, WidgetState};
pub use view::{Part, PartView, View};
pub use widget::FrameWidget;
