pub mod frame;
pub mod fullscreen;
pub mod loader;

pub use frame::EmbedFrameWidget;
pub use fullscreen::{enter_fullscreen, FullscreenApi, FullscreenHost};
pub use loader::WasmLoaderWidget;

use frame_config::{WidgetConfig, WidgetKind};
use frame_core::{FrameWidget, View};

/// Any widget a page can contain, built from its config block.
#[derive(Debug)]
pub enum Widget {
    Loader(WasmLoaderWidget),
    Frame(EmbedFrameWidget),
}

impl Widget {
    pub fn from_config(config: WidgetConfig) -> Self {
        match config.kind {
            WidgetKind::WasmLoader => Self::Loader(WasmLoaderWidget::new(config)),
            WidgetKind::WasmFrame  => Self::Frame(EmbedFrameWidget::new(config)),
        }
    }

    pub fn as_widget(&self) -> &dyn FrameWidget {
        match self {
            Self::Loader(w) => w,
            Self::Frame(w)  => w,
        }
    }

    pub fn as_widget_mut(&mut self) -> &mut dyn FrameWidget {
        match self {
            Self::Loader(w) => w,
            Self::Frame(w)  => w,
        }
    }

    pub fn view(&self) -> View {
        self.as_widget().view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_variant_from_kind() {
        let loader = Widget::from_config(WidgetConfig::new("a", "/a.bin"));
        assert!(matches!(loader, Widget::Loader(_)));

        let frame = Widget::from_config(WidgetConfig {
            kind: WidgetKind::WasmFrame,
            ..WidgetConfig::new("b", "/b/index.html")
        });
        assert_eq!(frame.view().kind, "wasm-frame");
    }
}
