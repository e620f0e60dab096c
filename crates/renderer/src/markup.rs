use frame_core::{Part, PartView, View};
use frame_theme::style::WIDGET_CLASS;
use std::fmt::Write;

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full widget element: root container plus every part.
pub fn render_widget(view: &View) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="{WIDGET_CLASS}" id="{}" data-kind="{}" data-state="{}"{}>"#,
        escape(&view.id),
        view.kind,
        view.state.name(),
        root_style(view),
    );
    html.push_str(&render_parts(view));
    html.push_str("</div>");
    html
}

/// Inner markup only, for hosts that already own the root element.
pub fn render_parts(view: &View) -> String {
    view.parts
        .iter()
        .map(|part| render_part(view, part))
        .collect()
}

fn root_style(view: &View) -> &'static str {
    if view.kind == "wasm-frame" {
        r#" style="aspect-ratio:16/9""#
    } else {
        ""
    }
}

fn render_part(view: &View, part: &PartView) -> String {
    let class = part.part.element_id();
    let mut attrs = String::new();
    for (key, value) in &part.attrs {
        let _ = write!(attrs, r#" {}="{}""#, escape(key), escape(value));
    }
    if !part.visible {
        attrs.push_str(" hidden");
    }
    let text = escape(part.text.as_deref().unwrap_or(""));

    match part.part {
        Part::Cover => format!(r#"<img class="{class}"{attrs}>"#),
        Part::LoadControl | Part::FullscreenControl => {
            format!(r#"<button type="button" class="{class}"{attrs}>{text}</button>"#)
        }
        Part::BusyIndicator => format!(
            r#"<div class="{class}" style="height:{}px"{attrs}>{text}</div>"#,
            view.height
        ),
        Part::Surface if view.kind == "wasm-frame" => format!(
            r#"<iframe class="{class}" style="height:100%"{attrs}></iframe>"#
        ),
        Part::Surface => format!(r#"<canvas class="{class}"{attrs}></canvas>"#),
        Part::ErrorMessage => format!(r#"<p class="{class}" role="alert"{attrs}>{text}</p>"#),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_config::WidgetConfig;
    use frame_core::FrameWidget;
    use frame_widgets::WasmLoaderWidget;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn idle_loader_hides_surface() {
        let widget = WasmLoaderWidget::new(WidgetConfig {
            cover: "/a.png".into(),
            surface: "main-canvas".into(),
            ..WidgetConfig::new("demo", "/a.bin")
        });
        let html = render_widget(&widget.view());

        assert!(html.starts_with(r#"<div class="frame-widget" id="demo" data-kind="wasm-loader" data-state="idle">"#));
        assert!(html.contains(r#"<img class="frame-cover" alt="demo" src="/a.png">"#));
        assert!(html.contains(r#"<canvas class="frame-surface" id="main-canvas" height="480" hidden></canvas>"#));
        assert!(html.contains(r#"<button type="button" class="frame-load">Load &amp; Play</button>"#));
        assert!(html.ends_with("</div>"));
    }
}
