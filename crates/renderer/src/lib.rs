//! Markup host for loader widgets.
//!
//! Renders widget [`View`](frame_core::View)s, and whole pages of them, into
//! static HTML.  The DOM host reuses [`render_parts`] so both hosts emit the
//! same structure.

pub mod markup;

pub use markup::{escape, render_parts, render_widget};

use frame_config::PageConfig;
use frame_page::NavHighlighter;
use frame_theme::{stylesheet, Theme};
use frame_widgets::Widget;
use std::fmt::Write;

/// Describes what a rendered page contains, in document order.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub title:   String,
    pub widgets: Vec<String>,
    pub forms:   Vec<String>,
}

impl PageLayout {
    /// Build a [`PageLayout`] from the loaded configuration.
    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            title:   config.title.clone(),
            widgets: config.widgets.iter().map(|w| w.id.clone()).collect(),
            forms:   config.forms.iter().map(|f| f.id.clone()).collect(),
        }
    }
}

/// Full HTML document: stylesheet, navigation with the link for
/// `current_path` marked active, every widget, and every JSON form.
pub fn render_page(config: &PageConfig, widgets: &[Widget], current_path: &str) -> String {
    let theme = Theme::from_config(&config.theme);
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n",
        escape(&config.title),
        stylesheet(&theme),
    );

    html.push_str(&render_nav(config, current_path));

    html.push_str("<main>\n");
    for widget in widgets {
        html.push_str(&render_widget(&widget.view()));
        html.push('\n');
    }
    for form in &config.forms {
        let _ = write!(
            html,
            r#"<form id="{}" action="{}" method="post" data-json>"#,
            escape(&form.id),
            escape(&form.action)
        );
        for field in &form.fields {
            let _ = write!(html, r#"<input name="{}">"#, escape(field));
        }
        html.push_str("<input type=\"submit\"></form>\n");
    }
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_nav(config: &PageConfig, current_path: &str) -> String {
    if config.nav.links.is_empty() {
        return String::new();
    }
    let nav = NavHighlighter::new(config.nav.clone());
    let active = nav.active(current_path);

    let mut html = String::from("<nav class=\"navbar\">");
    for (i, link) in nav.links().iter().enumerate() {
        let class = if Some(i) == active {
            format!(r#" class="{}""#, escape(nav.active_class()))
        } else {
            String::new()
        };
        let _ = write!(
            html,
            r#"<a href="{}"{class}>{}</a>"#,
            escape(&link.href),
            escape(&link.label)
        );
    }
    html.push_str("</nav>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_config::{NavLink, WidgetConfig};

    #[test]
    fn page_contains_styles_nav_and_widgets() {
        let mut config = PageConfig::default();
        config.title = "Games & demos".into();
        config.nav.links = vec![
            NavLink { label: "Home".into(), href: "/".into() },
            NavLink { label: "Games".into(), href: "/games".into() },
        ];
        config.widgets.push(WidgetConfig::new("asteroids", "/a.bin"));
        let widgets: Vec<Widget> = config.widgets.iter().cloned().map(Widget::from_config).collect();

        let html = render_page(&config, &widgets, "/games/");

        assert!(html.contains("<title>Games &amp; demos</title>"));
        assert!(html.contains(".frame-widget"));
        assert!(html.contains(r#"<a href="/games" class="active">Games</a>"#));
        assert!(html.contains(r#"<a href="/">Home</a>"#));
        assert!(html.contains(r#"id="asteroids""#));
        assert_eq!(PageLayout::from_config(&config).widgets, vec!["asteroids"]);
    }
}
