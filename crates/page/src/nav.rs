use frame_config::{NavConfig, NavLink};

/// Picks the navigation link matching the current page.
///
/// An exact path match wins; otherwise the link whose path is the longest
/// segment-wise prefix of the current path (so `/blog` stays active on
/// `/blog/some-article`).  The root link only matches the root itself.
#[derive(Debug, Clone)]
pub struct NavHighlighter {
    config: NavConfig,
}

impl NavHighlighter {
    pub fn new(config: NavConfig) -> Self {
        Self { config }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.config.links
    }

    pub fn active_class(&self) -> &str {
        &self.config.active_class
    }

    /// Index of the active link for `current`, if any.
    pub fn active(&self, current: &str) -> Option<usize> {
        let current = normalize(current);

        if let Some(exact) = self
            .config
            .links
            .iter()
            .position(|l| normalize(&l.href) == current)
        {
            return Some(exact);
        }

        self.config
            .links
            .iter()
            .enumerate()
            .filter_map(|(i, l)| {
                let href = normalize(&l.href);
                let is_section = href != "/"
                    && current
                        .strip_prefix(href.as_str())
                        .is_some_and(|rest| rest.starts_with('/'));
                is_section.then_some((i, href.len()))
            })
            .max_by_key(|(_, len)| *len)
            .map(|(i, _)| i)
    }
}

/// Path component only, without trailing slash (except for the root).
fn normalize(href: &str) -> String {
    let without_origin = match href.find("://") {
        Some(i) => {
            let rest = &href[i + 3..];
            rest.find('/').map_or("/", |p| &rest[p..])
        }
        None => href,
    };
    let path = without_origin
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
