use crate::state::WidgetState;

/// Named sub-elements every loader widget exposes.
///
/// Hosts locate parts by [`Part::element_id`] inside the widget root and only
/// ever toggle their visibility; styling is the theme's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Cover,
    LoadControl,
    BusyIndicator,
    Surface,
    FullscreenControl,
    ErrorMessage,
}

impl Part {
    pub const ALL: [Part; 6] = [
        Part::Cover,
        Part::LoadControl,
        Part::BusyIndicator,
        Part::Surface,
        Part::FullscreenControl,
        Part::ErrorMessage,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Self::Cover             => "frame-cover",
            Self::LoadControl       => "frame-load",
            Self::BusyIndicator     => "frame-busy",
            Self::Surface           => "frame-surface",
            Self::FullscreenControl => "frame-fullscreen",
            Self::ErrorMessage      => "frame-error",
        }
    }

    /// Whether this part is shown in `state`.
    ///
    /// `fullscreen` — the widget variant carries a fullscreen control.
    /// `retry`      — the load control comes back as a retry affordance on failure.
    pub fn visible_in(self, state: &WidgetState, fullscreen: bool, retry: bool) -> bool {
        match (self, state) {
            (Self::Cover | Self::LoadControl, WidgetState::Idle) => true,
            (Self::BusyIndicator, WidgetState::Loading)          => true,
            (Self::Surface, WidgetState::Ready)                  => true,
            (Self::FullscreenControl, WidgetState::Ready)        => fullscreen,
            (Self::ErrorMessage, WidgetState::Failed(_))         => true,
            (Self::LoadControl, WidgetState::Failed(_))          => retry,
            _ => false,
        }
    }
}

/// Render-ready description of one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartView {
    pub part:    Part,
    pub visible: bool,
    /// Extra element attributes (`src`, `height`, `id`, …).
    pub attrs:   Vec<(String, String)>,
    /// Text content, if any.
    pub text:    Option<String>,
}

impl PartView {
    pub fn new(part: Part, visible: bool) -> Self {
        Self { part, visible, attrs: Vec::new(), text: None }
    }

    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Everything a host needs to draw a widget in its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Widget instance id (used as the root element id).
    pub id:     String,
    /// Widget kind, e.g. `"wasm-loader"`.
    pub kind:   &'static str,
    pub state:  WidgetState,
    /// Declared height of the widget box in pixels.
    pub height: u32,
    pub parts:  Vec<PartView>,
}

impl View {
    pub fn part(&self, part: Part) -> Option<&PartView> {
        self.parts.iter().find(|p| p.part == part)
    }

    pub fn is_visible(&self, part: Part) -> bool {
        self.part(part).is_some_and(|p| p.visible)
    }

    /// Parts currently shown, in declaration order.
    pub fn visible_parts(&self) -> Vec<Part> {
        self.parts.iter().filter(|p| p.visible).map(|p| p.part).collect()
    }

    /// Attributes `previous` set on a part that this view no longer carries.
    /// Hosts patching elements in place must remove these.
    pub fn dropped_attrs(&self, previous: &View) -> Vec<(Part, String)> {
        previous
            .parts
            .iter()
            .flat_map(|old| {
                let current = self.part(old.part);
                old.attrs
                    .iter()
                    .filter(move |(key, _)| current.and_then(|p| p.get_attr(key)).is_none())
                    .map(move |(key, _)| (old.part, key.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups_visible(state: &WidgetState) -> usize {
        let cover_group = Part::Cover.visible_in(state, true, true)
            && Part::LoadControl.visible_in(state, true, true);
        let busy = Part::BusyIndicator.visible_in(state, true, true);
        let surface = Part::Surface.visible_in(state, true, true);
        [cover_group, busy, surface].iter().filter(|v| **v).count()
    }

    #[test]
    fn exactly_one_group_visible_outside_failure() {
        for state in [WidgetState::Idle, WidgetState::Loading, WidgetState::Ready] {
            assert_eq!(groups_visible(&state), 1, "state {state:?}");
        }
    }

    #[test]
    fn failure_shows_message_and_optional_retry() {
        let failed = WidgetState::Failed("boom".into());
        assert!(Part::ErrorMessage.visible_in(&failed, false, false));
        assert!(!Part::BusyIndicator.visible_in(&failed, false, true));
        assert!(Part::LoadControl.visible_in(&failed, false, true));
        assert!(!Part::LoadControl.visible_in(&failed, false, false));
    }

    fn view(state: WidgetState, surface: PartView) -> View {
        View { id: "w".into(), kind: "wasm-frame", state, height: 480, parts: vec![surface] }
    }

    #[test]
    fn dropped_attrs_lists_keys_missing_from_new_view() {
        let loading = view(
            WidgetState::Loading,
            PartView::new(Part::Surface, false).attr("id", "f").attr("src", "/g.html"),
        );
        let failed = view(
            WidgetState::Failed("x".into()),
            PartView::new(Part::Surface, false).attr("id", "f"),
        );

        assert_eq!(failed.dropped_attrs(&loading), vec![(Part::Surface, "src".to_string())]);
        assert!(loading.dropped_attrs(&failed).is_empty());
        assert!(loading.dropped_attrs(&loading).is_empty());
    }

    #[test]
    fn fullscreen_control_only_when_ready_and_enabled() {
        assert!(Part::FullscreenControl.visible_in(&WidgetState::Ready, true, false));
        assert!(!Part::FullscreenControl.visible_in(&WidgetState::Ready, false, false));
        assert!(!Part::FullscreenControl.visible_in(&WidgetState::Loading, true, false));
    }
}
