/// Full-screen entry points a host may expose, most preferred first.
///
/// Browsers historically shipped vendor-prefixed variants; the standard one
/// wins whenever it is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenApi {
    Standard,
    Webkit,
    Moz,
    Ms,
}

impl FullscreenApi {
    pub const PREFERENCE: [FullscreenApi; 4] = [
        FullscreenApi::Standard,
        FullscreenApi::Webkit,
        FullscreenApi::Moz,
        FullscreenApi::Ms,
    ];

    /// Method name on the surface element.
    pub fn method(self) -> &'static str {
        match self {
            Self::Standard => "requestFullscreen",
            Self::Webkit   => "webkitRequestFullscreen",
            Self::Moz      => "mozRequestFullScreen",
            Self::Ms       => "msRequestFullscreen",
        }
    }
}

/// Host side of a full-screen request.
pub trait FullscreenHost {
    fn supports(&self, api: FullscreenApi) -> bool;

    /// Ask the host to make the surface `surface_id` full screen through `api`.
    fn enter(&mut self, api: FullscreenApi, surface_id: &str) -> bool;
}

/// Use the first supported API; no-op when the host exposes none.
pub fn enter_fullscreen(host: &mut dyn FullscreenHost, surface_id: &str) -> bool {
    match FullscreenApi::PREFERENCE.into_iter().find(|api| host.supports(*api)) {
        Some(api) => {
            tracing::debug!("fullscreen via {}", api.method());
            host.enter(api, surface_id)
        }
        None => {
            tracing::debug!("host exposes no fullscreen API");
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Host supporting a fixed set of APIs and recording requests.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingHost {
        pub supported: Vec<FullscreenApi>,
        pub entered:   Vec<(FullscreenApi, String)>,
    }

    impl FullscreenHost for RecordingHost {
        fn supports(&self, api: FullscreenApi) -> bool {
            self.supported.contains(&api)
        }

        fn enter(&mut self, api: FullscreenApi, surface_id: &str) -> bool {
            self.entered.push((api, surface_id.to_string()));
            true
        }
    }

    #[test]
    fn prefers_standard_over_prefixed() {
        let mut host = RecordingHost {
            supported: vec![FullscreenApi::Moz, FullscreenApi::Standard],
            ..RecordingHost::default()
        };
        assert!(enter_fullscreen(&mut host, "c"));
        assert_eq!(host.entered, vec![(FullscreenApi::Standard, "c".to_string())]);
    }

    #[test]
    fn falls_back_to_prefixed_and_noops_without_any() {
        let mut host = RecordingHost {
            supported: vec![FullscreenApi::Webkit],
            ..RecordingHost::default()
        };
        assert!(enter_fullscreen(&mut host, "c"));
        assert_eq!(host.entered[0].0, FullscreenApi::Webkit);

        let mut bare = RecordingHost::default();
        assert!(!enter_fullscreen(&mut bare, "c"));
        assert!(bare.entered.is_empty());
    }
}
