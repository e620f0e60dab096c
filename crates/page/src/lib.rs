//! Page glue around the loader widgets: JSON form submission, navigation
//! highlighting and click-tracking beacons.
//!
//! Everything here works on explicitly passed configuration and nodes;
//! nothing registers page-wide listeners on its own.

pub mod form;
pub mod nav;
pub mod track;

pub use form::{FormData, FormSubmitter, FormTransport, SubmitControl, SubmitOutcome};
pub use nav::NavHighlighter;
pub use track::{BeaconSink, ClickTracker, Interaction, TrackNode, BEACON_CONTENT_TYPE};

#[cfg(feature = "native")]
pub use http::HttpPoster;

#[cfg(feature = "native")]
mod http {
    use crate::{BeaconSink, FormTransport, Interaction};
    use async_trait::async_trait;
    use frame_core::{FrameError, Result};
    use serde_json::Value;

    /// `reqwest`-backed form transport and beacon sink.
    #[derive(Debug, Clone, Default)]
    pub struct HttpPoster {
        client:   reqwest::Client,
        base_url: String,
    }

    impl HttpPoster {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                client:   reqwest::Client::new(),
                base_url: base_url.into(),
            }
        }

        fn url(&self, path: &str) -> String {
            if path.starts_with("http://") || path.starts_with("https://") {
                return path.to_string();
            }
            format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
        }
    }

    #[async_trait(?Send)]
    impl FormTransport for HttpPoster {
        async fn post_json(&self, action: &str, body: &Value) -> Result<u16> {
            let response = self
                .client
                .post(self.url(action))
                .json(body)
                .send()
                .await
                .map_err(|e| FrameError::Page(format!("POST {action}: {e}")))?;
            Ok(response.status().as_u16())
        }
    }

    #[async_trait(?Send)]
    impl BeaconSink for HttpPoster {
        async fn send(&self, endpoint: &str, interaction: &Interaction) -> Result<()> {
            self.client
                .post(self.url(endpoint))
                .json(interaction)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| FrameError::Page(format!("beacon {endpoint}: {e}")))?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn joins_relative_paths_onto_base() {
            let poster = HttpPoster::new("https://example.org/");
            assert_eq!(poster.url("/interact"), "https://example.org/interact");
            assert_eq!(poster.url("http://x/y"), "http://x/y");
        }
    }
}
