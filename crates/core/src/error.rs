use std::fmt;
use thiserror::Error;

/// Top-level error type used across the entire workspace.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("config error: {0}")]
    Config(String),

    #[error("widget error: {0}")]
    Widget(String),

    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("page error: {0}")]
    Page(String),
}

pub type Result<T, E = FrameError> = std::result::Result<T, E>;

/// Why a single activation attempt failed.
///
/// Every variant is terminal for the attempt: the widget moves to
/// `WidgetState::Failed` and nothing after the failing step runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Network / HTTP / filesystem failure while fetching the payload.
    #[error("could not retrieve payload: {0}")]
    RetrievalFailed(String),

    /// The payload did not decode with the configured codec.
    #[error("could not decompress payload: {0}")]
    DecompressionFailed(String),

    /// The module rejected one of its bootstrap calls.
    #[error("module {stage} failed: {reason}")]
    BootstrapFailed {
        stage:  BootstrapStage,
        reason: String,
    },
}

impl LoadError {
    /// Short message suitable for showing to the user in place of the
    /// busy indicator.
    pub fn user_message(&self) -> String {
        match self {
            Self::RetrievalFailed(_) => {
                "Could not download the game. Check your connection and try again.".to_string()
            }
            Self::DecompressionFailed(_) => {
                "The downloaded game data is damaged. Try again later.".to_string()
            }
            Self::BootstrapFailed { .. } => {
                "The game failed to start in this browser.".to_string()
            }
        }
    }
}

/// The three ordered calls of the module-initialization contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    Initialize,
    Setup,
    Run,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initialize => "initialize",
            Self::Setup      => "setup",
            Self::Run        => "run",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_error_names_its_stage() {
        let err = LoadError::BootstrapFailed {
            stage:  BootstrapStage::Setup,
            reason: "init() rejected".into(),
        };
        assert_eq!(err.to_string(), "module setup failed: init() rejected");
    }

    #[test]
    fn load_error_converts_into_frame_error() {
        let err: FrameError = LoadError::RetrievalFailed("404".into()).into();
        assert!(matches!(err, FrameError::Load(LoadError::RetrievalFailed(_))));
    }
}
