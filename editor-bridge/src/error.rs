use thiserror::Error;

/// Failures that cross the bridge boundary.
///
/// None of these escape to the host as a crash: side-channel failures become
/// a non-acceptance answer to the editor and a call to [`crate::Host::report_error`].
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("host handler `{handler}` is not available")]
    HandlerUnavailable { handler: &'static str },

    #[error("host handler `{handler}` failed: {message}")]
    HandlerFailed {
        handler: &'static str,
        message: String,
    },

    #[error("editor engine construction failed: {0}")]
    EngineConstruction(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("host channel disconnected")]
    Disconnected,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn unavailable(handler: &'static str) -> Self {
        Self::HandlerUnavailable { handler }
    }

    pub fn failed(handler: &'static str, message: impl Into<String>) -> Self {
        Self::HandlerFailed {
            handler,
            message: message.into(),
        }
    }

    /// Name of the host handler involved, when there is one
    pub fn handler(&self) -> Option<&'static str> {
        match self {
            Self::HandlerUnavailable { handler } | Self::HandlerFailed { handler, .. } => {
                Some(handler)
            }
            _ => None,
        }
    }
}

pub type HostResult<T> = Result<T, BridgeError>;
