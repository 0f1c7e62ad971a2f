use thiserror::Error;

use crate::state_machine::StateTransitionError;

#[derive(Debug, Error)]
pub enum PipError {
    #[error("element `{selector}` did not appear within {timeout_ms}ms")]
    LocatorTimeout { selector: String, timeout_ms: u64 },
    #[error("rich floating surface is not supported by this host")]
    SurfaceUnsupported,
    #[error("failed to create floating surface: {0}")]
    SurfaceCreation(String),
    #[error("picture-in-picture fallback failed: {0}")]
    FallbackFailed(String),
    #[error("no control found for {0}")]
    ControlTargetMissing(String),
    #[error("command delivery failed: {0}")]
    ChannelDelivery(String),
    #[error("a floating surface is already being opened")]
    OpenInProgress,
    #[error(transparent)]
    Transition(#[from] StateTransitionError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode message: {0}")]
    Json(#[from] serde_json::Error),
}
