use thiserror::Error;

/// Reasons transcript extraction can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("caption manifest not found on page")]
    ManifestNotFound,

    #[error("no suitable caption track with a fetchable URL")]
    NoSuitableTrack,

    /// Caption server answered with a non-success status
    #[error("HTTP error! status: {0}")]
    FetchError(u16),

    /// Request never produced a status (DNS, TLS, connection reset...)
    #[error("network error: {0}")]
    Network(String),

    #[error("error parsing caption XML: {0}")]
    ParseError(String),
}

impl ExtractError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ExtractError::FetchError(status) => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the messaging layer itself, distinct from extraction failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// No listener is attached to the page (content script not injected)
    #[error("could not connect to page")]
    NotConnected,

    /// The listener went away before replying
    #[error("page closed the channel before responding")]
    NoResponse,

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
