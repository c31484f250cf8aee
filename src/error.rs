use thiserror::Error;

use crate::check::Status;

/// Errors that can occur while running the probe.
///
/// Each variant maps to a fixed plugin status via [`ProbeError::status`]:
/// transport trouble is only a WARNING because an infrastructure hiccup is
/// less severe than a confirmed license breach, a rejected login is
/// CRITICAL, and a body the probe cannot read is UNKNOWN.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The HTTP request failed at the transport level (DNS, connect, timeout).
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// The token endpoint rejected the request or returned an unusable body.
    #[error("CRITICAL: {0}")]
    Auth(String),

    /// The Graph API answered with a non-success status.
    #[error("CRITICAL: Graph API request failed with HTTP status {status}")]
    Api { status: u16 },

    /// The Graph API body could not be parsed into the SKU model.
    #[error("UNKNOWN: malformed Graph API response: {0}")]
    Parse(String),

    /// A base URL could not be parsed after normalization.
    #[error("UNKNOWN: invalid URL: {0}")]
    InvalidUrl(String),
}

impl ProbeError {
    /// The plugin status this error terminates the run with.
    pub fn status(&self) -> Status {
        match self {
            Self::Transport(_) => Status::Warning,
            Self::Auth(_) | Self::Api { .. } => Status::Critical,
            Self::Parse(_) | Self::InvalidUrl(_) => Status::Unknown,
        }
    }
}

/// Result type alias for probe operations.
pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
