//! Terminal failure of a stream session

use serde::{Deserialize, Serialize};

/// Category of a session failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum FailureKind {
    /// The request never reached the backend, or no response came back
    Network,
    /// The backend answered with a non-success status code
    HttpStatus(u16),
    /// Reading or decoding the body failed mid-stream
    StreamRead,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Network => "network",
            FailureKind::HttpStatus(_) => "http_status",
            FailureKind::StreamRead => "stream_read",
        }
    }
}

/// Why a session ended in [`SessionState::Failed`](super::entities::SessionState::Failed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SessionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Network, message)
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(FailureKind::HttpStatus(status), message)
    }

    pub fn stream_read(message: impl Into<String>) -> Self {
        Self::new(FailureKind::StreamRead, message)
    }
}

impl std::fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FailureKind::HttpStatus(status) => write!(f, "HTTP {}: {}", status, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}
