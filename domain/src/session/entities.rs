//! Stream session entity

use super::failure::SessionFailure;
use serde::{Deserialize, Serialize};

/// Identifier of one submission.
///
/// Issued in increasing order by the dispatcher, so the most recent
/// submission always holds the largest id. Comparing a captured id with the
/// current one tells whether a session has been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Lifecycle state of a [`StreamSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "failure", rename_all = "snake_case")]
pub enum SessionState {
    /// Submitted, waiting for the response
    Pending,
    /// At least one chunk has been received
    Streaming,
    /// The stream ended normally
    Completed,
    /// The session ended with an error
    Failed(SessionFailure),
    /// Cancelled by teardown or by the user
    Cancelled,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Pending => "pending",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Failed(_) => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }

    /// Pending or Streaming.
    pub fn is_live(&self) -> bool {
        matches!(self, SessionState::Pending | SessionState::Streaming)
    }
}

/// One prompt/response streaming lifecycle (Entity)
///
/// `accumulated_text` only grows while the session is live. Every transition
/// method is a no-op returning `false` once the session is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSession {
    request_id: RequestId,
    state: SessionState,
    accumulated_text: String,
}

impl StreamSession {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            state: SessionState::Pending,
            accumulated_text: String::new(),
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn is_live(&self) -> bool {
        self.state.is_live()
    }

    pub fn failure(&self) -> Option<&SessionFailure> {
        match &self.state {
            SessionState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Append a decoded delta, moving Pending to Streaming.
    pub fn append(&mut self, delta: &str) -> bool {
        if !self.is_live() {
            return false;
        }
        self.state = SessionState::Streaming;
        self.accumulated_text.push_str(delta);
        true
    }

    pub fn complete(&mut self) -> bool {
        self.finish(SessionState::Completed)
    }

    /// Mark the session failed. Text received so far is kept.
    pub fn fail(&mut self, failure: SessionFailure) -> bool {
        self.finish(SessionState::Failed(failure))
    }

    pub fn cancel(&mut self) -> bool {
        self.finish(SessionState::Cancelled)
    }

    fn finish(&mut self, state: SessionState) -> bool {
        if !self.is_live() {
            return false;
        }
        self.state = state;
        true
    }
}
