//! Streaming backend port
//!
//! Defines how the application layer talks to the generation endpoints of
//! the backend. Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use futures::stream::BoxStream;
use ragdash_domain::{FailureKind, Model, SessionFailure};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Stream read error: {0}")]
    StreamRead(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A successful HTTP response whose body reports an error
    #[error("Backend error: {0}")]
    Rejected(String),
}

impl BackendError {
    /// Map to the failure recorded on a stream session.
    pub fn to_failure(&self) -> SessionFailure {
        match self {
            BackendError::Network(msg) => SessionFailure::new(FailureKind::Network, msg.clone()),
            BackendError::HttpStatus { status, message } => {
                SessionFailure::http_status(*status, message.clone())
            }
            BackendError::StreamRead(msg)
            | BackendError::InvalidResponse(msg)
            | BackendError::Rejected(msg) => SessionFailure::stream_read(msg.clone()),
        }
    }
}

/// Response body of a streaming endpoint, one item per received chunk.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, BackendError>>;

/// JSON body of a generation request.
///
/// Plain generation sends the text as `prompt`; retrieval-augmented and agent
/// endpoints expect it as `query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Prompt { prompt: String, model: Model },
    Query { query: String, model: Model },
}

impl RequestBody {
    pub fn text(&self) -> &str {
        match self {
            RequestBody::Prompt { prompt, .. } => prompt,
            RequestBody::Query { query, .. } => query,
        }
    }

    pub fn model(&self) -> &Model {
        match self {
            RequestBody::Prompt { model, .. } | RequestBody::Query { model, .. } => model,
        }
    }
}

/// A POST to a backend path, relative to the configured API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub path: &'static str,
    pub body: RequestBody,
}

/// Result of a non-streaming generation or agent call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Completion {
    pub generated_text: String,
    #[serde(default)]
    pub context_used: Vec<serde_json::Value>,
}

/// Gateway to the backend's generation endpoints
#[async_trait]
pub trait StreamingBackend: Send + Sync {
    /// POST the request and return the response body as a chunk stream.
    ///
    /// A non-success status is reported as [`BackendError::HttpStatus`]
    /// before any chunk is produced.
    async fn open_stream(&self, request: &BackendRequest) -> Result<ByteStream, BackendError>;

    /// POST the request and wait for the whole JSON response.
    async fn complete(&self, request: &BackendRequest) -> Result<Completion, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_body_shape() {
        let body = RequestBody::Prompt {
            prompt: "hello".to_string(),
            model: Model::Llama2,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"prompt": "hello", "model": "llama2"})
        );
    }

    #[test]
    fn test_query_body_shape() {
        let body = RequestBody::Query {
            query: "what is X".to_string(),
            model: Model::Llama32,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"query": "what is X", "model": "llama3.2"})
        );
        assert_eq!(body.text(), "what is X");
    }

    #[test]
    fn test_error_maps_to_failure_kind() {
        let failure = BackendError::HttpStatus {
            status: 500,
            message: "boom".to_string(),
        }
        .to_failure();
        assert_eq!(failure.kind, FailureKind::HttpStatus(500));

        let failure = BackendError::Network("refused".to_string()).to_failure();
        assert_eq!(failure.kind, FailureKind::Network);

        let failure = BackendError::StreamRead("reset".to_string()).to_failure();
        assert_eq!(failure.kind, FailureKind::StreamRead);
    }

    #[test]
    fn test_completion_defaults_context() {
        let completion: Completion =
            serde_json::from_value(serde_json::json!({"generated_text": "Hi"})).unwrap();
        assert_eq!(completion.generated_text, "Hi");
        assert!(completion.context_used.is_empty());
    }
}
