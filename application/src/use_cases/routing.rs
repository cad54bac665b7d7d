//! Endpoint selection for prompt submissions.
//!
//! | mode | streaming | non-streaming | body |
//! |------|-----------|---------------|------|
//! | Generate | `/api/generate/stream` | `/api/generate` | `{prompt, model}` |
//! | RetrievalAugmented | `/api/rag/stream` | `/api/rag` | `{query, model}` |
//! | Agent | `/api/agent/stream` | `/api/agent/run` | `{query, model}` |

use crate::ports::streaming_backend::{BackendRequest, RequestBody};
use ragdash_domain::{GenerationMode, PromptRequest};

pub const GENERATE_STREAM_PATH: &str = "/api/generate/stream";
pub const RAG_STREAM_PATH: &str = "/api/rag/stream";
pub const AGENT_STREAM_PATH: &str = "/api/agent/stream";
pub const GENERATE_PATH: &str = "/api/generate";
pub const RAG_PATH: &str = "/api/rag";
pub const AGENT_RUN_PATH: &str = "/api/agent/run";

fn body_for(request: &PromptRequest) -> RequestBody {
    let text = request.text().to_string();
    let model = request.model().clone();
    match request.mode() {
        GenerationMode::Generate => RequestBody::Prompt {
            prompt: text,
            model,
        },
        GenerationMode::RetrievalAugmented | GenerationMode::Agent => {
            RequestBody::Query { query: text, model }
        }
    }
}

/// Streaming endpoint and body for a request.
pub fn stream_route(request: &PromptRequest) -> BackendRequest {
    let path = match request.mode() {
        GenerationMode::Generate => GENERATE_STREAM_PATH,
        GenerationMode::RetrievalAugmented => RAG_STREAM_PATH,
        GenerationMode::Agent => AGENT_STREAM_PATH,
    };
    BackendRequest {
        path,
        body: body_for(request),
    }
}

/// Non-streaming endpoint and body for a request.
pub fn completion_route(request: &PromptRequest) -> BackendRequest {
    let path = match request.mode() {
        GenerationMode::Generate => GENERATE_PATH,
        GenerationMode::RetrievalAugmented => RAG_PATH,
        GenerationMode::Agent => AGENT_RUN_PATH,
    };
    BackendRequest {
        path,
        body: body_for(request),
    }
}
