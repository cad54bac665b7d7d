//! JSON shapes exchanged with the backend that never leave this module.

use ragdash_application::{BackendError, Completion};
use ragdash_domain::{ContextDocument, ContextDraft};
use serde::Deserialize;
use serde_json::Value;

/// `GET /api/context`, Elasticsearch hits as returned by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ContextListResponse {
    #[serde(default)]
    pub contexts: Vec<ContextHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContextHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: ContextSource,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContextSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl From<ContextHit> for ContextDocument {
    fn from(hit: ContextHit) -> Self {
        ContextDocument::new(
            hit.id,
            ContextDraft::new(hit.source.title, hit.source.content),
        )
    }
}

/// `POST /api/context`
#[derive(Debug, Deserialize)]
pub(crate) struct CreateContextResponse {
    pub id: String,
}

/// `POST /api/generate`, `/api/rag` and `/api/agent/run`.
///
/// Generation endpoints answer with `generated_text`; the agent answers with
/// `response`, or with `error` and a 200 status when the run itself failed.
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    pub generated_text: Option<String>,
    #[serde(default)]
    pub context_used: Vec<Value>,
    pub response: Option<Value>,
    pub error: Option<String>,
}

impl CompletionResponse {
    pub fn into_completion(self) -> Result<Completion, BackendError> {
        if let Some(error) = self.error {
            return Err(BackendError::Rejected(error));
        }
        let generated_text = match (self.generated_text, self.response) {
            (Some(text), _) => text,
            (None, Some(Value::String(text))) => text,
            (None, Some(other)) => other.to_string(),
            (None, None) => {
                return Err(BackendError::InvalidResponse(
                    "missing generated_text".to_string(),
                ));
            }
        };
        Ok(Completion {
            generated_text,
            context_used: self.context_used,
        })
    }
}

/// Error body of a FastAPI `HTTPException`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Value,
}

impl ErrorBody {
    /// The human-readable part of `detail`.
    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_hit_maps_to_document() {
        let body = serde_json::json!({
            "contexts": [
                {"_id": "a1", "_source": {"title": "Rust", "content": "Ownership"}},
                {"_id": "b2", "_source": {"title": "Empty"}}
            ]
        });
        let list: ContextListResponse = serde_json::from_value(body).unwrap();
        let docs: Vec<ContextDocument> = list.contexts.into_iter().map(Into::into).collect();
        assert_eq!(docs[0].id, "a1");
        assert_eq!(docs[0].content, "Ownership");
        assert_eq!(docs[1].title, "Empty");
        assert_eq!(docs[1].content, "");
    }

    fn completion(body: Value) -> Result<Completion, BackendError> {
        serde_json::from_value::<CompletionResponse>(body)
            .unwrap()
            .into_completion()
    }

    #[test]
    fn test_completion_shapes() {
        let rag = completion(serde_json::json!({
            "generated_text": "Answer",
            "context_used": [{"title": "Doc"}]
        }))
        .unwrap();
        assert_eq!(rag.generated_text, "Answer");
        assert_eq!(rag.context_used.len(), 1);

        let agent = completion(serde_json::json!({"response": "Done"})).unwrap();
        assert_eq!(agent.generated_text, "Done");
        assert!(agent.context_used.is_empty());

        let structured = completion(serde_json::json!({"response": {"steps": 2}})).unwrap();
        assert_eq!(structured.generated_text, r#"{"steps":2}"#);
    }

    #[test]
    fn test_completion_error_and_missing_text() {
        assert_eq!(
            completion(serde_json::json!({"error": "tool failed"})),
            Err(BackendError::Rejected("tool failed".to_string()))
        );
        assert!(matches!(
            completion(serde_json::json!({"message": "ok"})),
            Err(BackendError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_error_body_detail_forms() {
        let body: ErrorBody =
            serde_json::from_value(serde_json::json!({"detail": "Context not found"})).unwrap();
        assert_eq!(body.message(), "Context not found");

        let body: ErrorBody =
            serde_json::from_value(serde_json::json!({"detail": [{"msg": "field required"}]}))
                .unwrap();
        assert!(body.message().contains("field required"));
    }
}
