//! Prompt request value object

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Which backend interface a prompt is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Plain generation from the prompt alone
    #[default]
    Generate,
    /// Generation grounded in retrieved context documents
    RetrievalAugmented,
    /// Tool-using agent answering a query
    Agent,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Generate => "generate",
            GenerationMode::RetrievalAugmented => "rag",
            GenerationMode::Agent => "agent",
        }
    }

    /// Pick between plain and retrieval-augmented generation.
    pub fn from_rag_toggle(use_rag: bool) -> Self {
        if use_rag {
            GenerationMode::RetrievalAugmented
        } else {
            GenerationMode::Generate
        }
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prompt submitted by the user (Value Object)
///
/// The text is trimmed on construction and is never empty. Once built the
/// request is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptRequest {
    text: String,
    model: Model,
    mode: GenerationMode,
}

impl PromptRequest {
    pub fn new(
        text: impl AsRef<str>,
        model: Model,
        mode: GenerationMode,
    ) -> Result<Self, DomainError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        Ok(Self {
            text: text.to_string(),
            model,
            mode,
        })
    }

    pub fn generate(text: impl AsRef<str>, model: Model) -> Result<Self, DomainError> {
        Self::new(text, model, GenerationMode::Generate)
    }

    pub fn retrieval_augmented(text: impl AsRef<str>, model: Model) -> Result<Self, DomainError> {
        Self::new(text, model, GenerationMode::RetrievalAugmented)
    }

    pub fn agent(text: impl AsRef<str>, model: Model) -> Result<Self, DomainError> {
        Self::new(text, model, GenerationMode::Agent)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_trimmed() {
        let request = PromptRequest::generate("  hello \n", Model::Llama2).unwrap();
        assert_eq!(request.text(), "hello");
        assert_eq!(request.mode(), GenerationMode::Generate);
    }

    #[test]
    fn test_blank_text_rejected() {
        assert_eq!(
            PromptRequest::generate("   ", Model::Llama2),
            Err(DomainError::EmptyPrompt)
        );
        assert_eq!(
            PromptRequest::agent("", Model::Llama2),
            Err(DomainError::EmptyPrompt)
        );
    }

    #[test]
    fn test_rag_toggle() {
        assert_eq!(
            GenerationMode::from_rag_toggle(true),
            GenerationMode::RetrievalAugmented
        );
        assert_eq!(GenerationMode::from_rag_toggle(false), GenerationMode::Generate);
    }

    #[test]
    fn test_mode_serializes_snake_case() {
        let json = serde_json::to_string(&GenerationMode::RetrievalAugmented).unwrap();
        assert_eq!(json, "\"retrieval_augmented\"");
    }
}
