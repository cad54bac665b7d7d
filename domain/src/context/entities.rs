//! Context document entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Title and content of a context document, as sent on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextDraft {
    pub title: String,
    pub content: String,
}

impl ContextDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Reject drafts without a title.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::EmptyContextTitle);
        }
        Ok(())
    }
}

/// A stored context document (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDocument {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl ContextDocument {
    pub fn new(id: impl Into<String>, draft: ContextDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            content: draft.content,
        }
    }

    /// The editable part of the document.
    pub fn draft(&self) -> ContextDraft {
        ContextDraft::new(self.title.clone(), self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_requires_title() {
        assert_eq!(
            ContextDraft::new("  ", "body").validate(),
            Err(DomainError::EmptyContextTitle)
        );
        assert!(ContextDraft::new("Title", "").validate().is_ok());
    }

    #[test]
    fn test_document_draft_roundtrip() {
        let doc = ContextDocument::new("abc", ContextDraft::new("Rust", "Ownership"));
        assert_eq!(doc.id, "abc");
        assert_eq!(doc.draft(), ContextDraft::new("Rust", "Ownership"));
    }
}
