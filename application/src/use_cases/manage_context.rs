//! Manage Context use case.
//!
//! Thin validation layer over the [`ContextRepository`] port: drafts are
//! checked before any request goes out, and every mutation is logged.

use crate::ports::context_repository::ContextRepository;
use crate::ports::streaming_backend::BackendError;
use ragdash_domain::{ContextDocument, ContextDraft, DomainError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Invalid context: {0}")]
    Invalid(#[from] DomainError),

    #[error("Context id cannot be empty")]
    EmptyId,

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

pub struct ContextUseCase {
    repository: Arc<dyn ContextRepository>,
}

impl ContextUseCase {
    pub fn new(repository: Arc<dyn ContextRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<ContextDocument>, ContextError> {
        let contexts = self.repository.list().await?;
        debug!("Fetched {} contexts", contexts.len());
        Ok(contexts)
    }

    /// Store a new document and return its id.
    pub async fn create(&self, draft: ContextDraft) -> Result<String, ContextError> {
        draft.validate()?;
        let id = self.repository.create(&draft).await?;
        info!("Added context '{}' ({})", draft.title, id);
        Ok(id)
    }

    pub async fn update(&self, id: &str, draft: ContextDraft) -> Result<(), ContextError> {
        let id = Self::require_id(id)?;
        draft.validate()?;
        self.repository.update(id, &draft).await?;
        info!("Updated context {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContextError> {
        let id = Self::require_id(id)?;
        self.repository.delete(id).await?;
        info!("Deleted context {}", id);
        Ok(())
    }

    pub async fn seed_mock_data(&self) -> Result<(), ContextError> {
        self.repository.seed_mock_data().await?;
        info!("Mock context data created");
        Ok(())
    }

    fn require_id(id: &str) -> Result<&str, ContextError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ContextError::EmptyId);
        }
        Ok(id)
    }
}
