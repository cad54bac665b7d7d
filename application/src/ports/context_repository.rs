//! Context repository port
//!
//! CRUD over the backend's context documents.

use super::streaming_backend::BackendError;
use async_trait::async_trait;
use ragdash_domain::{ContextDocument, ContextDraft};

#[async_trait]
pub trait ContextRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<ContextDocument>, BackendError>;

    /// Store a new document and return its id.
    async fn create(&self, draft: &ContextDraft) -> Result<String, BackendError>;

    async fn update(&self, id: &str, draft: &ContextDraft) -> Result<(), BackendError>;

    async fn delete(&self, id: &str) -> Result<(), BackendError>;

    /// Ask the backend to index its built-in sample documents.
    async fn seed_mock_data(&self) -> Result<(), BackendError>;
}
