//! Context documents used for retrieval-augmented generation.
//!
//! The backend indexes these documents and retrieves them when a prompt is
//! submitted in [`GenerationMode::RetrievalAugmented`](crate::GenerationMode).

pub mod entities;

pub use entities::{ContextDocument, ContextDraft};
