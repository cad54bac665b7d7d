//! Domain layer for ragdash
//!
//! This crate contains the core entities and value objects of the
//! dashboard client. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Prompt submission
//!
//! A [`PromptRequest`] carries the user's text, the [`Model`] to run and the
//! [`GenerationMode`] (plain generation, retrieval-augmented generation, or
//! agent query).
//!
//! ## Stream sessions
//!
//! Each submission becomes a [`StreamSession`] whose text grows as chunks of
//! the streamed response arrive. Chunks are decoded with
//! [`Utf8StreamDecoder`], which handles characters split across chunk
//! boundaries.

pub mod config;
pub mod context;
pub mod core;
pub mod health;
pub mod prompt;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use config::OutputFormat;
pub use context::{ContextDocument, ContextDraft};
pub use core::{error::DomainError, model::Model};
pub use health::{ClusterHealth, ComponentHealth, HealthDetails, HealthReport, HealthStatus};
pub use prompt::request::{GenerationMode, PromptRequest};
pub use session::{
    decoder::{DecodeError, DecodeMode, Utf8StreamDecoder},
    entities::{RequestId, SessionState, StreamSession},
    failure::{FailureKind, SessionFailure},
};
