//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod context_repository;
pub mod health_source;
pub mod session_logger;
pub mod streaming_backend;
