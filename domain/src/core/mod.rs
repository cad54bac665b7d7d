//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: models the backend can serve (llama2, llama3.2, custom)
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
