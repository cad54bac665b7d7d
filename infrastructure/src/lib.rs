//! Infrastructure layer for ragdash
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP backend client, configuration
//! file loading and the JSONL session transcript.

pub mod config;
pub mod http;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileApiConfig, FileConfig, FileHealthConfig,
    FileLoggingConfig, FileModelsConfig, FileOutputConfig, FileStreamConfig,
};
pub use http::HttpBackend;
pub use logging::JsonlSessionLogger;
