//! Configuration file loading for ragdash
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `RAGDASH_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./ragdash.toml` or `./.ragdash.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/ragdash/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileApiConfig, FileConfig, FileHealthConfig, FileLoggingConfig,
    FileModelsConfig, FileOutputConfig, FileStreamConfig,
};
pub use loader::ConfigLoader;
