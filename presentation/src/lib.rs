//! Presentation layer for ragdash
//!
//! This crate contains CLI definitions, output formatters,
//! stream rendering, progress indicators, and the interactive REPL.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, Input, LineAction};
pub use cli::commands::{Cli, Command, ContextCommand, GenerateArgs, OutputArg};
pub use output::console::ConsoleFormatter;
pub use output::stream::StreamPrinter;
pub use progress::reporter::ProgressReporter;
