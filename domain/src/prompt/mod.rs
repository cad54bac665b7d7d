//! Prompt submission domain.
//!
//! - [`request::PromptRequest`]: a validated, immutable submission
//! - [`request::GenerationMode`]: which backend interface handles it

pub mod request;
