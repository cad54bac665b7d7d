//! Stream session domain.
//!
//! - [`entities::StreamSession`]: one submission's streaming lifecycle
//! - [`failure::SessionFailure`]: why a session ended in failure
//! - [`decoder::Utf8StreamDecoder`]: incremental UTF-8 decoding of chunked bodies

pub mod decoder;
pub mod entities;
pub mod failure;
