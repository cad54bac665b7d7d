//! HTTP adapter for the dashboard backend.
//!
//! [`HttpBackend`] implements every backend-facing port of the application
//! layer (generation streams, context CRUD and health) over a single
//! `reqwest` client.

mod client;
mod wire;

pub use client::HttpBackend;
