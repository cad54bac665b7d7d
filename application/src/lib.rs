//! Application layer for ragdash
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use ports::{
    context_repository::ContextRepository,
    health_source::HealthSource,
    session_logger::{NoSessionLogger, SessionEvent, SessionLogger},
    streaming_backend::{
        BackendError, BackendRequest, ByteStream, Completion, RequestBody, StreamingBackend,
    },
};
pub use use_cases::consume_stream::{ConsumeOutcome, StreamConsumer, StreamObserver};
pub use use_cases::dispatch::{DispatchError, RequestDispatcher, SessionBoard, SessionHandle};
pub use use_cases::manage_context::{ContextError, ContextUseCase};
pub use use_cases::monitor_health::{HealthMonitor, HealthView, HealthWatch};
