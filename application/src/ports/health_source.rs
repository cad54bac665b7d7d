//! Health source port

use super::streaming_backend::BackendError;
use async_trait::async_trait;
use ragdash_domain::HealthReport;

/// Fetches the backend's health report.
#[async_trait]
pub trait HealthSource: Send + Sync {
    async fn status(&self) -> Result<HealthReport, BackendError>;
}
