//! Backend health report types.

pub mod entities;

pub use entities::{ClusterHealth, ComponentHealth, HealthDetails, HealthReport, HealthStatus};
