//! Health report value objects
//!
//! Mirrors the backend's `/health/status` payload. `details` is either a
//! free-form message or, for a reachable Elasticsearch cluster, a cluster
//! summary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status of one backend dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HealthStatus {
    Connected,
    Initializing,
    Error,
    #[default]
    Unknown,
    Other(String),
}

impl HealthStatus {
    pub fn as_str(&self) -> &str {
        match self {
            HealthStatus::Connected => "connected",
            HealthStatus::Initializing => "initializing",
            HealthStatus::Error => "error",
            HealthStatus::Unknown => "unknown",
            HealthStatus::Other(s) => s,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Connected)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HealthStatus {
    fn from(s: &str) -> Self {
        match s {
            "connected" => HealthStatus::Connected,
            "initializing" => HealthStatus::Initializing,
            "error" => HealthStatus::Error,
            "unknown" => HealthStatus::Unknown,
            other => HealthStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for HealthStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HealthStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(HealthStatus::from(s.as_str()))
    }
}

/// Elasticsearch cluster summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub number_of_nodes: u32,
    pub active_primary_shards: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealthDetails {
    Cluster(ClusterHealth),
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentHealth {
    #[serde(default)]
    pub status: HealthStatus,
    #[serde(default)]
    pub details: Option<HealthDetails>,
}

/// Health of the backend's dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub database: ComponentHealth,
    #[serde(default)]
    pub elasticsearch: ComponentHealth,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.database.status.is_healthy() && self.elasticsearch.status.is_healthy()
    }
}
