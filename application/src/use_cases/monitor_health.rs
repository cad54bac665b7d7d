//! Health monitoring use case.
//!
//! Polls the backend's health endpoint on a fixed interval and publishes the
//! latest result through a `watch` channel. A failed poll is published like
//! any other result and polling carries on.

use crate::ports::health_source::HealthSource;
use ragdash_domain::HealthReport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Latest known health of the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthView {
    Loading,
    Ready(HealthReport),
    Failed(String),
}

pub struct HealthMonitor {
    source: Arc<dyn HealthSource>,
    interval: Duration,
}

/// A running poll loop.
pub struct HealthWatch {
    pub receiver: watch::Receiver<HealthView>,
    task: JoinHandle<()>,
}

impl HealthWatch {
    /// Wait for the poll loop to stop (after its token is cancelled).
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

impl HealthMonitor {
    /// Poll every five minutes unless configured otherwise.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

    pub fn new(source: Arc<dyn HealthSource>) -> Self {
        Self {
            source,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch the health report once.
    pub async fn check_once(&self) -> HealthView {
        fetch(self.source.as_ref()).await
    }

    /// Poll immediately, then every interval, until `cancellation` fires.
    pub fn spawn(&self, cancellation: CancellationToken) -> HealthWatch {
        let (tx, receiver) = watch::channel(HealthView::Loading);
        let source = Arc::clone(&self.source);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => {
                        debug!("Health polling stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let view = tokio::select! {
                            biased;
                            _ = cancellation.cancelled() => break,
                            view = fetch(source.as_ref()) => view,
                        };
                        tx.send_replace(view);
                    }
                }
            }
        });

        HealthWatch { receiver, task }
    }
}

async fn fetch(source: &dyn HealthSource) -> HealthView {
    match source.status().await {
        Ok(report) => {
            debug!(
                "Health: database={}, elasticsearch={}",
                report.database.status, report.elasticsearch.status
            );
            HealthView::Ready(report)
        }
        Err(e) => {
            warn!("Failed to fetch health status: {}", e);
            HealthView::Failed(e.to_string())
        }
    }
}
