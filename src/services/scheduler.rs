use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::services::sync_service::TaskSyncService;

/// Auto-refresh scheduler.
/// Reloads the task list at a fixed interval.
pub struct SyncScheduler {
    service: Arc<TaskSyncService>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(service: Arc<TaskSyncService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Runs forever; a failed refresh does not stop the loop.
    pub async fn start(self) {
        info!("Starting auto-refresh scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            let state = self.service.load_tasks().await;
            match state.error {
                None => info!(
                    "Auto-refresh completed - {} tasks, {} today",
                    state.tasks.len(),
                    state.todays_tasks.len()
                ),
                Some(e) => tracing::warn!(
                    "Auto-refresh degraded - {} tasks shown: {}",
                    state.tasks.len(),
                    e
                ),
            }
        }
    }
}
