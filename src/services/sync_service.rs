use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

use crate::clock::{Clock, LocalClock};
use crate::connectivity::Connectivity;
use crate::db::TaskStore;
use crate::models::{NewTask, Task, TaskId, tasks_scheduled_on};
use crate::remote::TaskSource;
use crate::state::TaskState;

pub const OFFLINE_MESSAGE: &str = "No connection. Showing local tasks.";
pub const OFFLINE_WRITE_MESSAGE: &str = "No connection. Changes can only be saved while online.";

/// Decides, per operation, whether the backend or the local cache is the
/// source of truth, and keeps the cache equal to the last full fetch.
///
/// Operations run one at a time in call order. Results are published to
/// subscribers as [`TaskState`] snapshots; only [`Self::load_tasks`] also
/// returns its own.
pub struct TaskSyncService {
    store: TaskStore,
    remote: Arc<dyn TaskSource>,
    connectivity: Arc<dyn Connectivity>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<TaskState>,
    operation: Mutex<()>,
}

/// Clears `is_loading` when the operation ends, however it ends.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<TaskState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_loading = false);
    }
}

impl TaskSyncService {
    pub fn new(
        store: TaskStore,
        remote: Arc<dyn TaskSource>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let (state, _) = watch::channel(TaskState::default());
        Self {
            store,
            remote,
            connectivity,
            clock: Arc::new(LocalClock),
            state,
            operation: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> TaskState {
        self.state.borrow().clone()
    }

    /// Returns the state this load produced, read before any queued
    /// operation can run.
    pub async fn load_tasks(&self) -> TaskState {
        let _op = self.operation.lock().await;
        {
            let _loading = self.begin();
            self.refresh().await;
        }
        self.state()
    }

    pub async fn load_todays_tasks(&self) {
        let _op = self.operation.lock().await;
        let _loading = self.begin();
        let todays = self.cached_tasks_for_today().await;
        self.state.send_modify(|s| s.todays_tasks = todays);
    }

    pub async fn create_task(&self, task: impl Into<NewTask>) {
        let task = task.into();
        let _op = self.operation.lock().await;
        let _loading = self.begin();

        if !self.ensure_online() {
            return;
        }

        match self.remote.create_task(&task).await {
            Ok(created) => {
                match created {
                    Some(created) => info!("Created task {} ({})", created.id, created.title),
                    None => info!("Created task {:?}", task.title),
                }
                self.refresh().await;
            }
            Err(e) => {
                error!("Failed to create task {:?}: {}", task.title, e);
                self.fail(format!("Failed to create task: {}", e));
            }
        }
    }

    pub async fn update_task(&self, id: TaskId, task: Task) {
        let _op = self.operation.lock().await;
        let _loading = self.begin();

        if !self.ensure_online() {
            return;
        }

        match self.remote.update_task(id, &task).await {
            Ok(_) => {
                info!("Updated task {}", id);
                self.refresh().await;
            }
            Err(e) => {
                error!("Failed to update task {}: {}", id, e);
                self.fail(format!("Failed to update task: {}", e));
            }
        }
    }

    pub async fn delete_task(&self, id: TaskId) {
        let _op = self.operation.lock().await;
        let _loading = self.begin();

        if !self.ensure_online() {
            return;
        }

        match self.remote.delete_task(id).await {
            Ok(()) => {
                info!("Deleted task {}", id);
                self.refresh().await;
            }
            Err(e) => {
                error!("Failed to delete task {}: {}", id, e);
                self.fail(format!("Failed to delete task: {}", e));
            }
        }
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        LoadingGuard { state: &self.state }
    }

    fn fail(&self, message: String) {
        self.state.send_modify(|s| s.error = Some(message));
    }

    fn ensure_online(&self) -> bool {
        if self.connectivity.is_online() {
            return true;
        }
        warn!("Rejecting change while offline");
        self.fail(OFFLINE_WRITE_MESSAGE.to_string());
        false
    }

    /// Fetches the full list when online and mirrors it into the cache;
    /// otherwise, or when the fetch fails, serves today's cached tasks.
    async fn refresh(&self) {
        if !self.connectivity.is_online() {
            info!("Offline, serving today's tasks from local cache");
            self.publish_cached_today(Some(OFFLINE_MESSAGE.to_string()))
                .await;
            return;
        }

        match self.remote.list_tasks().await {
            Ok(tasks) => {
                let todays = tasks_scheduled_on(&tasks, self.clock.today());
                info!("Fetched {} tasks ({} today)", tasks.len(), todays.len());

                self.state.send_modify(|s| {
                    s.tasks = tasks.clone();
                    s.todays_tasks = todays;
                });

                if let Err(e) = self.store.replace_all(&tasks).await {
                    warn!("Failed to refresh local task cache: {}", e);
                }
            }
            Err(e) => {
                warn!("Failed to fetch tasks, falling back to local cache: {}", e);
                self.publish_cached_today(Some(format!("Failed to load tasks: {}", e)))
                    .await;
            }
        }
    }

    async fn publish_cached_today(&self, error: Option<String>) {
        let todays = self.cached_tasks_for_today().await;
        self.state.send_modify(|s| {
            s.tasks = todays.clone();
            s.todays_tasks = todays;
            s.error = error;
        });
    }

    /// Storage faults read as an empty cache.
    async fn cached_tasks_for_today(&self) -> Vec<Task> {
        let cached = match self.store.get_all().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!("Failed to read local task cache: {}", e);
                Vec::new()
            }
        };
        tasks_scheduled_on(&cached, self.clock.today())
    }
}
