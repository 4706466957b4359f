use serde::Serialize;

use crate::models::Task;

/// Snapshot published to observers of the task synchronization service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub todays_tasks: Vec<Task>,
    pub is_loading: bool,
    pub error: Option<String>,
}
