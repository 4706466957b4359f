use sqlx::FromRow;

use crate::models::{ScheduledAt, Task, TaskId};

/// Row layout of the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub address: String,
    pub status: String,
    pub scheduled_at: i64,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        TaskRecord {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            assignee: task.assignee.as_str().to_string(),
            address: task.address.clone(),
            status: task.status.as_str().to_string(),
            scheduled_at: task.scheduled_at.epoch_secs(),
        }
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Task {
            id: record.id,
            title: record.title,
            description: record.description,
            assignee: record.assignee.into(),
            address: record.address,
            status: record.status.into(),
            scheduled_at: ScheduledAt::from_epoch_secs(record.scheduled_at),
        }
    }
}
