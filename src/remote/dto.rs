use serde::{Deserialize, Serialize};

use crate::models::{Assignee, NewTask, ScheduledAt, Task, TaskId, TaskStatus};

/// A task as the backend sends and accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub id: TaskId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "encargado")]
    pub assignee: Assignee,
    #[serde(rename = "direccion", default)]
    pub address: String,
    #[serde(rename = "estado")]
    pub status: TaskStatus,
    #[serde(rename = "fechaHora")]
    pub scheduled_at: ScheduledAt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTaskPayload {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "encargado")]
    pub assignee: Assignee,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "estado")]
    pub status: TaskStatus,
    #[serde(rename = "fechaHora")]
    pub scheduled_at: ScheduledAt,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl From<TaskPayload> for Task {
    fn from(payload: TaskPayload) -> Self {
        Task {
            id: payload.id,
            title: payload.title,
            description: payload.description,
            assignee: payload.assignee,
            address: payload.address,
            status: payload.status,
            scheduled_at: payload.scheduled_at,
        }
    }
}

impl From<&Task> for TaskPayload {
    fn from(task: &Task) -> Self {
        TaskPayload {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            assignee: task.assignee.clone(),
            address: task.address.clone(),
            status: task.status.clone(),
            scheduled_at: task.scheduled_at,
        }
    }
}

impl From<&NewTask> for NewTaskPayload {
    fn from(task: &NewTask) -> Self {
        NewTaskPayload {
            title: task.title.clone(),
            description: task.description.clone(),
            assignee: task.assignee.clone(),
            address: task.address.clone(),
            status: task.status.clone(),
            scheduled_at: task.scheduled_at,
        }
    }
}
