use std::fmt;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

/// Who a task is assigned to. Labels the backend knows are mapped to
/// variants; anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Assignee {
    Jaime,
    Pablo,
    Both,
    Other(String),
}

impl Assignee {
    pub fn as_str(&self) -> &str {
        match self {
            Assignee::Jaime => "JAIME",
            Assignee::Pablo => "PABLO",
            Assignee::Both => "AMBOS",
            Assignee::Other(label) => label,
        }
    }
}

impl From<String> for Assignee {
    fn from(label: String) -> Self {
        match label.as_str() {
            "JAIME" => Assignee::Jaime,
            "PABLO" => Assignee::Pablo,
            "AMBOS" => Assignee::Both,
            _ => Assignee::Other(label),
        }
    }
}

impl From<Assignee> for String {
    fn from(assignee: Assignee) -> Self {
        match assignee {
            Assignee::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "PENDIENTE",
            TaskStatus::InProgress => "EN_PROGRESO",
            TaskStatus::Completed => "COMPLETADA",
            TaskStatus::Cancelled => "CANCELADA",
            TaskStatus::Other(label) => label,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "PENDIENTE" => TaskStatus::Pending,
            "EN_PROGRESO" => TaskStatus::InProgress,
            "COMPLETADA" => TaskStatus::Completed,
            "CANCELADA" => TaskStatus::Cancelled,
            _ => TaskStatus::Other(label),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point in time a task is scheduled for, as whole seconds since the Unix epoch.
///
/// The backend sends this either as an integer or as a floating point number.
/// Fractional values are floored so a task at `23:59:59.9` never lands on the
/// next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "EpochSeconds", into = "i64")]
pub struct ScheduledAt(i64);

#[derive(Deserialize)]
#[serde(untagged)]
enum EpochSeconds {
    Whole(i64),
    Fractional(f64),
}

impl TryFrom<EpochSeconds> for ScheduledAt {
    type Error = String;

    fn try_from(value: EpochSeconds) -> Result<Self, Self::Error> {
        match value {
            EpochSeconds::Whole(secs) => Ok(ScheduledAt::from_epoch_secs(secs)),
            EpochSeconds::Fractional(secs) => ScheduledAt::from_fractional_secs(secs)
                .ok_or_else(|| format!("timestamp out of range: {}", secs)),
        }
    }
}

impl From<ScheduledAt> for i64 {
    fn from(at: ScheduledAt) -> Self {
        at.0
    }
}

impl ScheduledAt {
    pub fn from_epoch_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Returns `None` for NaN, infinities and values outside the `i64` range.
    pub fn from_fractional_secs(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        let floored = secs.floor();
        if floored < i64::MIN as f64 || floored >= i64::MAX as f64 {
            return None;
        }
        Some(Self(floored as i64))
    }

    pub fn from_datetime<Tz: chrono::TimeZone>(at: &DateTime<Tz>) -> Self {
        Self(at.timestamp())
    }

    pub fn epoch_secs(self) -> i64 {
        self.0
    }

    /// Calendar date of this instant in the local time zone.
    pub fn local_date(self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.0, 0).map(|utc| utc.with_timezone(&Local).date_naive())
    }
}

impl fmt::Display for ScheduledAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(self.0, 0) {
            Some(utc) => write!(f, "{}", utc.with_timezone(&Local).format("%d-%m-%Y %H:%M:%S")),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub assignee: Assignee,
    pub address: String,
    pub status: TaskStatus,
    pub scheduled_at: ScheduledAt,
}

impl Task {
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.scheduled_at.local_date() == Some(date)
    }
}

/// A task that does not exist remotely yet; the backend assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assignee: Assignee,
    pub address: String,
    pub status: TaskStatus,
    pub scheduled_at: ScheduledAt,
}

impl From<Task> for NewTask {
    fn from(task: Task) -> Self {
        NewTask {
            title: task.title,
            description: task.description,
            assignee: task.assignee,
            address: task.address,
            status: task.status,
            scheduled_at: task.scheduled_at,
        }
    }
}

/// Tasks whose scheduled time falls on `date` in the local time zone.
pub fn tasks_scheduled_on(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.is_scheduled_on(date))
        .cloned()
        .collect()
}
