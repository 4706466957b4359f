#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, TimeZone};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::watch;

use fieldtasks::clock::Clock;
use fieldtasks::error::AppError;
use fieldtasks::models::{Assignee, NewTask, ScheduledAt, Task, TaskId, TaskStatus};
use fieldtasks::remote::TaskSource;
use fieldtasks::state::TaskState;

pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    fieldtasks::db::migrate(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
}

pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// A task scheduled `days` after [`today`] at `hour` local time.
pub fn task(id: TaskId, days: i64, hour: u32) -> Task {
    let date = today() + chrono::Duration::days(days);
    let at = Local
        .from_local_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
        .single()
        .expect("unambiguous local time");

    Task {
        id,
        title: format!("Tarea {}", id),
        description: String::new(),
        assignee: Assignee::Jaime,
        address: format!("Calle {}", id),
        status: TaskStatus::Pending,
        scheduled_at: ScheduledAt::from_datetime(&at),
    }
}

pub fn ids(tasks: &[Task]) -> Vec<TaskId> {
    let mut ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
    ids.sort();
    ids
}

/// How the mock answers a `list_tasks` call.
#[derive(Clone)]
pub enum ListResponse {
    Tasks,
    Reject(u16),
}

/// Scripted in-memory stand-in for the backend.
pub struct MockTaskSource {
    tasks: Mutex<Vec<Task>>,
    list_response: Mutex<ListResponse>,
    reject_changes: Mutex<Option<u16>>,
    list_delay: Mutex<Option<Duration>>,
    observer: Mutex<Option<watch::Receiver<TaskState>>>,
    pub observed: Mutex<Vec<TaskState>>,
    pub list_calls: AtomicUsize,
    pub change_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockTaskSource {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            list_response: Mutex::new(ListResponse::Tasks),
            reject_changes: Mutex::new(None),
            list_delay: Mutex::new(None),
            observer: Mutex::new(None),
            observed: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            change_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn respond_to_list(&self, response: ListResponse) {
        *self.list_response.lock().unwrap() = response;
    }

    pub fn reject_changes(&self, status: u16) {
        *self.reject_changes.lock().unwrap() = Some(status);
    }

    pub fn delay_list(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    /// Records the published state every time `list_tasks` is entered.
    pub fn observe(&self, receiver: watch::Receiver<TaskState>) {
        *self.observer.lock().unwrap() = Some(receiver);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn change_calls(&self) -> usize {
        self.change_calls.load(Ordering::SeqCst)
    }

    fn check_change(&self) -> Result<(), AppError> {
        self.change_calls.fetch_add(1, Ordering::SeqCst);
        match *self.reject_changes.lock().unwrap() {
            Some(status) => Err(AppError::Remote {
                status,
                message: "Rejected".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let snapshot = self.observer.lock().unwrap().as_ref().map(|rx| rx.borrow().clone());
        if let Some(state) = snapshot {
            self.observed.lock().unwrap().push(state);
        }

        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = self.list_response.lock().unwrap().clone();
        match response {
            ListResponse::Tasks => Ok(self.tasks.lock().unwrap().clone()),
            ListResponse::Reject(status) => Err(AppError::Remote {
                status,
                message: "Internal Server Error".to_string(),
            }),
        }
    }

    async fn create_task(&self, task: &NewTask) -> Result<Option<Task>, AppError> {
        self.check_change()?;
        let mut tasks = self.tasks.lock().unwrap();
        let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let created = Task {
            id,
            title: task.title.clone(),
            description: task.description.clone(),
            assignee: task.assignee.clone(),
            address: task.address.clone(),
            status: task.status.clone(),
            scheduled_at: task.scheduled_at,
        };
        tasks.push(created.clone());
        Ok(Some(created))
    }

    async fn update_task(&self, id: TaskId, task: &Task) -> Result<Task, AppError> {
        self.check_change()?;
        let mut tasks = self.tasks.lock().unwrap();
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::Remote {
                status: 404,
                message: "Not Found".to_string(),
            })?;
        *slot = Task { id, ..task.clone() };
        Ok(slot.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), AppError> {
        self.check_change()?;
        self.tasks.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }
}
