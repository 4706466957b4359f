pub mod auth;
pub mod dto;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskId};
use crate::session::SessionProvider;

pub const DEFAULT_BASE_URL: &str = "http://10.0.2.2:8080/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url =
            env::var("TASKS_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match env::var("TASKS_API_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("TASKS_API_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn build_client(&self) -> Result<Client, AppError> {
        let client = Client::builder().timeout(self.timeout).build()?;
        Ok(client)
    }
}

/// The backend's task endpoints.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError>;
    /// Returns the created task when the backend echoes it back with its id.
    async fn create_task(&self, task: &NewTask) -> Result<Option<Task>, AppError>;
    async fn update_task(&self, id: TaskId, task: &Task) -> Result<Task, AppError>;
    async fn delete_task(&self, id: TaskId) -> Result<(), AppError>;
}

pub struct HttpTaskSource {
    client: Client,
    config: RemoteConfig,
    session: Arc<dyn SessionProvider>,
}

impl HttpTaskSource {
    pub fn new(config: RemoteConfig, session: Arc<dyn SessionProvider>) -> Result<Self, AppError> {
        let client = config.build_client()?;
        Ok(Self {
            client,
            config,
            session,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        let request_id = Uuid::new_v4();
        debug!("Request {} {} ({})", method, url, request_id);

        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header("X-Request-Id", request_id.to_string());

        match self.session.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => {
                warn!("No session token available for {}", path);
                builder
            }
        }
    }

    /// Sends the request and returns the body of a successful response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Response {}", status);

        if !status.is_success() {
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            };
            return Err(AppError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    serde_json::from_str::<T>(body).map_err(|e| {
        tracing::error!("Failed to parse: {}", e);
        AppError::Decode(e.to_string())
    })
}

/// Write endpoints may answer with an empty body or a payload without an id;
/// the status alone decides success.
fn decode_echo(body: &str) -> Option<dto::TaskPayload> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<dto::TaskPayload>(body) {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!("Response body is not a full task: {}", e);
            None
        }
    }
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let body = self.execute(self.request(Method::GET, "tareas")).await?;
        let payloads: Vec<dto::TaskPayload> = decode(&body)?;
        Ok(payloads.into_iter().map(Task::from).collect())
    }

    async fn create_task(&self, task: &NewTask) -> Result<Option<Task>, AppError> {
        let request = self
            .request(Method::POST, "tareas")
            .json(&dto::NewTaskPayload::from(task));
        let body = self.execute(request).await?;
        Ok(decode_echo(&body).map(Task::from))
    }

    async fn update_task(&self, id: TaskId, task: &Task) -> Result<Task, AppError> {
        let request = self
            .request(Method::PUT, &format!("tareas/{}", id))
            .json(&dto::TaskPayload::from(task));
        let body = self.execute(request).await?;
        let updated = decode_echo(&body)
            .map(Task::from)
            .unwrap_or_else(|| Task { id, ..task.clone() });
        Ok(updated)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), AppError> {
        self.execute(self.request(Method::DELETE, &format!("tareas/{}", id)))
            .await?;
        Ok(())
    }
}
