use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use crate::error::AppError;
use crate::remote::{RemoteConfig, decode, dto};

/// Login and token validation. These endpoints never carry the stored
/// session token implicitly.
pub struct AuthClient {
    client: Client,
    config: RemoteConfig,
}

impl AuthClient {
    pub fn new(config: RemoteConfig) -> Result<Self, AppError> {
        let client = config.build_client()?;
        Ok(Self { client, config })
    }

    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.config.endpoint("auth/login"))
            .header(ACCEPT, "application/json")
            .json(&dto::LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed: dto::LoginResponse = decode(&body)?;
            let token = parsed
                .token
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::Decode("Token missing from login response".to_string()))?;
            info!("Login succeeded for {}", email);
            return Ok(token);
        }

        if status == StatusCode::FORBIDDEN {
            warn!("Login rejected for {}", email);
            return Err(AppError::InvalidCredentials);
        }

        Err(AppError::Remote {
            status: status.as_u16(),
            message: body,
        })
    }

    /// Whether the backend still accepts `token`.
    pub async fn validate_token(&self, token: &str) -> Result<bool, AppError> {
        let response = self
            .client
            .get(self.config.endpoint("auth/validate"))
            .bearer_auth(token)
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
