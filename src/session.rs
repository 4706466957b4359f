use std::sync::RwLock;

use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::error::AppError;

/// Supplies the bearer token attached to authenticated requests.
pub trait SessionProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Signed-in state of the device, persisted so it survives restarts.
///
/// Created once at startup with [`Session::restore`] and shared with the
/// components that talk to the backend.
pub struct Session {
    db: SqlitePool,
    token: RwLock<Option<String>>,
}

impl Session {
    pub async fn restore(db: SqlitePool) -> Result<Self, AppError> {
        let token = db::session::load_token(&db).await?;
        info!("Session restored (signed in: {})", token.is_some());
        Ok(Self {
            db,
            token: RwLock::new(token),
        })
    }

    pub async fn sign_in(&self, token: String) -> Result<(), AppError> {
        db::session::save_token(&self.db, &token).await?;
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        info!("Signed in");
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), AppError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        db::session::clear_token(&self.db).await?;
        info!("Signed out");
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}

impl SessionProvider for Session {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
