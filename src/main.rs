use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldtasks::connectivity::{ConnectivityFlag, ConnectivityProbe};
use fieldtasks::db::{self, TaskStore};
use fieldtasks::error::AppError;
use fieldtasks::remote::auth::AuthClient;
use fieldtasks::remote::{HttpTaskSource, RemoteConfig};
use fieldtasks::services::{SyncScheduler, TaskSyncService};
use fieldtasks::session::{Session, SessionProvider};

fn env_secs(key: &str, default: u64) -> Result<Duration, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::Config(format!("{} is not a number: {}", key, raw))),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

async fn ensure_signed_in(session: &Session, auth: &AuthClient) -> Result<(), AppError> {
    if let Some(token) = session.bearer_token() {
        match auth.validate_token(&token).await {
            Ok(true) => return Ok(()),
            Ok(false) => {
                warn!("Stored token was rejected, signing out");
                session.sign_out().await?;
            }
            Err(e) => {
                warn!("Could not validate stored token, keeping it: {}", e);
                return Ok(());
            }
        }
    }

    match (env::var("TASKS_API_EMAIL"), env::var("TASKS_API_PASSWORD")) {
        (Ok(email), Ok(password)) => {
            let token = auth.login(&email, &password).await?;
            session.sign_in(token).await
        }
        _ => {
            warn!("Not signed in and no credentials configured");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "fieldtasks=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://fieldtasks.db".to_string());

    let pool = db::connect(&database_url).await?;
    db::migrate(&pool).await?;

    let remote_config = RemoteConfig::new_from_env()?;
    let sync_interval = env_secs("SYNC_INTERVAL_SECS", 300)?;
    let probe_interval = env_secs("CONNECTIVITY_PROBE_SECS", 15)?;

    let connectivity = ConnectivityFlag::new(true);
    let probe = ConnectivityProbe::for_url(&remote_config.base_url, connectivity.clone(), probe_interval)?;
    probe.probe().await;
    tokio::spawn(probe.start());

    let session = Arc::new(Session::restore(pool.clone()).await?);
    let auth = AuthClient::new(remote_config.clone())?;
    if let Err(e) = ensure_signed_in(&session, &auth).await {
        warn!("Sign-in failed, continuing with cached data: {}", e);
    }

    let remote = Arc::new(HttpTaskSource::new(remote_config, session.clone())?);
    let service = Arc::new(TaskSyncService::new(
        TaskStore::new(pool.clone()),
        remote,
        Arc::new(connectivity),
    ));

    let mut updates = service.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.is_loading {
                continue;
            }
            for task in &state.todays_tasks {
                info!("Today: [{}] {} @ {} ({})", task.status, task.title, task.address, task.scheduled_at);
            }
            if let Some(error) = &state.error {
                warn!("{}", error);
            }
        }
    });

    service.load_todays_tasks().await;
    service.load_tasks().await;

    let scheduler = SyncScheduler::new(service.clone(), sync_interval);
    tokio::select! {
        _ = scheduler.start() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    pool.close().await;
    Ok(())
}
