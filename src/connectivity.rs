use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::error::AppError;

/// Current reachability of the backend, queried at the start of each operation.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Shared online flag, updated by whoever observes the network.
#[derive(Clone, Debug)]
pub struct ConnectivityFlag {
    online: Arc<AtomicBool>,
}

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    /// Stores the new value and returns the previous one.
    pub fn set_online(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::SeqCst)
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Periodically checks that the API host accepts TCP connections and
/// mirrors the result into a [`ConnectivityFlag`].
pub struct ConnectivityProbe {
    flag: ConnectivityFlag,
    host: String,
    port: u16,
    interval: Duration,
    connect_timeout: Duration,
}

impl ConnectivityProbe {
    pub fn for_url(
        base_url: &str,
        flag: ConnectivityFlag,
        interval: Duration,
    ) -> Result<Self, AppError> {
        let url = reqwest::Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid API url {}: {}", base_url, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| AppError::Config(format!("API url has no host: {}", base_url)))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| AppError::Config(format!("API url has no port: {}", base_url)))?;

        Ok(Self {
            flag,
            host,
            port,
            interval,
            connect_timeout: Duration::from_secs(5),
        })
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Runs one check and updates the flag.
    pub async fn probe(&self) -> bool {
        let attempt = TcpStream::connect((self.host.as_str(), self.port));
        let online = matches!(
            tokio::time::timeout(self.connect_timeout, attempt).await,
            Ok(Ok(_))
        );

        let was_online = self.flag.set_online(online);
        if was_online != online {
            if online {
                info!("Backend {}:{} reachable again", self.host, self.port);
            } else {
                warn!("Backend {}:{} unreachable, switching to offline mode", self.host, self.port);
            }
        }
        online
    }

    pub async fn start(self) {
        info!(
            "Starting connectivity probe for {}:{} (interval: {:?})",
            self.host, self.port, self.interval
        );

        loop {
            self.probe().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_follows_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().unwrap();
        let flag = ConnectivityFlag::new(false);

        let probe = ConnectivityProbe::for_url(
            &format!("http://{}/api/", addr),
            flag.clone(),
            Duration::from_secs(60),
        )
        .expect("Failed to build probe")
        .with_connect_timeout(Duration::from_millis(500));

        assert!(probe.probe().await);
        assert!(flag.is_online());

        drop(listener);
        assert!(!probe.probe().await);
        assert!(!flag.is_online());
    }

    #[test]
    fn test_default_port_from_scheme() {
        let probe = ConnectivityProbe::for_url(
            "https://tasks.example.com/api/",
            ConnectivityFlag::new(true),
            Duration::from_secs(1),
        )
        .expect("Failed to build probe");
        assert_eq!(probe.port, 443);
        assert_eq!(probe.host, "tasks.example.com");
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result =
            ConnectivityProbe::for_url("not a url", ConnectivityFlag::new(true), Duration::from_secs(1));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
