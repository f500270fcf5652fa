//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::ObserverConfig;

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default snapshot file
pub const DEFAULT_SNAPSHOT_PATH: &str = "db.json";

/// Origins allowed by CORS unless overridden
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://www.holenet.net:8111",
];

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Snapshot file loaded at startup and rewritten periodically
    pub snapshot_path: PathBuf,

    /// Origins allowed to make cross-origin requests
    pub allowed_origins: Vec<String>,

    /// Interval between periodic snapshot saves
    pub persist_interval: Duration,

    /// Observer session timing
    pub observer: ObserverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            persist_interval: Duration::from_secs(10),
            observer: ObserverConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the listen port, keeping the bind IP
    pub fn port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }

    /// Set the snapshot file path
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    /// Replace the allowed CORS origins
    pub fn allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Set the persistence interval
    pub fn persist_interval(mut self, interval: Duration) -> Self {
        self.persist_interval = interval;
        self
    }

    /// Set observer session timing
    pub fn observer(mut self, observer: ObserverConfig) -> Self {
        self.observer = observer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.snapshot_path, PathBuf::from("db.json"));
        assert_eq!(config.allowed_origins.len(), 3);
        assert_eq!(config.persist_interval, Duration::from_secs(10));
        assert_eq!(config.observer.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_builder_port_keeps_ip() {
        let config = ServerConfig::default().port(8111);

        assert_eq!(config.bind_addr.port(), 8111);
        assert!(config.bind_addr.ip().is_unspecified());
    }

    #[test]
    fn test_builder_allowed_origins() {
        let config = ServerConfig::default().allowed_origins(["https://polls.example"]);

        assert_eq!(config.allowed_origins, vec!["https://polls.example".to_string()]);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ServerConfig::default()
            .port(3000)
            .snapshot_path("/var/lib/pollcast/db.json")
            .persist_interval(Duration::from_secs(30))
            .observer(ObserverConfig::default().tick_interval(Duration::from_millis(500)));

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.snapshot_path, PathBuf::from("/var/lib/pollcast/db.json"));
        assert_eq!(config.persist_interval, Duration::from_secs(30));
        assert_eq!(config.observer.tick_interval, Duration::from_millis(500));
    }
}
