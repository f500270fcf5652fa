//! Poll server listener
//!
//! Wires the registry, persistence driver and HTTP routes together and runs
//! the accept loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::Result;
use crate::persist::{PersistenceDriver, PersistenceStats};
use crate::registry::TopicRegistry;
use crate::server::config::ServerConfig;
use crate::server::routes::{self, AppState};
use crate::snapshot::SnapshotStore;

/// Live poll server
pub struct PollServer {
    config: ServerConfig,
    registry: Arc<TopicRegistry>,
    store: SnapshotStore,
}

impl PollServer {
    /// Create a server around an existing registry
    pub fn new(config: ServerConfig, registry: TopicRegistry) -> Self {
        let store = SnapshotStore::new(config.snapshot_path.clone());

        Self {
            config,
            registry: Arc::new(registry),
            store,
        }
    }

    /// Create a server seeded from the configured snapshot file
    ///
    /// A missing or corrupt snapshot is an error; the server never starts
    /// with an empty registry in place of unreadable state.
    pub async fn load(config: ServerConfig) -> Result<Self> {
        let store = SnapshotStore::new(config.snapshot_path.clone());
        let topics = store.load().await?;
        let registry = TopicRegistry::from_topics(topics);

        if registry.is_empty().await {
            tracing::info!(path = %store.path().display(), "Starting with no topics");
        }

        Ok(Self::new(config, registry))
    }

    /// Get a reference to the topic registry
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server until the process exits
    pub async fn run(&self) -> Result<PersistenceStats> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<PersistenceStats>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    ///
    /// The persistence driver runs alongside the HTTP server and performs a
    /// final save once `shutdown` resolves and in-flight requests finish.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<PersistenceStats>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let topics = self.registry.len().await;
        tracing::info!(
            addr = %addr,
            topics = topics,
            snapshot = %self.store.path().display(),
            "Poll server listening"
        );

        let persistence = PersistenceDriver::new(
            Arc::clone(&self.registry),
            self.store.clone(),
            self.config.persist_interval,
        )
        .spawn();

        let state = AppState::new(Arc::clone(&self.registry), self.config.observer.clone());
        let app = routes::router(state, &self.config.allowed_origins);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        // Flush even if the server itself failed
        let stats = match persistence.shutdown().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Persistence driver panicked");
                PersistenceStats::default()
            }
        };

        served?;
        Ok(stats)
    }
}
