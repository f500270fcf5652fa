//! pollcast: live polling server
//!
//! Clients create topics (a question with a list of choices), vote on them
//! and watch the tallies change in near real time over a WebSocket.
//!
//! - [`registry`]: the concurrent topic store every other component reads from
//! - [`snapshot`]: JSON snapshot file load/save
//! - [`session`]: per-observer tally streaming
//! - [`persist`]: background snapshot timer with a final flush on shutdown
//! - [`server`]: axum routes and the server entry point
//!
//! # Example
//!
//! ```no_run
//! use pollcast::{PollServer, ServerConfig};
//!
//! # async fn run() -> pollcast::Result<()> {
//! let config = ServerConfig::default().port(8080).snapshot_path("db.json");
//! let server = PollServer::load(config).await?;
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod persist;
pub mod registry;
pub mod server;
pub mod session;
pub mod snapshot;

pub use error::{Error, Result};
pub use persist::{PersistenceDriver, PersistenceHandle};
pub use registry::{RegistryError, Topic, TopicForm, TopicId, TopicRegistry};
pub use server::{PollServer, ServerConfig};
pub use session::{ObserverConfig, ObserverSession, TallySink};
pub use snapshot::{SnapshotError, SnapshotStore};
