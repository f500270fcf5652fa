//! HTTP and WebSocket front end
//!
//! Maps the REST endpoints onto registry operations, upgrades observer
//! connections into tally sessions and owns the persistence driver for the
//! lifetime of the server.

pub mod config;
pub mod listener;
pub mod routes;
pub mod ws;

pub use config::ServerConfig;
pub use listener::PollServer;
pub use routes::{router, AppState};
