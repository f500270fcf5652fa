//! Live tally sessions
//!
//! Each observer connection bound to a topic gets its own session task.
//! The session pushes the topic's vote tally immediately and then once per
//! tick until the topic is deleted or the observer goes away.
//!
//! ```text
//!   open()          run()                        tick / re-read tally
//!  ┌──────┐  ok   ┌────────┐ ───────────────────────────────┐
//!  │ Init │ ────► │ Active │ ◄──────────────────────────────┘
//!  └──┬───┘       └───┬────┘
//!     │ NotFound      │ deleted / push failed / push timed out /
//!     │               │ observer left
//!     ▼               ▼
//!  rejected       ┌────────┐
//!                 │ Closed │
//!                 └────────┘
//! ```

pub mod config;
pub mod observer;
pub mod sink;

pub use config::ObserverConfig;
pub use observer::{CloseReason, ObserverPhase, ObserverSession, SessionSummary};
pub use sink::{Disconnected, TallySink};
