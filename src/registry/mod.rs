//! Topic registry
//!
//! The registry is the single source of truth for every topic the server
//! knows about. Request handlers, observer sessions and the persistence
//! driver all go through it; nothing else holds a mutable topic.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<TopicRegistry>
//!                  ┌──────────────────────────────┐
//!                  │ RwLock<Topics {              │
//!                  │   by_id: HashMap<u64, Topic>,│
//!                  │   next_id: u64,              │
//!                  │ }>                           │
//!                  └──────────────┬───────────────┘
//!                                 │
//!       ┌─────────────────┬───────┴─────────┬──────────────────┐
//!       ▼                 ▼                 ▼                  ▼
//!  [HTTP handler]   [HTTP handler]   [ObserverSession]  [PersistenceDriver]
//!   create/delete       vote()          tally()            snapshot()
//! ```
//!
//! # Locking
//!
//! One lock guards the whole map together with the id counter. Every
//! operation takes it exactly once and never awaits while holding it, so
//! all operations are linearizable and no reader can see a half-built topic
//! or a partially written vote vector.

pub mod error;
pub mod store;
pub mod topic;

pub use error::RegistryError;
pub use store::{Tally, TopicRegistry};
pub use topic::{Topic, TopicForm, TopicId};
