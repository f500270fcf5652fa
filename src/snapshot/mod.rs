//! Snapshot persistence
//!
//! The registry is persisted as one JSON document holding every topic,
//! soft-deleted ones included, in ascending id order:
//!
//! ```json
//! [
//!   {"Id":1,"Content":"A vs B","Choices":["A","B"],"Votes":[3,5],"Deleted":false},
//!   {"Id":2,"Content":"C vs D","Choices":["C","D"],"Votes":[0,0],"Deleted":true}
//! ]
//! ```
//!
//! Saving truncates and rewrites the file in place. There is no rename or
//! fsync step, so a crash mid-write can lose the previous snapshot.

pub mod error;
pub mod store;

pub use error::SnapshotError;
pub use store::SnapshotStore;
