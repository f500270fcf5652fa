//! Registry error types

use thiserror::Error;

use super::topic::TopicId;

/// Error type for registry operations
///
/// None of these are fatal: the caller rejects the originating request and
/// the registry is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No topic was ever created with this id
    #[error("topic not found: {0}")]
    NotFound(TopicId),

    /// Vote index outside the topic's choice list
    #[error("invalid choice index {index} for topic {id} ({choices} choices)")]
    InvalidIndex {
        id: TopicId,
        index: usize,
        choices: usize,
    },

    /// Topic has been soft-deleted and no longer accepts votes
    #[error("topic deleted: {0}")]
    TopicDeleted(TopicId),

    /// Every assignable topic id has been issued
    #[error("topic id space exhausted")]
    IdSpaceExhausted,
}
