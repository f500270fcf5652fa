//! Topic registry implementation
//!
//! The central store that owns every topic and hands out copies.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::error::RegistryError;
use super::topic::{Topic, TopicForm, TopicId};

/// Everything guarded by the registry lock
#[derive(Debug, Default)]
struct Topics {
    /// Map of topic id to topic, deleted topics included
    by_id: HashMap<TopicId, Topic>,

    /// Next id to hand out; only ever grows. `TopicId::MAX` is never
    /// issued and marks the id space as used up.
    next_id: TopicId,
}

/// Current vote tally of a topic, as read by observer sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub votes: Vec<u64>,
    pub deleted: bool,
}

/// Central registry for all topics
///
/// Thread-safe via a single `RwLock` around the map and the id counter.
/// Reads (listing, tallies, snapshots) share the lock; create, delete and
/// vote take it exclusively.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: RwLock<Topics>,
}

impl TopicRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with previously persisted topics
    ///
    /// The id counter resumes after the highest id present. Callers are
    /// expected to hand in a validated set (see `SnapshotStore::load`); a
    /// topic holding `TopicId::MAX` leaves no ids to create new topics with.
    pub fn from_topics(topics: impl IntoIterator<Item = Topic>) -> Self {
        let by_id: HashMap<TopicId, Topic> = topics.into_iter().map(|t| (t.id, t)).collect();
        let next_id = by_id
            .keys()
            .max()
            .map_or(0, |max| max.checked_add(1).unwrap_or(TopicId::MAX));

        Self {
            topics: RwLock::new(Topics { by_id, next_id }),
        }
    }

    /// List every topic that has not been deleted
    ///
    /// Order is unspecified.
    pub async fn list_active(&self) -> Vec<Topic> {
        let topics = self.topics.read().await;

        topics
            .by_id
            .values()
            .filter(|topic| !topic.deleted)
            .cloned()
            .collect()
    }

    /// Get a copy of a topic, deleted or not
    pub async fn get(&self, id: TopicId) -> Result<Topic, RegistryError> {
        let topics = self.topics.read().await;

        topics
            .by_id
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    /// Read just the vote vector and deletion flag of a topic
    pub async fn tally(&self, id: TopicId) -> Result<Tally, RegistryError> {
        let topics = self.topics.read().await;

        topics
            .by_id
            .get(&id)
            .map(|topic| Tally {
                votes: topic.votes.clone(),
                deleted: topic.deleted,
            })
            .ok_or(RegistryError::NotFound(id))
    }

    /// Create a new topic and return a copy of it
    ///
    /// Only fails once every id below `TopicId::MAX` has been issued.
    pub async fn create(&self, form: TopicForm) -> Result<Topic, RegistryError> {
        let mut topics = self.topics.write().await;

        let id = topics.next_id;
        if id == TopicId::MAX {
            tracing::warn!("Topic id space exhausted");
            return Err(RegistryError::IdSpaceExhausted);
        }
        topics.next_id = id + 1;

        let topic = Topic::new(id, form.content, form.choices);
        topics.by_id.insert(id, topic.clone());

        tracing::info!(
            topic_id = id,
            choices = topic.choices.len(),
            "Topic created"
        );

        Ok(topic)
    }

    /// Soft-delete a topic
    ///
    /// Returns `true` only if this call changed the topic's state.
    pub async fn delete(&self, id: TopicId) -> bool {
        let mut topics = self.topics.write().await;

        match topics.by_id.get_mut(&id) {
            Some(topic) if !topic.deleted => {
                topic.deleted = true;
                tracing::info!(topic_id = id, total_votes = topic.total_votes(), "Topic deleted");
                true
            }
            Some(_) => {
                tracing::debug!(topic_id = id, "Topic already deleted");
                false
            }
            None => false,
        }
    }

    /// Add one vote to a choice and return the updated vote vector
    ///
    /// Rejected votes leave the topic untouched.
    pub async fn vote(&self, id: TopicId, index: usize) -> Result<Vec<u64>, RegistryError> {
        let mut topics = self.topics.write().await;

        let topic = topics
            .by_id
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;

        if topic.deleted {
            return Err(RegistryError::TopicDeleted(id));
        }

        if !topic.is_valid_choice(index) {
            return Err(RegistryError::InvalidIndex {
                id,
                index,
                choices: topic.votes.len(),
            });
        }

        topic.votes[index] += 1;

        Ok(topic.votes.clone())
    }

    /// Copy every topic, deleted ones included, in ascending id order
    ///
    /// The copy is taken under one read lock, so it reflects a single
    /// instant of registry state.
    pub async fn snapshot(&self) -> Vec<Topic> {
        let topics = self.topics.read().await;

        let mut all: Vec<Topic> = topics.by_id.values().cloned().collect();
        all.sort_unstable_by_key(|topic| topic.id);
        all
    }

    /// Number of topics ever created and still held, deleted ones included
    pub async fn len(&self) -> usize {
        self.topics.read().await.by_id.len()
    }

    /// Whether the registry holds no topics at all
    pub async fn is_empty(&self) -> bool {
        self.topics.read().await.by_id.is_empty()
    }
}
