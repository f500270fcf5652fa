//! Topic entity
//!
//! A topic is a poll: a question, an ordered list of choices and one vote
//! counter per choice. The serialized field names are shared by the HTTP
//! API and the snapshot file.

use serde::{Deserialize, Deserializer, Serialize};

/// Registry-assigned topic identity
pub type TopicId = u64;

/// A single poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Topic {
    /// Unique id, never reused
    pub id: TopicId,
    /// The question being asked
    pub content: String,
    /// Choice labels
    #[serde(deserialize_with = "null_as_empty")]
    pub choices: Vec<String>,
    /// Vote counters, index-aligned with `choices`
    pub votes: Vec<u64>,
    /// Soft-delete marker
    pub deleted: bool,
}

impl Topic {
    /// Create a topic with every counter at zero
    pub(crate) fn new(id: TopicId, content: String, choices: Vec<String>) -> Self {
        let votes = vec![0; choices.len()];
        Self {
            id,
            content,
            choices,
            votes,
            deleted: false,
        }
    }

    /// Whether `index` addresses one of this topic's choices
    pub fn is_valid_choice(&self, index: usize) -> bool {
        index < self.votes.len()
    }

    /// Sum of all counters
    pub fn total_votes(&self) -> u64 {
        self.votes.iter().sum()
    }

    /// Check the choices/votes alignment invariant
    pub(crate) fn is_well_formed(&self) -> bool {
        self.votes.len() == self.choices.len()
    }
}

/// Client-supplied part of a new topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicForm {
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<String>,
}

impl TopicForm {
    pub fn new(content: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            content: content.into(),
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

/// Read an explicit `null` choice list as no choices
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_topic_has_zeroed_votes() {
        let topic = Topic::new(3, "A vs B".into(), vec!["A".into(), "B".into()]);

        assert_eq!(topic.votes, vec![0, 0]);
        assert!(!topic.deleted);
        assert!(topic.is_well_formed());
        assert_eq!(topic.total_votes(), 0);
    }

    #[test]
    fn test_valid_choice() {
        let topic = Topic::new(0, "q".into(), vec!["x".into()]);

        assert!(topic.is_valid_choice(0));
        assert!(!topic.is_valid_choice(1));

        let empty = Topic::new(1, "no choices".into(), Vec::new());
        assert!(!empty.is_valid_choice(0));
    }

    #[test]
    fn test_serialized_field_names() {
        let topic = Topic {
            id: 7,
            content: "Tea or coffee".into(),
            choices: vec!["Tea".into(), "Coffee".into()],
            votes: vec![2, 1],
            deleted: true,
        };

        let json = serde_json::to_value(&topic).unwrap();
        assert_eq!(json["Id"], 7);
        assert_eq!(json["Content"], "Tea or coffee");
        assert_eq!(json["Choices"][1], "Coffee");
        assert_eq!(json["Votes"][0], 2);
        assert_eq!(json["Deleted"], true);
    }

    #[test]
    fn test_form_without_choices() {
        let form: TopicForm = serde_json::from_str(r#"{"Content":"Anything?"}"#).unwrap();

        assert_eq!(form.content, "Anything?");
        assert!(form.choices.is_empty());
    }

    #[test]
    fn test_null_choices_read_as_empty() {
        let form: TopicForm =
            serde_json::from_str(r#"{"Content":"Anything?","Choices":null}"#).unwrap();
        assert!(form.choices.is_empty());

        let topic: Topic = serde_json::from_str(
            r#"{"Id":4,"Content":"q","Choices":null,"Votes":[],"Deleted":false}"#,
        )
        .unwrap();
        assert!(topic.choices.is_empty());
        assert!(topic.is_well_formed());
    }
}
