//! Goal document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for goals
pub const GOAL_COLLECTION: &str = "goals";

/// Goal category
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    #[default]
    General,
    Weekly,
    Monthly,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Self::General),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(()),
        }
    }
}

/// Goal document stored in MongoDB
///
/// Same shape as a task, plus the category type. `order` follows the same
/// sort-key semantics.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct GoalDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Owning user; every query is scoped by this field
    pub user_id: ObjectId,

    /// Goal title, non-empty after trimming
    pub title: String,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,

    /// Manual sort key, ascending for display
    #[serde(default)]
    pub order: f64,

    /// Goal category
    #[serde(default)]
    pub goal_type: GoalType,
}

impl GoalDoc {
    /// Create a new goal. New goals always start at order 0.
    pub fn new(user_id: ObjectId, title: String, goal_type: GoalType) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            user_id,
            title,
            completed: false,
            order: 0.0,
            goal_type,
        }
    }
}

impl IntoIndexes for GoalDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Owner-scoped lookups
            (
                doc! { "user_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("user_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for GoalDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_type_round_trip() {
        for (s, t) in [
            ("general", GoalType::General),
            ("weekly", GoalType::Weekly),
            ("monthly", GoalType::Monthly),
        ] {
            assert_eq!(s.parse::<GoalType>(), Ok(t));
            assert_eq!(t.as_str(), s);
        }
    }

    #[test]
    fn test_goal_type_rejects_unknown() {
        assert!("invalid".parse::<GoalType>().is_err());
        assert!("Weekly".parse::<GoalType>().is_err());
        assert!("".parse::<GoalType>().is_err());
    }

    #[test]
    fn test_goal_type_defaults_to_general() {
        assert_eq!(GoalType::default(), GoalType::General);
    }
}
