//! Task document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for tasks
pub const TASK_COLLECTION: &str = "tasks";

/// Task document stored in MongoDB
///
/// `order` is a sort key, not an index: values need not be contiguous or
/// unique, and reordering one task never renumbers its siblings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TaskDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Owning user; every query is scoped by this field
    pub user_id: ObjectId,

    /// Task title, non-empty after trimming
    pub title: String,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,

    /// Manual sort key, ascending for display
    #[serde(default)]
    pub order: f64,
}

impl TaskDoc {
    /// Create a new task. New tasks always start at order 0.
    pub fn new(user_id: ObjectId, title: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            user_id,
            title,
            completed: false,
            order: 0.0,
        }
    }
}

impl IntoIndexes for TaskDoc {
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

impl MutMetadata for TaskDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let owner = ObjectId::new();
        let task = TaskDoc::new(owner, "Buy milk".into());

        assert_eq!(task.user_id, owner);
        assert!(!task.completed);
        assert_eq!(task.order, 0.0);
        assert!(task._id.is_none());
    }
}
