//! Wire types for the tracker API
//!
//! The server guarantees every field is present in item responses, so these
//! deserialize strictly - no defensive defaulting on the client side.

use serde::{Deserialize, Serialize};

use crate::db::schemas::GoalType;
use crate::engine::ListEntry;

/// A task as returned by the API
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub order: f64,
}

/// A goal as returned by the API
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GoalItem {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub order: f64,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
}

impl ListEntry for TaskItem {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ListEntry for GoalItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial update for a task. Absent fields are left untouched.
#[derive(Serialize, Clone, Debug, Default)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

/// Partial update for a goal. Absent fields are left untouched.
#[derive(Serialize, Clone, Debug, Default)]
pub struct GoalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_item_round_trip() {
        let json = r#"{"id":"64b7f3d2a1c9e85f2d4b0a11","title":"Run a 10k","completed":false,"order":2.0,"type":"monthly"}"#;
        let goal: GoalItem = serde_json::from_str(json).unwrap();
        assert_eq!(goal.goal_type, GoalType::Monthly);
        assert!(!goal.completed);

        let back = serde_json::to_string(&goal).unwrap();
        assert!(back.contains(r#""type":"monthly""#));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        // Strict schema: the server always sends `completed`, so a response
        // without it is a contract violation, not something to patch over.
        let json = r#"{"id":"64b7f3d2a1c9e85f2d4b0a11","title":"Run a 10k","order":0.0}"#;
        assert!(serde_json::from_str::<TaskItem>(json).is_err());
    }

    #[test]
    fn test_partial_update_serializes_only_present_fields() {
        let update = TaskUpdate {
            completed: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"completed":true}"#);
    }
}
