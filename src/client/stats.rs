//! Completion statistics for the dashboard
//!
//! A pure, stateless transform over fetched lists. The dashboard chart reads
//! these counts; nothing here talks to the server.

use crate::client::types::{GoalItem, TaskItem};

/// Anything with a completion flag
pub trait Completable {
    fn is_completed(&self) -> bool;
}

impl Completable for TaskItem {
    fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Completable for GoalItem {
    fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Completion counts for one item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionSummary {
    pub total: usize,
    pub completed: usize,
}

impl CompletionSummary {
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    /// Share of items completed, in percent. An empty list counts as 0%.
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }
}

/// Derive completion counts from a fetched list
pub fn summarize<T: Completable>(items: &[T]) -> CompletionSummary {
    CompletionSummary {
        total: items.len(),
        completed: items.iter().filter(|i| i.is_completed()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> TaskItem {
        TaskItem {
            id: "64b7f3d2a1c9e85f2d4b0a11".into(),
            title: "Buy milk".into(),
            completed,
            order: 0.0,
        }
    }

    #[test]
    fn test_summarize_counts_completed() {
        let items = vec![task(true), task(false), task(true)];
        let summary = summarize(&items);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.remaining(), 1);
    }

    #[test]
    fn test_empty_list_is_zero_percent() {
        let summary = summarize::<TaskItem>(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percent_complete(), 0.0);
    }

    #[test]
    fn test_percent_complete() {
        let items = vec![task(true), task(false), task(false), task(false)];
        assert_eq!(summarize(&items).percent_complete(), 25.0);
    }
}
