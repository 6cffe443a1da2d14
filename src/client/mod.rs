//! Typed API client for the tracker service
//!
//! The consumer side of the Item Service API: authentication, CRUD and
//! reorder calls for both item kinds, the quote fetch, and the pure
//! completion-stats transform the dashboard renders.

pub mod api;
pub mod stats;
pub mod types;

pub use api::{ApiClient, AuthSession, GoalReorderStore, TaskReorderStore};
pub use stats::{summarize, Completable, CompletionSummary};
pub use types::{GoalItem, GoalUpdate, TaskItem, TaskUpdate};
