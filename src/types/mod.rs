//! Shared types for momentum

mod error;

pub use error::{Result, TrackerError};
