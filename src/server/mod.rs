//! HTTP server for momentum

pub mod http;

pub use http::{run, AppState};
