//! Momentum - personal productivity tracker
//!
//! A REST API for per-user task and goal lists with manual drag reordering,
//! plus the client-side reordering engine that drives it.
//!
//! ## Services
//!
//! - **Auth**: register/login/verify with Argon2 password hashing and JWT sessions
//! - **Items**: CRUD + reorder endpoints for tasks and goals, scoped per owner
//! - **Quote**: motivational quote proxy with a TTL cache over a third-party API
//! - **Engine**: hold-to-drag gesture handling, optimistic list state, rollback

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod engine;
pub mod quote;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, TrackerError};
