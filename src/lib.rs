//! Bookshelf Backend Library
//!
//! Book catalog HTTP service with registration, login and role-gated writes.
//! Exposes every module so the binary and integration tests share one router.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;

pub use api::{build_router, AppState};
pub use config::Config;
