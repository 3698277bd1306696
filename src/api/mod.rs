//! HTTP surface: state wiring and the route table

pub mod routes;

pub use routes::{build_router, AppState};
