//! Authentication Module
//! Mission: Registration, login and request-time identity/role enforcement

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod service;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, require_admin, AuthLayerState};
pub use service::CredentialService;
pub use user_store::UserStore;
