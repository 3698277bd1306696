//! Router assembly
//!
//! Public: `GET /`, `GET /health`, `POST /register`, `POST /login`, `GET /books`.
//! Authenticated: `GET /books/:id`.
//! Authenticated + admin: `POST /books`, `PUT /books/:id`, `DELETE /books/:id`.

use crate::auth::{
    api as auth_api, auth_middleware, require_admin, AuthLayerState, AuthState,
    CredentialService, JwtHandler, UserStore,
};
use crate::catalog::{api as catalog_api, BookStore, CatalogState};
use crate::errors::{error_responder, ApiError, ErrorVerbosity};
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Everything the router needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub auth_layer: AuthLayerState,
    pub catalog: CatalogState,
    pub verbosity: ErrorVerbosity,
}

impl AppState {
    pub fn new(
        user_store: Arc<UserStore>,
        book_store: Arc<BookStore>,
        jwt_handler: Arc<JwtHandler>,
        bcrypt_cost: u32,
        verbosity: ErrorVerbosity,
    ) -> Self {
        let credentials =
            CredentialService::new(user_store.clone(), jwt_handler.clone(), bcrypt_cost);

        Self {
            auth: AuthState::new(credentials),
            auth_layer: AuthLayerState {
                jwt_handler,
                user_store,
            },
            catalog: CatalogState { books: book_store },
            verbosity,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let auth_router = Router::new()
        .route("/register", post(auth_api::register))
        .route("/login", post(auth_api::login))
        .with_state(state.auth);

    let admin_routes = Router::new()
        .route("/books", post(catalog_api::create_book))
        .route(
            "/books/:id",
            put(catalog_api::update_book).delete(catalog_api::delete_book),
        )
        .route_layer(middleware::from_fn(require_admin));

    // Layers added last run first: the authenticator always precedes the role gate.
    let protected_routes = Router::new()
        .route("/books/:id", get(catalog_api::get_book))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.auth_layer,
            auth_middleware,
        ))
        .with_state(state.catalog.clone());

    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/books", get(catalog_api::list_books))
        .with_state(state.catalog);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(auth_router)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.verbosity,
            error_responder,
        ))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Book Directory server is running" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
