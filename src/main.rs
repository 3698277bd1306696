//! Bookshelf - book catalog API
//! Registration, login and JWT-gated CRUD over books

use anyhow::{Context, Result};
use bookshelf_backend::{
    auth::{CredentialService, JwtHandler, UserStore},
    build_router,
    catalog::BookStore,
    errors::ErrorVerbosity,
    AppState, Config,
};
use clap::Parser;
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    info!("🚀 Bookshelf API starting ({:?})", config.app_env);

    let jwt_secret = config.resolve_jwt_secret()?;
    let jwt_handler = Arc::new(JwtHandler::new(&jwt_secret));

    let auth_db_path = resolve_data_path(&config.auth_db_path);
    let user_store = Arc::new(UserStore::new(&auth_db_path)?);
    info!("🔐 Authentication initialized at: {}", auth_db_path);

    let catalog_db_path = resolve_data_path(&config.catalog_db_path);
    let book_store = Arc::new(BookStore::new(&catalog_db_path)?);
    info!("📚 Catalog initialized at: {}", catalog_db_path);

    if let Some(seed) = config.admin_seed() {
        let credentials =
            CredentialService::new(user_store.clone(), jwt_handler.clone(), config.bcrypt_cost);
        credentials
            .ensure_admin(&seed.username, &seed.email, &seed.password)
            .await
            .context("Failed to seed admin user")?;
    } else {
        warn!("No ADMIN_* credentials configured; catalog writes need an existing admin");
    }

    let state = AppState::new(
        user_store,
        book_store,
        jwt_handler,
        config.bcrypt_cost,
        ErrorVerbosity {
            expose_stack: !config.is_production(),
        },
    );
    let app = build_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

/// Initialize tracing with env-driven filtering
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf_backend=debug,bookshelf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

/// Relative paths are anchored at the crate directory, not the caller's cwd
fn resolve_data_path(path: &Path) -> String {
    if path.is_absolute() {
        return path.to_string_lossy().to_string();
    }

    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(path)
        .to_string_lossy()
        .to_string()
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate's own .env when started from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
