//! Runtime configuration
//!
//! Every setting can come from a flag or an environment variable (`.env` is
//! loaded first by `main`).

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

use crate::auth::service::DEFAULT_BCRYPT_COST;

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppEnv {
    Development,
    Production,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "bookshelf")]
#[command(about = "Book catalog API with registration, login and role-gated writes")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// HS256 signing secret for session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// bcrypt work factor
    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_BCRYPT_COST)]
    pub bcrypt_cost: u32,

    #[arg(long, env = "AUTH_DB_PATH", default_value = "bookshelf_auth.db")]
    pub auth_db_path: PathBuf,

    #[arg(long, env = "CATALOG_DB_PATH", default_value = "bookshelf_catalog.db")]
    pub catalog_db_path: PathBuf,

    #[arg(long, env = "APP_ENV", value_enum, default_value = "development")]
    pub app_env: AppEnv,

    /// Seed an admin account at startup (all three must be set)
    #[arg(long, env = "ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

/// Credentials for the optional startup admin
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Signing secret; production refuses to start without one
    pub fn resolve_jwt_secret(&self) -> Result<String> {
        match self.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => Ok(secret.to_string()),
            _ if self.is_production() => bail!("JWT_SECRET must be set when APP_ENV=production"),
            _ => {
                warn!("⚠️  JWT_SECRET not set, using development secret");
                Ok(DEV_JWT_SECRET.to_string())
            }
        }
    }

    pub fn admin_seed(&self) -> Option<AdminSeed> {
        match (
            &self.admin_username,
            &self.admin_email,
            &self.admin_password,
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminSeed {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31");
        }
        Ok(())
    }
}
