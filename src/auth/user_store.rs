//! User Storage
//! Mission: Persist user accounts in SQLite with unique usernames and emails

use crate::auth::models::{User, UserRole};
use crate::db::{self, StoreError};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

/// User storage with SQLite backend
#[derive(Clone)]
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        Self::from_connection(db::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initialize database schema
    fn init_db(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create users table")?;

        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let role_str: String = row.get(4)?;
        let role = UserRole::parse(&role_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown role {role_str}").into(),
            )
        })?;

        Ok(User {
            id: db::uuid_column(row, 0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            role,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// Get user by id
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id.to_string()],
            Self::row_to_user,
        )
        .optional()
        .context("Failed to load user by id")
    }

    /// Get user by (already normalised) email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            Self::row_to_user,
        )
        .optional()
        .context("Failed to load user by email")
    }

    /// Get any user holding either the email or the username
    pub async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 OR username = ?2 LIMIT 1"),
            params![email, username],
            Self::row_to_user,
        )
        .optional()
        .context("Failed to look up existing user")
    }

    /// Insert a fully built user. Fails with `StoreError::Duplicate` when the
    /// id, username or email is already taken.
    pub async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
                user.updated_at,
            ],
        )?;

        info!("✅ Created user: {} ({})", user.username, user.role.as_str());

        Ok(())
    }

    pub async fn count_admins(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check for admin users")
    }
}
