//! Book Storage
//! Mission: Persist the catalog in SQLite

use crate::catalog::models::{Book, BookPatch, NewBook};
use crate::db::{self, StoreError};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

const BOOK_COLUMNS: &str = "id, title, author, description, genre, publication_year, isbn, \
                            price, is_available, created_at, updated_at";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("Book with given ISBN already exists")]
    DuplicateIsbn,
    #[error("Book not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => CatalogError::DuplicateIsbn,
            StoreError::Other(e) => CatalogError::Internal(e),
        }
    }
}

/// Trims text fields and checks the schema constraints
fn validate(book: &mut Book) -> Result<(), CatalogError> {
    for (name, value) in [
        ("title", &mut book.title),
        ("author", &mut book.author),
        ("description", &mut book.description),
        ("genre", &mut book.genre),
        ("isbn", &mut book.isbn),
    ] {
        *value = value.trim().to_string();
        if value.is_empty() {
            return Err(CatalogError::Validation(format!("{name} is required")));
        }
    }

    if !book.price.is_finite() || book.price < 0.0 {
        return Err(CatalogError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }

    Ok(())
}

#[derive(Clone)]
pub struct BookStore {
    conn: Arc<Mutex<Connection>>,
}

impl BookStore {
    pub fn new(db_path: &str) -> Result<Self> {
        Self::from_connection(db::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS books (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                description TEXT NOT NULL,
                genre TEXT NOT NULL,
                publication_year INTEGER NOT NULL,
                isbn TEXT UNIQUE NOT NULL,
                price REAL NOT NULL CHECK (price >= 0),
                is_available INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create books table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
        Ok(Book {
            id: db::uuid_column(row, 0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            description: row.get(3)?,
            genre: row.get(4)?,
            publication_year: row.get(5)?,
            isbn: row.get(6)?,
            price: row.get(7)?,
            is_available: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn load(conn: &Connection, id: &Uuid) -> Result<Option<Book>> {
        conn.query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
            params![id.to_string()],
            Self::row_to_book,
        )
        .optional()
        .context("Failed to load book")
    }

    pub async fn find(&self) -> Result<Vec<Book>, CatalogError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at ASC"
            ))
            .context("Failed to prepare book listing")?;

        let books = stmt
            .query_map([], Self::row_to_book)
            .context("Failed to list books")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read book row")?;

        Ok(books)
    }

    pub async fn create(&self, data: NewBook) -> Result<Book, CatalogError> {
        let now = Utc::now().to_rfc3339();
        let mut book = Book {
            id: Uuid::new_v4(),
            title: data.title,
            author: data.author,
            description: data.description,
            genre: data.genre,
            publication_year: data.publication_year,
            isbn: data.isbn,
            price: data.price,
            is_available: data.is_available,
            created_at: now.clone(),
            updated_at: now,
        };
        validate(&mut book)?;

        let conn = self.conn.lock().await;
        conn.execute(
            &format!("INSERT INTO books ({BOOK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
            params![
                book.id.to_string(),
                book.title,
                book.author,
                book.description,
                book.genre,
                book.publication_year,
                book.isbn,
                book.price,
                book.is_available,
                book.created_at,
                book.updated_at,
            ],
        )
        .map_err(StoreError::from)?;

        info!("📚 Book created: {} ({})", book.title, book.id);
        Ok(book)
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Book>, CatalogError> {
        let conn = self.conn.lock().await;
        Ok(Self::load(&conn, id)?)
    }

    pub async fn update_by_id(&self, id: &Uuid, patch: BookPatch) -> Result<Book, CatalogError> {
        let conn = self.conn.lock().await;
        let mut book = Self::load(&conn, id)?.ok_or(CatalogError::NotFound)?;

        patch.apply(&mut book);
        validate(&mut book)?;
        book.updated_at = Utc::now().to_rfc3339();

        conn.execute(
            "UPDATE books SET title = ?2, author = ?3, description = ?4, genre = ?5,
                publication_year = ?6, isbn = ?7, price = ?8, is_available = ?9, updated_at = ?10
             WHERE id = ?1",
            params![
                book.id.to_string(),
                book.title,
                book.author,
                book.description,
                book.genre,
                book.publication_year,
                book.isbn,
                book.price,
                book.is_available,
                book.updated_at,
            ],
        )
        .map_err(StoreError::from)?;

        info!("📚 Book updated: {}", book.id);
        Ok(book)
    }

    pub async fn delete_by_id(&self, id: &Uuid) -> Result<(), CatalogError> {
        let conn = self.conn.lock().await;
        let rows_affected = conn
            .execute("DELETE FROM books WHERE id = ?1", params![id.to_string()])
            .context("Failed to delete book")?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound);
        }

        info!("🗑️  Book deleted: {}", id);
        Ok(())
    }
}
