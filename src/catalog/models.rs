//! Catalog Models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Book record as stored and served
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub publication_year: i32,
    pub isbn: String,
    pub price: f64,
    pub is_available: Option<bool>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create request body - every field except availability is required
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub publication_year: i32,
    pub isbn: String,
    pub price: f64,
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// Partial update body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub is_available: Option<bool>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.genre.is_none()
            && self.publication_year.is_none()
            && self.isbn.is_none()
            && self.price.is_none()
            && self.is_available.is_none()
    }

    pub fn apply(self, book: &mut Book) {
        if let Some(v) = self.title {
            book.title = v;
        }
        if let Some(v) = self.author {
            book.author = v;
        }
        if let Some(v) = self.description {
            book.description = v;
        }
        if let Some(v) = self.genre {
            book.genre = v;
        }
        if let Some(v) = self.publication_year {
            book.publication_year = v;
        }
        if let Some(v) = self.isbn {
            book.isbn = v;
        }
        if let Some(v) = self.price {
            book.price = v;
        }
        if self.is_available.is_some() {
            book.is_available = self.is_available;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub message: &'static str,
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub message: &'static str,
    pub data: Book,
}

#[derive(Debug, Serialize)]
pub struct BookCreatedResponse {
    pub message: &'static str,
    pub book: Book,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdatedResponse {
    pub message: &'static str,
    pub updated_book: Book,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
