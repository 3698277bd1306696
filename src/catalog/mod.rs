//! Book catalog: storage and CRUD handlers

pub mod api;
pub mod models;
pub mod store;

pub use api::CatalogState;
pub use store::BookStore;
