mod document_store;
mod repositories;

pub use document_store::SqliteDocumentStore;
