use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("persistence error: {message}")]
    Storage { message: String },

    #[error("stored document is unreadable: {message}")]
    Serialization { message: String },

    #[error("{category} changed concurrently, giving up after {attempts} attempts")]
    Conflict { category: String, attempts: u32 },
}
