use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Book not found: {0}")]
    BookNotFound(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation failed: {0}")]
    Validation(String),
}
