use thiserror::Error;

/// Errors that can occur while building a book
#[derive(Error, Debug)]
pub enum BookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BookError>;
