//! Error types for MaskRoute PII masking

use crate::matcher::Category;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The entity recognizer could not be loaded or queried.
    #[error("Entity recognition model unavailable: {0}")]
    ModelUnavailable(String),

    /// Input that cannot be masked as text.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Substitution error: {0}")]
    Substitution(String),

    /// No acceptable replacement could be generated for a category.
    #[error("Could not generate a collision-free replacement for {category} after {attempts} attempts")]
    SyntheticExhausted { category: Category, attempts: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<aho_corasick::BuildError> for Error {
    fn from(err: aho_corasick::BuildError) -> Self {
        Error::Substitution(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
