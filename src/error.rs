//! Error types for composite text

use thiserror::Error;

/// Result type alias for text operations
pub type Result<T> = std::result::Result<T, TextError>;

/// Text error types
#[derive(Error, Debug)]
pub enum TextError {
    /// A string reference could not be resolved by the resource provider
    #[error("Unresolved string reference: {id}")]
    Resolution { id: String },

    /// A plural reference could not be resolved for the given quantity
    #[error("Unresolved plural reference: {id} (quantity {quantity})")]
    PluralResolution { id: String, quantity: i64 },

    /// A substitution pattern failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    Message(String),
}

impl TextError {
    /// Whether this error came from resolving a reference
    pub fn is_resolution(&self) -> bool {
        matches!(self, TextError::Resolution { .. } | TextError::PluralResolution { .. })
    }
}
