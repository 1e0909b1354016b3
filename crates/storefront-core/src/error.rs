//! Core Error Types

use thiserror::Error;

/// Result type alias for core domain operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Domain validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Contact name is missing
    #[error("Name is required")]
    MissingName,

    /// Email address failed validation
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Phone number is not a 10-digit local number
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// Business vertical label is not recognized
    #[error("Unknown business vertical: {0}")]
    UnknownVertical(String),
}

impl CoreError {
    /// Convert to a message suitable for inline display on a form
    pub fn user_message(&self) -> String {
        match self {
            CoreError::MissingName => "Please enter your name.".into(),
            CoreError::InvalidEmail(_) => "Please enter a valid email address.".into(),
            CoreError::InvalidPhone(_) => "Please enter a valid 10-digit phone number.".into(),
            CoreError::UnknownVertical(v) => format!("Unsupported business type: {}", v),
        }
    }
}
