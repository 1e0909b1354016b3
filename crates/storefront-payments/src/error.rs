//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Backend API rejected or failed a request
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend reported the resource as missing (404)
    #[error("Not found: {0}")]
    BackendNotFound(String),

    /// Payment gateway error
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Gateway script/widget never became available
    #[error("Payment gateway did not load")]
    GatewayUnavailable,

    /// Server-side payment verification rejected the confirmation
    #[error("Payment verification failed: {0}")]
    Verification(String),

    /// Checkout preconditions not met (invalid contact, no plan)
    #[error("Validation error: {0}")]
    Validation(#[from] storefront_core::CoreError),

    /// No purchasable plan could be resolved
    #[error("No plan available: {0}")]
    PlanUnavailable(String),

    /// A confirm-and-pay is already in flight in this session
    #[error("A payment is already being processed")]
    AlreadyProcessing,

    /// Draft storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Backend(_) | PaymentError::GatewayUnavailable | PaymentError::Storage(_)
        )
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Backend(_) => "Payment processing failed. Please try again.".into(),
            PaymentError::BackendNotFound(_) => "The requested record was not found.".into(),
            PaymentError::Gateway(_) => "The payment could not be completed.".into(),
            PaymentError::GatewayUnavailable => {
                "The payment gateway did not load. Please try again.".into()
            }
            PaymentError::Verification(msg) => msg.clone(),
            PaymentError::Validation(e) => e.user_message(),
            PaymentError::PlanUnavailable(_) => "No plans are available right now.".into(),
            PaymentError::AlreadyProcessing => "A payment is already being processed.".into(),
            _ => "An error occurred processing your request.".into(),
        }
    }
}
