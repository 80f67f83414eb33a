//! Error types and handling for the `TripPlanner` application

use thiserror::Error;

/// Main error type for the `TripPlanner` application
///
/// The scoring and itinerary functions never produce one of these; they are
/// raised by configuration loading, request validation and the integration
/// layer when a plan cannot even be started.
#[derive(Error, Debug)]
pub enum TripPlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A destination or origin that could not be located
    #[error("Not found: {message}")]
    NotFound { message: String },
}

impl TripPlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripPlannerError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            TripPlannerError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            TripPlannerError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripPlannerError::NotFound { message } => {
                format!("{message}. Please check the spelling and try again.")
            }
        }
    }
}
