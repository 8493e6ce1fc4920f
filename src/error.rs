//! Error types for the prediction and history actions.
//!
//! `Display` is for logs. What the user sees comes from `user_message`,
//! which keeps the wording the pages have always shown.

use thiserror::Error;

use crate::api::TransportError;
use crate::constants::messages;

/// Errors that can end an image analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    /// Selected file is not declared as an image
    #[error("File '{name}' has media type '{media_type}', expected image/*")]
    InvalidMediaType {
        /// File name
        name: String,
        /// Declared media type (may be empty)
        media_type: String,
    },

    /// The server answered with an `error` field
    #[error("Server rejected prediction: {0}")]
    Server(String),

    /// The request never produced a response body
    #[error("Prediction request failed: {0}")]
    Transport(#[from] TransportError),

    /// The body was not the expected JSON shape
    #[error("Malformed prediction response: {0}")]
    Malformed(String),
}

impl PredictError {
    /// Text for the blocking alert.
    pub fn user_message(&self) -> String {
        match self {
            PredictError::InvalidMediaType { .. } => messages::NOT_AN_IMAGE.to_string(),
            PredictError::Server(message) => format!("Error: {}", message),
            PredictError::Transport(_) | PredictError::Malformed(_) => {
                messages::PREDICTION_FAILED.to_string()
            }
        }
    }
}

/// Errors that can end a clear-history request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// The server answered without `success: true`
    #[error("Server refused to clear history: {}", .0.as_deref().unwrap_or("no reason given"))]
    Server(Option<String>),

    #[error("Clear-history request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed clear-history response: {0}")]
    Malformed(String),
}

impl HistoryError {
    /// Text for the blocking alert.
    pub fn user_message(&self) -> String {
        match self {
            HistoryError::Server(message) => format!(
                "Error clearing history: {}",
                message.as_deref().unwrap_or(messages::UNKNOWN_ERROR)
            ),
            HistoryError::Transport(_) | HistoryError::Malformed(_) => {
                messages::CLEAR_HISTORY_FAILED.to_string()
            }
        }
    }
}
