//! Error types for DOM access.

use thiserror::Error;

/// Errors raised while binding to or driving the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// No element with the given id exists in the document
    #[error("Missing element: #{id}")]
    MissingElement {
        /// The id that was looked up
        id: String,
    },

    /// Local storage unavailable or rejected a write
    #[error("Storage error: {0}")]
    Storage(String),

    /// Reading a file into memory failed
    #[error("Failed to read file '{name}': {message}")]
    FileRead {
        /// Name of the file being read
        name: String,
        /// Reason reported by the reader
        message: String,
    },

    /// An exception thrown by a browser API
    #[error("JavaScript error: {0}")]
    Js(String),
}
