//! services/reader/src/error.rs
//!
//! Defines the primary error type for the reader service.

use crate::config::ConfigError;
use library_reader_core::pagination::PaginationError;
use library_reader_core::ports::PortError;

/// The primary error type for the `reader` service.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A navigation request that the open content cannot satisfy.
    #[error("Navigation error: {0}")]
    Pagination(#[from] PaginationError),

    /// Represents an error from building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., reading the terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No profile with id '{0}'")]
    UnknownProfile(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
