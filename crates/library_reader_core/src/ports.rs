//! crates/library_reader_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the reader's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the remote library API and how it is reached.

use async_trait::async_trait;
use crate::domain::{Document, ProgressUpdate, TranslationUnit, UserProfile};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP clients).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The request could not be sent, or the service answered with a non-success status.
    #[error("Network failure: {0}")]
    Network(String),
    /// The service answered, but not with the shape we expected.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait LibraryService: Send + Sync {
    /// Lists every document in the catalog.
    async fn list_documents(&self) -> PortResult<Vec<Document>>;

    /// Fetches the translation units of a document in reading order.
    async fn get_translations(&self, document_id: &str) -> PortResult<Vec<TranslationUnit>>;

    /// Lists the reader profiles, each with its cached progress map.
    async fn list_users(&self) -> PortResult<Vec<UserProfile>>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Reads the stored position for a (user, document) pair.
    ///
    /// The value is returned as stored and has not been validated against any
    /// content; `None` means the store holds no position.
    async fn fetch_progress(&self, user_id: &str, document_id: &str) -> PortResult<Option<i64>>;

    async fn save_progress(&self, update: &ProgressUpdate) -> PortResult<()>;
}
