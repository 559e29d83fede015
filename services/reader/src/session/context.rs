//! services/reader/src/session/context.rs
//!
//! Process-wide session state: who is reading and what is open.
//!
//! One `AppContext` is created at startup and handed to whatever needs it.
//! It changes only through the named setters below.

use chrono::{DateTime, Utc};
use library_reader_core::domain::{ProgressRecord, UserProfile};
use tracing::info;

/// The item currently open in a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSelection {
    Translation(String),
    Novel(String),
}

#[derive(Debug, Default)]
pub struct AppContext {
    current_user: Option<UserProfile>,
    current_document: Option<DocumentSelection>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    pub fn current_user_id(&self) -> Option<&str> {
        self.current_user.as_ref().map(|u| u.id.as_str())
    }

    pub fn current_document(&self) -> Option<&DocumentSelection> {
        self.current_document.as_ref()
    }

    /// Cached progress of the current user in `document_id`.
    pub fn progress_for(&self, document_id: &str) -> Option<&ProgressRecord> {
        self.current_user.as_ref()?.progress_for(document_id)
    }

    pub fn select_user(&mut self, user: UserProfile) {
        info!(user_id = %user.id, "Active profile: {}", user.name);
        self.current_user = Some(user);
    }

    pub fn open_document(&mut self, selection: DocumentSelection) {
        self.current_document = Some(selection);
    }

    pub fn close_document(&mut self) -> Option<DocumentSelection> {
        self.current_document.take()
    }

    /// Mirrors a persisted position into the current user's cached progress.
    /// Ignored when `user_id` is no longer the active profile.
    pub fn record_progress(&mut self, user_id: &str, document_id: &str, index: usize, at: DateTime<Utc>) {
        if let Some(user) = self.current_user.as_mut().filter(|u| u.id == user_id) {
            user.record_progress(document_id, index, at);
        }
    }
}
