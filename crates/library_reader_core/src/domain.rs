//! crates/library_reader_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any network or serialization format.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

//=========================================================================================
// Catalog Entries
//=========================================================================================

/// A catalog entry served by the library API: a source work with its
/// translation counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
    pub cover_image: Option<String>,
    pub rating: Option<u8>,
    pub page_count: u32,
    pub pages_processed: u32,
    pub status: String,
    pub translation_count: usize,
}

impl Document {
    /// The title to show for this document. Untitled documents fall back to
    /// their filename, without the `.pdf` suffix and with underscores as spaces.
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => self
                .filename
                .strip_suffix(".pdf")
                .unwrap_or(&self.filename)
                .replace('_', " "),
        }
    }
}

/// Display metadata for a novel in the built-in catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Novel {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub published_year: i32,
    pub cover_image: String,
    pub rating: u8,
}

/// One chapter of a novel. Pages are pre-chunked text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: String,
    pub number: u32,
    pub title: String,
    pub pages: Vec<String>,
}

/// A novel together with its readable chapters.
#[derive(Debug, Clone, PartialEq)]
pub struct NovelWithContent {
    pub novel: Novel,
    pub chapters: Vec<Chapter>,
}

/// One pre-chunked block of translated text covering one or more source pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub id: i64,
    pub pages: Vec<u32>,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

//=========================================================================================
// Users and Progress
//=========================================================================================

/// The last known reading position of one user in one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub current_page: usize,
    pub last_read: Option<DateTime<Utc>>,
}

/// A single progress write. The client timestamp lets the store resolve
/// out-of-order arrivals by last-timestamp-wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub user_id: String,
    pub document_id: String,
    pub current_page: usize,
    pub timestamp: DateTime<Utc>,
}

/// A reader profile and its cached progress, keyed by document id.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub reading_progress: HashMap<String, ProgressRecord>,
}

impl UserProfile {
    pub fn progress_for(&self, document_id: &str) -> Option<&ProgressRecord> {
        self.reading_progress.get(document_id)
    }

    /// Mirrors a persisted position into the cached progress map.
    pub fn record_progress(&mut self, document_id: &str, index: usize, at: DateTime<Utc>) {
        self.reading_progress.insert(
            document_id.to_string(),
            ProgressRecord {
                current_page: index,
                last_read: Some(at),
            },
        );
    }
}
