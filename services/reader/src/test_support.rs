//! In-memory implementations of the core ports, shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use library_reader_core::domain::{
    Document, ProgressUpdate, TranslationUnit, UserProfile,
};
use library_reader_core::ports::{LibraryService, PortError, PortResult, ProgressStore};

#[derive(Default)]
pub struct FakeProgressStore {
    stored: Mutex<HashMap<(String, String), i64>>,
    writes: Mutex<Vec<ProgressUpdate>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeProgressStore {
    pub fn put(&self, user_id: &str, document_id: &str, value: i64) {
        self.stored
            .lock()
            .unwrap()
            .insert((user_id.to_string(), document_id.to_string()), value);
    }

    pub fn get(&self, user_id: &str, document_id: &str) -> Option<i64> {
        self.stored
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), document_id.to_string()))
            .copied()
    }

    pub fn writes(&self) -> Vec<ProgressUpdate> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProgressStore for FakeProgressStore {
    async fn fetch_progress(&self, user_id: &str, document_id: &str) -> PortResult<Option<i64>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::Network("connection refused".to_string()));
        }
        Ok(self.get(user_id, document_id))
    }

    async fn save_progress(&self, update: &ProgressUpdate) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Network("connection reset".to_string()));
        }
        self.put(&update.user_id, &update.document_id, update.current_page as i64);
        self.writes.lock().unwrap().push(update.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeLibrary {
    pub documents: Vec<Document>,
    pub translations: HashMap<String, Vec<TranslationUnit>>,
    pub users: Mutex<Vec<UserProfile>>,
    pub translation_delay: Option<Duration>,
    user_fetches: AtomicUsize,
    offline: AtomicBool,
}

impl FakeLibrary {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn user_fetches(&self) -> usize {
        self.user_fetches.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> PortResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PortError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryService for FakeLibrary {
    async fn list_documents(&self) -> PortResult<Vec<Document>> {
        self.check_online()?;
        Ok(self.documents.clone())
    }

    async fn get_translations(&self, document_id: &str) -> PortResult<Vec<TranslationUnit>> {
        if let Some(delay) = self.translation_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        self.translations
            .get(document_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(document_id.to_string()))
    }

    async fn list_users(&self) -> PortResult<Vec<UserProfile>> {
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.users.lock().unwrap().clone())
    }
}

pub fn document(id: &str, translation_count: usize) -> Document {
    Document {
        id: id.to_string(),
        filename: format!("{id}.pdf"),
        title: Some(format!("Title of {id}")),
        author: Some("Anonymous".to_string()),
        description: None,
        genre: Some("Horror".to_string()),
        published_year: None,
        cover_image: None,
        rating: None,
        page_count: translation_count as u32,
        pages_processed: translation_count as u32,
        status: "completed".to_string(),
        translation_count,
    }
}

pub fn units(n: usize) -> Vec<TranslationUnit> {
    (0..n)
        .map(|i| TranslationUnit {
            id: i as i64 + 1,
            pages: vec![i as u32 + 1],
            text: format!("Translated text {i}"),
            created_at: None,
            updated_at: None,
        })
        .collect()
}

pub fn user(id: &str, name: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        name: name.to_string(),
        avatar: "@".to_string(),
        reading_progress: HashMap::new(),
    }
}
