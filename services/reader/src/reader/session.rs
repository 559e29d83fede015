//! services/reader/src/reader/session.rs
//!
//! A reading session: one open document, its pagination state, and the
//! progress writes that mirror it.
//!
//! The session owns a final flush. `close()` performs it explicitly; if the
//! session is dropped on any other path (an error, shell shutdown) the `Drop`
//! impl performs it instead.

use chrono::Utc;
use library_reader_core::domain::{Document, NovelWithContent};
use library_reader_core::pagination::{PagedContent, PaginationEngine, PaginationError};
use library_reader_core::ports::LibraryService;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::sync::ProgressSync;

/// A navigation request from the reader UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    JumpToChapter(usize),
    JumpToIndex(usize),
}

/// The result of opening a translated document.
pub enum LoadOutcome {
    Ready(ReadingSession),
    /// The document has no translations yet.
    Empty,
    /// The translations could not be fetched; carries a message for the user.
    Unavailable(String),
    /// The reader was closed before the fetch finished; the response was discarded.
    Cancelled,
}

pub struct ReadingSession {
    id: Uuid,
    document_id: String,
    title: String,
    user_id: Option<String>,
    restored: Option<usize>,
    engine: PaginationEngine,
    sync: ProgressSync,
    in_flight: Vec<JoinHandle<()>>,
    closed: bool,
}

impl ReadingSession {
    /// Fetches a document's translations and the user's stored position
    /// concurrently, then opens a session at the restored position.
    ///
    /// If `cancel` fires first, whatever arrives later is ignored.
    pub async fn open_translations(
        library: &dyn LibraryService,
        sync: ProgressSync,
        document: &Document,
        user_id: Option<String>,
        cancel: &CancellationToken,
    ) -> LoadOutcome {
        let id = Uuid::new_v4();
        let span = info_span!("reading_session", %id, document_id = %document.id);
        async move {
            let restore = async {
                match user_id.as_deref() {
                    Some(user) => sync.restore(user, &document.id).await,
                    None => None,
                }
            };
            let fetch = async { futures::join!(library.get_translations(&document.id), restore) };

            let (translations, restored) = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Reader closed while loading, discarding response");
                    return LoadOutcome::Cancelled;
                }
                result = fetch => result,
            };
            if cancel.is_cancelled() {
                info!("Reader closed while loading, discarding response");
                return LoadOutcome::Cancelled;
            }

            let units = match translations {
                Ok(units) => units,
                Err(e) => {
                    warn!("Translations unavailable: {}", e);
                    return LoadOutcome::Unavailable(format!("Translations unavailable: {}", e));
                }
            };
            let count = units.len();
            let content = match PagedContent::flat(units) {
                Ok(content) => content,
                Err(_) => {
                    info!("Document has no translations");
                    return LoadOutcome::Empty;
                }
            };
            if let Some(index) = restored.filter(|&index| index >= count) {
                warn!(index, count, "Stored position is past the end, starting over");
            }
            let restored = restored.filter(|&index| index < count);

            let engine = PaginationEngine::initialize(content, restored);
            info!(position = engine.ordinal(), count, "Reading session opened");
            LoadOutcome::Ready(Self {
                id,
                document_id: document.id.clone(),
                title: document.display_title(),
                user_id,
                restored,
                engine,
                sync,
                in_flight: Vec::new(),
                closed: false,
            })
        }
        .instrument(span)
        .await
    }

    /// Opens a chapter-structured novel, restoring the stored page ordinal
    /// when a user is attached.
    pub async fn open_novel(
        novel: &NovelWithContent,
        sync: ProgressSync,
        user_id: Option<String>,
    ) -> Result<Self, PaginationError> {
        let content = PagedContent::chapters(novel.chapters.clone())?;
        let restored = match user_id.as_deref() {
            Some(user) => sync.restore(user, &novel.novel.id).await,
            None => None,
        };
        let restored = restored.filter(|&index| index < content.len());
        let engine = PaginationEngine::initialize(content, restored);
        let id = Uuid::new_v4();
        info!(%id, novel_id = %novel.novel.id, "Novel opened");
        Ok(Self {
            id,
            document_id: novel.novel.id.clone(),
            title: novel.novel.title.clone(),
            user_id,
            restored,
            engine,
            sync,
            in_flight: Vec::new(),
            closed: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The stored position the session resumed from, if one was valid.
    pub fn restored_index(&self) -> Option<usize> {
        self.restored
    }

    pub fn engine(&self) -> &PaginationEngine {
        &self.engine
    }

    /// Applies one navigation step. Every movement issues a progress write;
    /// a failing write never undoes the movement.
    pub fn navigate(&mut self, navigation: Navigation) -> Result<bool, PaginationError> {
        let moved = match navigation {
            Navigation::Next => self.engine.next(),
            Navigation::Previous => self.engine.previous(),
            Navigation::JumpToChapter(index) => {
                self.engine.jump_to_chapter(index)?;
                true
            }
            Navigation::JumpToIndex(index) => {
                self.engine.jump_to_index(index)?;
                true
            }
        };
        if moved {
            self.in_flight.retain(|handle| !handle.is_finished());
            if let Some(handle) = self.persist_current() {
                self.in_flight.push(handle);
            }
        }
        Ok(moved)
    }

    /// Waits for every progress write issued so far.
    pub async fn wait_for_writes(&mut self) {
        for handle in self.in_flight.drain(..) {
            if let Err(e) = handle.await {
                warn!(session = %self.id, "Progress write task failed: {}", e);
            }
        }
    }

    /// Ends the session with a final progress write.
    pub fn close(mut self) -> Option<JoinHandle<()>> {
        self.closed = true;
        info!(session = %self.id, position = self.engine.ordinal(), "Reading session closed");
        self.persist_current()
    }

    /// Ends a session that was never shown, without writing progress.
    pub fn discard(mut self) {
        self.closed = true;
        info!(session = %self.id, "Reading session discarded");
    }

    fn persist_current(&self) -> Option<JoinHandle<()>> {
        let user_id = self.user_id.as_deref()?;
        self.sync
            .persist(user_id, &self.document_id, self.engine.ordinal(), Utc::now())
    }
}

impl Drop for ReadingSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!(session = %self.id, "Reading session dropped without close, flushing progress");
            self.persist_current();
        }
    }
}
