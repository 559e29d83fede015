//! services/reader/src/cli/shell.rs
//!
//! Control loop for the terminal client. It owns the session context and
//! hands page state to the reading sessions.
//!
//! Events are handled one at a time: either a line of input, or the
//! completion of the translation load that is currently outstanding.

use std::sync::Arc;

use chrono::Utc;
use library_reader_core::catalog::{categories, filter_entries, CatalogQuery};
use library_reader_core::domain::{Document, Novel};
use library_reader_core::ports::LibraryService;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cli::commands::{Command, HELP};
use crate::cli::render;
use crate::demo;
use crate::error::ReaderError;
use crate::reader::{LoadOutcome, Navigation, ReadingSession};
use crate::session::{AppContext, DocumentSelection, ProfileSwitcher};
use crate::sync::ProgressSync;

/// Which listing `open <n>` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Documents,
    Novels,
}

enum ReaderState {
    Closed,
    Loading {
        title: String,
        cancel: CancellationToken,
        task: JoinHandle<LoadOutcome>,
    },
    Open(ReadingSession),
}

enum Event {
    Line(Option<String>),
    Loaded(Result<LoadOutcome, JoinError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W> {
    library: Arc<dyn LibraryService>,
    sync: ProgressSync,
    ctx: AppContext,
    profiles: ProfileSwitcher,
    preferred_user: Option<String>,
    documents: Vec<Document>,
    novels: Vec<Novel>,
    query: CatalogQuery,
    listing: Listing,
    reader: ReaderState,
    out: W,
}

impl<W: AsyncWrite + Unpin> Shell<W> {
    pub fn new(
        library: Arc<dyn LibraryService>,
        sync: ProgressSync,
        preferred_user: Option<String>,
        out: W,
    ) -> Self {
        Self {
            profiles: ProfileSwitcher::new(library.clone()),
            library,
            sync,
            ctx: AppContext::new(),
            preferred_user,
            documents: Vec::new(),
            novels: demo::novels(),
            query: CatalogQuery::default(),
            listing: Listing::Documents,
            reader: ReaderState::Closed,
            out,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn session(&self) -> Option<&ReadingSession> {
        match &self.reader {
            ReaderState::Open(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.reader, ReaderState::Loading { .. })
    }

    /// Runs until `quit` or end of input, then flushes any open session.
    /// Returns the output sink.
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R) -> Result<W, ReaderError> {
        self.start().await?;
        let mut lines = input.lines();
        loop {
            let event = tokio::select! {
                line = lines.next_line() => Event::Line(line?),
                outcome = wait_for(&mut self.reader) => Event::Loaded(outcome),
            };
            match event {
                Event::Line(Some(line)) => {
                    if self.handle_line(&line).await? == Flow::Quit {
                        break;
                    }
                }
                Event::Line(None) => {
                    info!("Input closed");
                    break;
                }
                Event::Loaded(outcome) => self.finish_load(outcome).await?,
            }
        }
        self.shutdown().await?;
        Ok(self.out)
    }

    /// Loads profiles and the document list, then shows the library.
    pub async fn start(&mut self) -> Result<(), ReaderError> {
        self.profiles
            .load(&mut self.ctx, self.preferred_user.as_deref())
            .await;
        match self.ctx.current_user() {
            Some(user) => {
                let greeting = format!("Reading as {} {}", user.avatar, user.name);
                self.say(&greeting).await?;
            }
            None => self.say("Profiles unavailable: progress will not be saved.").await?,
        }
        self.refresh_documents().await;
        self.show_documents().await
    }

    pub async fn handle_line(&mut self, line: &str) -> Result<Flow, ReaderError> {
        match line.parse::<Command>() {
            Ok(command) => {
                debug!(?command, "Command received");
                self.handle_command(command).await
            }
            Err(e) => {
                self.say(&e.to_string()).await?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn handle_command(&mut self, command: Command) -> Result<Flow, ReaderError> {
        match command {
            Command::Documents => {
                self.refresh_documents().await;
                self.show_documents().await?;
            }
            Command::Novels => self.show_novels().await?,
            Command::Search(text) => {
                self.query.text = text;
                self.show_novels().await?;
            }
            Command::Genre(category) => {
                self.query.category = category;
                self.show_novels().await?;
            }
            Command::Users => {
                let text = render::users(
                    self.profiles
                        .load(&mut self.ctx, self.preferred_user.as_deref())
                        .await,
                    self.ctx.current_user_id(),
                );
                self.say(&text).await?;
            }
            Command::User(id) => match self.profiles.select(&mut self.ctx, &id).await {
                Ok(()) => {
                    let text = match (self.ctx.current_user(), &self.reader) {
                        (Some(user), ReaderState::Open(_)) => format!(
                            "Now reading as {}. Reopen the document to resume from their position.",
                            user.name
                        ),
                        (Some(user), _) => format!("Now reading as {}.", user.name),
                        (None, _) => "No profile selected.".to_string(),
                    };
                    self.say(&text).await?;
                }
                Err(e) => self.say(&e.to_string()).await?,
            },
            Command::Info(n) => self.info(n).await?,
            Command::Open(n) => self.open(n).await?,
            Command::Next => self.navigate(Navigation::Next).await?,
            Command::Previous => self.navigate(Navigation::Previous).await?,
            Command::Chapter(n) => self.navigate(Navigation::JumpToChapter(n - 1)).await?,
            Command::Go(n) => self.navigate(Navigation::JumpToIndex(n - 1)).await?,
            Command::Close => {
                if self.close_reader() {
                    match self.listing {
                        Listing::Documents => self.show_documents().await?,
                        Listing::Novels => self.show_novels().await?,
                    }
                } else {
                    self.say("Nothing is open.").await?;
                }
            }
            Command::Help => self.say(HELP).await?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Waits for the outstanding translation load, if any, and applies it.
    pub async fn wait_for_load(&mut self) -> Result<(), ReaderError> {
        if self.is_loading() {
            let outcome = wait_for(&mut self.reader).await;
            self.finish_load(outcome).await?;
        }
        Ok(())
    }

    //=====================================================================================
    // Catalog
    //=====================================================================================

    async fn refresh_documents(&mut self) {
        match self.library.list_documents().await {
            Ok(documents) => self.documents = documents,
            Err(e) => {
                warn!("Document list unavailable: {}", e);
                self.documents.clear();
            }
        }
    }

    async fn show_documents(&mut self) -> Result<(), ReaderError> {
        self.listing = Listing::Documents;
        let text = render::documents(&self.documents, &self.ctx);
        self.say(&text).await
    }

    fn filtered_novels(&self) -> Vec<&Novel> {
        filter_entries(&self.novels, &self.query)
    }

    async fn show_novels(&mut self) -> Result<(), ReaderError> {
        self.listing = Listing::Novels;
        let text = render::novels(&self.filtered_novels(), &categories(&self.novels));
        self.say(&text).await
    }

    //=====================================================================================
    // Readers
    //=====================================================================================

    async fn info(&mut self, n: usize) -> Result<(), ReaderError> {
        let text = match self.listing {
            Listing::Documents => match self.documents.get(n - 1) {
                Some(document) => render::document_detail(document, &self.ctx, n),
                None => format!("There is no document {n}."),
            },
            Listing::Novels => match self.filtered_novels().get(n - 1) {
                Some(novel) => {
                    render::novel_detail(novel, demo::content_for(&novel.id).is_some(), n)
                }
                None => format!("There is no novel {n}."),
            },
        };
        self.say(&text).await
    }

    async fn open(&mut self, n: usize) -> Result<(), ReaderError> {
        match self.listing {
            Listing::Documents => match self.documents.get(n - 1).cloned() {
                Some(document) => self.begin_load(document).await,
                None => self.say(&format!("There is no document {n}.")).await,
            },
            Listing::Novels => {
                let Some(novel_id) = self.filtered_novels().get(n - 1).map(|novel| novel.id.clone())
                else {
                    return self.say(&format!("There is no novel {n}.")).await;
                };
                let Some(content) = demo::content_for(&novel_id) else {
                    return self.say("Preview only: this novel has no readable content.").await;
                };
                self.close_reader();
                // Demo novels are not tracked remotely.
                let session = ReadingSession::open_novel(&content, self.sync.clone(), None).await?;
                self.ctx.open_document(DocumentSelection::Novel(novel_id));
                let text = format!("{}\n{}", render::chapters(&session), render::page(&session));
                self.reader = ReaderState::Open(session);
                self.say(&text).await
            }
        }
    }

    /// Starts fetching a document in the background, superseding any reader
    /// that is open or loading.
    async fn begin_load(&mut self, document: Document) -> Result<(), ReaderError> {
        self.close_reader();
        let title = document.display_title();
        let document_id = document.id.clone();
        let cancel = CancellationToken::new();
        let task = {
            let library = self.library.clone();
            let sync = self.sync.clone();
            let user_id = self.ctx.current_user_id().map(str::to_string);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                ReadingSession::open_translations(library.as_ref(), sync, &document, user_id, &cancel)
                    .await
            })
        };
        self.ctx
            .open_document(DocumentSelection::Translation(document_id));
        let text = render::loading(&title);
        self.reader = ReaderState::Loading { title, cancel, task };
        self.say(&text).await
    }

    async fn finish_load(&mut self, outcome: Result<LoadOutcome, JoinError>) -> Result<(), ReaderError> {
        let title = match std::mem::replace(&mut self.reader, ReaderState::Closed) {
            ReaderState::Loading { title, .. } => title,
            other => {
                self.reader = other;
                return Ok(());
            }
        };
        match outcome {
            Ok(LoadOutcome::Ready(session)) => {
                self.ctx
                    .open_document(DocumentSelection::Translation(session.document_id().to_string()));
                if let (Some(user_id), Some(index)) = (session.user_id(), session.restored_index()) {
                    self.ctx
                        .record_progress(user_id, session.document_id(), index, Utc::now());
                }
                let text = render::page(&session);
                self.reader = ReaderState::Open(session);
                self.say(&text).await
            }
            Ok(LoadOutcome::Empty) => {
                self.ctx.close_document();
                self.say(&format!("{title} has no translations yet.")).await
            }
            Ok(LoadOutcome::Unavailable(message)) => {
                self.ctx.close_document();
                self.say(&message).await
            }
            Ok(LoadOutcome::Cancelled) => {
                self.ctx.close_document();
                Ok(())
            }
            Err(e) => {
                error!("Translation load task failed: {}", e);
                self.ctx.close_document();
                self.say("Translations unavailable.").await
            }
        }
    }

    async fn navigate(&mut self, navigation: Navigation) -> Result<(), ReaderError> {
        let refusal = match self.reader {
            ReaderState::Open(_) => None,
            ReaderState::Loading { .. } => Some("Still loading..."),
            ReaderState::Closed => Some("Open something first."),
        };
        if let Some(refusal) = refusal {
            return self.say(refusal).await;
        }
        let ReaderState::Open(session) = &mut self.reader else {
            return Ok(());
        };
        match session.navigate(navigation) {
            Ok(moved) => {
                if moved {
                    if let Some(user_id) = session.user_id() {
                        let (user_id, document_id) =
                            (user_id.to_string(), session.document_id().to_string());
                        let index = session.engine().ordinal();
                        self.ctx.record_progress(&user_id, &document_id, index, Utc::now());
                    }
                }
                let text = render::page(session);
                self.say(&text).await
            }
            Err(e) => self.say(&e.to_string()).await,
        }
    }

    /// Closes or cancels whatever reader is active. Returns whether there was one.
    fn close_reader(&mut self) -> bool {
        let closed = match std::mem::replace(&mut self.reader, ReaderState::Closed) {
            ReaderState::Closed => false,
            ReaderState::Loading {
                title,
                cancel,
                task,
            } => {
                abandon_load(&title, cancel, task);
                true
            }
            ReaderState::Open(session) => {
                // The flush completes in the background.
                drop(session.close());
                true
            }
        };
        if closed {
            self.ctx.close_document();
        }
        closed
    }

    /// Final flush on the way out; waits for the last write to finish.
    async fn shutdown(&mut self) -> Result<(), ReaderError> {
        match std::mem::replace(&mut self.reader, ReaderState::Closed) {
            ReaderState::Open(mut session) => {
                session.wait_for_writes().await;
                if let Some(handle) = session.close() {
                    if let Err(e) = handle.await {
                        warn!("Final progress write failed: {}", e);
                    }
                }
            }
            ReaderState::Loading { cancel, task, .. } => {
                cancel.cancel();
                if let Ok(LoadOutcome::Ready(session)) = task.await {
                    session.discard();
                }
            }
            ReaderState::Closed => {}
        }
        self.ctx.close_document();
        self.say("Goodbye.").await
    }

    async fn say(&mut self, text: &str) -> Result<(), ReaderError> {
        self.out.write_all(text.trim_end().as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}

/// Cancels a load and throws away whatever it produces, including a session
/// that finished loading but was never shown.
fn abandon_load(title: &str, cancel: CancellationToken, task: JoinHandle<LoadOutcome>) {
    info!("Cancelling load of {}", title);
    cancel.cancel();
    let Ok(runtime) = Handle::try_current() else {
        return;
    };
    runtime.spawn(async move {
        if let Ok(LoadOutcome::Ready(session)) = task.await {
            session.discard();
        }
    });
}

/// Resolves when the outstanding load finishes; never resolves otherwise.
async fn wait_for(reader: &mut ReaderState) -> Result<LoadOutcome, JoinError> {
    match reader {
        ReaderState::Loading { task, .. } => task.await,
        _ => std::future::pending().await,
    }
}
