//! services/reader/src/sync/progress.rs
//!
//! Bridges reading positions to the remote progress store.
//!
//! Both directions degrade gracefully: a failed restore means "start from the
//! beginning", and a failed persist is logged and forgotten. Neither ever
//! blocks navigation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use library_reader_core::domain::ProgressUpdate;
use library_reader_core::ports::{PortError, ProgressStore};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ProgressSync {
    store: Arc<dyn ProgressStore>,
}

impl ProgressSync {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Best-effort read of the stored position. Any failure yields `None`.
    pub async fn restore(&self, user_id: &str, document_id: &str) -> Option<usize> {
        match self.store.fetch_progress(user_id, document_id).await {
            Ok(Some(raw)) => match usize::try_from(raw) {
                Ok(index) => Some(index),
                Err(_) => {
                    warn!(user_id, document_id, raw, "Ignoring negative stored position");
                    None
                }
            },
            Ok(None) => None,
            Err(PortError::NotFound(what)) => {
                debug!(user_id, document_id, "No stored progress ({})", what);
                None
            }
            Err(e) => {
                warn!(user_id, document_id, "Could not restore progress: {}", e);
                None
            }
        }
    }

    /// Fire-and-forget write of `index` for (user, document).
    ///
    /// The write runs on the current tokio runtime; the returned handle may be
    /// dropped or awaited. Outside a runtime the write is skipped.
    pub fn persist(
        &self,
        user_id: &str,
        document_id: &str,
        index: usize,
        timestamp: DateTime<Utc>,
    ) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(user_id, document_id, index, "No runtime available, progress not saved");
            return None;
        };
        let store = self.store.clone();
        let update = ProgressUpdate {
            user_id: user_id.to_string(),
            document_id: document_id.to_string(),
            current_page: index,
            timestamp,
        };
        Some(runtime.spawn(async move {
            match store.save_progress(&update).await {
                Ok(()) => debug!(
                    user_id = %update.user_id,
                    document_id = %update.document_id,
                    index = update.current_page,
                    "Progress saved"
                ),
                Err(e) => warn!(
                    user_id = %update.user_id,
                    document_id = %update.document_id,
                    index = update.current_page,
                    "Failed to save progress: {}",
                    e
                ),
            }
        }))
    }
}
