//! services/reader/src/session/profiles.rs
//!
//! Loads reader profiles and switches the active one.

use std::sync::Arc;

use library_reader_core::domain::UserProfile;
use library_reader_core::ports::LibraryService;
use tracing::{info, warn};

use crate::error::ReaderError;
use crate::session::context::AppContext;

pub struct ProfileSwitcher {
    library: Arc<dyn LibraryService>,
    profiles: Vec<UserProfile>,
    loaded: bool,
}

impl ProfileSwitcher {
    pub fn new(library: Arc<dyn LibraryService>) -> Self {
        Self {
            library,
            profiles: Vec::new(),
            loaded: false,
        }
    }

    pub fn profiles(&self) -> &[UserProfile] {
        &self.profiles
    }

    /// Fetches the profile list once. When nobody is selected yet, selects
    /// `preferred` if it is listed, else the first profile.
    ///
    /// A failed fetch leaves the list empty and may be retried by calling again.
    pub async fn load(&mut self, ctx: &mut AppContext, preferred: Option<&str>) -> &[UserProfile] {
        if !self.loaded {
            match self.library.list_users().await {
                Ok(profiles) => {
                    info!("Loaded {} reader profiles", profiles.len());
                    self.profiles = profiles;
                    self.loaded = true;
                }
                Err(e) => warn!("Profiles unavailable: {}", e),
            }
        }

        if ctx.current_user().is_none() {
            let preferred_profile = preferred.and_then(|id| {
                let found = self.profiles.iter().find(|p| p.id == id);
                if found.is_none() {
                    warn!(user_id = id, "Preferred profile not found, using the first one");
                }
                found
            });
            if let Some(profile) = preferred_profile.or_else(|| self.profiles.first()) {
                ctx.select_user(profile.clone());
            }
        }
        &self.profiles
    }

    /// Makes `user_id` the active profile.
    ///
    /// The list is re-fetched first so the new user's cached progress is
    /// current; if that fails the previously loaded copy is used. An open
    /// reading session keeps its position either way.
    pub async fn select(&mut self, ctx: &mut AppContext, user_id: &str) -> Result<(), ReaderError> {
        match self.library.list_users().await {
            Ok(profiles) => {
                self.profiles = profiles;
                self.loaded = true;
            }
            Err(e) => warn!("Could not refresh profiles, using cached list: {}", e),
        }
        let profile = self
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or_else(|| ReaderError::UnknownProfile(user_id.to_string()))?;
        ctx.select_user(profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{user, FakeLibrary};
    use chrono::Utc;

    fn library_with(users: Vec<UserProfile>) -> Arc<FakeLibrary> {
        let library = FakeLibrary::default();
        *library.users.lock().unwrap() = users;
        Arc::new(library)
    }

    #[tokio::test]
    async fn load_auto_selects_first_profile() {
        let library = library_with(vec![user("u1", "Ana"), user("u2", "Luis")]);
        let mut switcher = ProfileSwitcher::new(library.clone());
        let mut ctx = AppContext::new();

        let listed = switcher.load(&mut ctx, None).await.len();
        assert_eq!(listed, 2);
        assert_eq!(ctx.current_user_id(), Some("u1"));

        // Already loaded: no second fetch.
        switcher.load(&mut ctx, None).await;
        assert_eq!(library.user_fetches(), 1);
    }

    #[tokio::test]
    async fn load_keeps_existing_selection() {
        let library = library_with(vec![user("u1", "Ana"), user("u2", "Luis")]);
        let mut switcher = ProfileSwitcher::new(library);
        let mut ctx = AppContext::new();
        ctx.select_user(user("u2", "Luis"));

        switcher.load(&mut ctx, None).await;
        assert_eq!(ctx.current_user_id(), Some("u2"));
    }

    #[tokio::test]
    async fn load_honours_preferred_profile() {
        let library = library_with(vec![user("u1", "Ana"), user("u2", "Luis")]);
        let mut switcher = ProfileSwitcher::new(library.clone());
        let mut ctx = AppContext::new();
        switcher.load(&mut ctx, Some("u2")).await;
        assert_eq!(ctx.current_user_id(), Some("u2"));

        let mut switcher = ProfileSwitcher::new(library);
        let mut ctx = AppContext::new();
        switcher.load(&mut ctx, Some("nobody")).await;
        assert_eq!(ctx.current_user_id(), Some("u1"));
    }

    #[tokio::test]
    async fn failed_load_leaves_no_user_and_can_retry() {
        let library = library_with(vec![user("u1", "Ana")]);
        library.set_offline(true);
        let mut switcher = ProfileSwitcher::new(library.clone());
        let mut ctx = AppContext::new();

        assert!(switcher.load(&mut ctx, None).await.is_empty());
        assert!(ctx.current_user().is_none());

        library.set_offline(false);
        switcher.load(&mut ctx, None).await;
        assert_eq!(ctx.current_user_id(), Some("u1"));
    }

    #[tokio::test]
    async fn select_refreshes_progress_and_rejects_unknown_ids() {
        let library = library_with(vec![user("u1", "Ana"), user("u2", "Luis")]);
        let mut switcher = ProfileSwitcher::new(library.clone());
        let mut ctx = AppContext::new();
        switcher.load(&mut ctx, None).await;

        library.users.lock().unwrap()[1].record_progress("doc-1", 4, Utc::now());
        switcher.select(&mut ctx, "u2").await.unwrap();
        assert_eq!(ctx.current_user_id(), Some("u2"));
        assert_eq!(ctx.progress_for("doc-1").map(|p| p.current_page), Some(4));

        let err = switcher.select(&mut ctx, "u9").await.unwrap_err();
        assert!(matches!(err, ReaderError::UnknownProfile(id) if id == "u9"));
        assert_eq!(ctx.current_user_id(), Some("u2"));
    }

    #[tokio::test]
    async fn select_falls_back_to_cached_list_when_offline() {
        let library = library_with(vec![user("u1", "Ana"), user("u2", "Luis")]);
        let mut switcher = ProfileSwitcher::new(library.clone());
        let mut ctx = AppContext::new();
        switcher.load(&mut ctx, None).await;

        library.set_offline(true);
        switcher.select(&mut ctx, "u2").await.unwrap();
        assert_eq!(ctx.current_user_id(), Some("u2"));
    }
}
