use std::sync::Arc;

use rf_config::{PaginationSettings, ServerSettings};
use rf_core::traits::{CredentialHasher, ForumRepo, PostRepo, TopicRepo, UserRepo};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub forums: Arc<dyn ForumRepo>,
    pub topics: Arc<dyn TopicRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub users: Arc<dyn UserRepo>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub server: ServerSettings,
    pub pagination: PaginationSettings,
}

impl AppState {
    /// Wires one storage plugin that serves all four repositories.
    pub fn new<S, H>(
        store: S,
        hasher: H,
        server: ServerSettings,
        pagination: PaginationSettings,
    ) -> Self
    where
        S: ForumRepo + TopicRepo + PostRepo + UserRepo + 'static,
        H: CredentialHasher + 'static,
    {
        let store = Arc::new(store);
        Self {
            forums: store.clone(),
            topics: store.clone(),
            posts: store.clone(),
            users: store,
            hasher: Arc::new(hasher),
            server,
            pagination,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("repos", &"dyn ForumRepo + TopicRepo + PostRepo + UserRepo")
            .field("hasher", &"dyn CredentialHasher")
            .field("server", &self.server)
            .field("pagination", &self.pagination)
            .finish()
    }
}
