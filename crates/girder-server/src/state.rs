//! Shared application state.

use girder::domain::UserId;
use girder::storage::TrackerStorage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// State shared by all request handlers.
///
/// Read-only handlers take the storage read lock; mutations take the
/// write lock. Multi-step mutations are atomic inside the storage itself.
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RwLock<Box<dyn TrackerStorage>>>,

    /// Bearer token to authenticated user mapping.
    pub auth: HashMap<String, UserId>,
}

/// Shared handle to [`AppState`].
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Build shared state from a storage backend and a token table.
    pub fn shared(
        store: Box<dyn TrackerStorage>,
        auth: HashMap<String, UserId>,
    ) -> SharedState {
        Arc::new(Self {
            store: Arc::new(RwLock::new(store)),
            auth,
        })
    }
}
