//! Application state shared across handlers.

use std::sync::Arc;

use crate::platform::{DocumentStore, IdentityProvider};

/// Application state shared across all handlers.
///
/// Cheap to clone; holds the platform ports behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    identity: Arc<dyn IdentityProvider>,
    documents: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Create state from the two platform ports.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                identity,
                documents,
            }),
        }
    }

    /// Create state where one value implements both ports.
    #[must_use]
    pub fn from_platform<P>(platform: Arc<P>) -> Self
    where
        P: IdentityProvider + DocumentStore + 'static,
    {
        Self::new(platform.clone(), platform)
    }

    /// Identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Document database.
    #[must_use]
    pub fn documents(&self) -> &dyn DocumentStore {
        self.inner.documents.as_ref()
    }
}
