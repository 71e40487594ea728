//! Integration tests for GMExpress.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gmexpress-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `admin_delete_user` - Admin API served over a real socket
//! - `admin_maintenance` - Orphan cleanup and category seeding
//! - `storefront_cart` - Cart persistence and notifications
//!
//! Everything runs against [`InMemoryPlatform`]; no Firebase project or
//! emulator is needed.

use std::net::SocketAddr;
use std::sync::Arc;

use gmexpress_admin::platform::InMemoryPlatform;
use gmexpress_admin::routes;
use gmexpress_admin::state::AppState;

/// An admin server listening on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub platform: Arc<InMemoryPlatform>,
}

impl TestServer {
    /// Serve the admin routes over `platform` until the test runtime stops.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind.
    #[allow(clippy::expect_used)]
    pub async fn spawn(platform: InMemoryPlatform) -> Self {
        let platform = Arc::new(platform);
        let app = routes::routes().with_state(AppState::from_platform(platform.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, platform }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}
