//! Shared application state for the API server.
//!
//! [`AppState`] wraps the single [`GameSession`] the server exposes.
//! Handlers receive it as `State<Arc<AppState<P>>>`; WebSocket clients
//! subscribe to the session's update channel through it.

use std::time::Instant;

use tokio::sync::broadcast;
use tycoon_core::{GameSession, SessionUpdate};
use tycoon_provider::TaskContentProvider;

/// State shared by all handlers.
pub struct AppState<P> {
    /// The player's session.
    pub session: GameSession<P>,
    /// When the server state was created, for the status page.
    pub started_at: Instant,
}

impl<P: TaskContentProvider> AppState<P> {
    /// Wrap a session.
    pub fn new(session: GameSession<P>) -> Self {
        Self {
            session,
            started_at: Instant::now(),
        }
    }

    /// Subscribe to session updates.
    ///
    /// Lagging receivers skip ahead; every update carries a full snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.session.subscribe()
    }
}
