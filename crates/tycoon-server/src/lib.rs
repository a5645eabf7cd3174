//! HTTP and `WebSocket` API for the Tycoon earning game.
//!
//! This crate exposes one [`GameSession`](tycoon_core::GameSession) to the
//! presentation layer:
//!
//! - **REST endpoints** mirroring the session operations (fetch and answer
//!   tasks, shop, withdrawals, referrals, view switching)
//! - **`WebSocket` endpoint** (`/ws/updates`) streaming a full snapshot on
//!   every state change via [`tokio::sync::broadcast`]
//! - **Minimal HTML status page** (`GET /`)
//!
//! Rejected operations answer with a JSON error body whose `message`
//! field is the same text the session shows as a notification.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
