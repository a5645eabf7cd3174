//! Axum router construction for the session API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled, since the single-page frontend is served from a
//! different origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tycoon_provider::TaskContentProvider;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete router. See [`handlers`] for the endpoint table.
pub fn build_router<P: TaskContentProvider + 'static>(state: Arc<AppState<P>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index::<P>))
        .route("/ws/updates", get(ws::ws_updates::<P>))
        // Session and view
        .route("/api/session", get(handlers::get_session::<P>))
        .route("/api/stats", get(handlers::get_stats::<P>))
        .route("/api/view", put(handlers::set_view::<P>))
        // Tasks
        .route("/api/tasks", get(handlers::list_tasks::<P>))
        .route("/api/tasks/refresh", post(handlers::refresh_tasks::<P>))
        .route("/api/tasks/active/close", post(handlers::close_task::<P>))
        .route(
            "/api/tasks/active/answer",
            put(handlers::set_answer_input::<P>).post(handlers::submit_answer::<P>),
        )
        .route("/api/tasks/{id}/select", post(handlers::select_task::<P>))
        // Shop
        .route("/api/shop", get(handlers::list_shop))
        .route("/api/shop/{item_id}/purchase", post(handlers::purchase::<P>))
        // Withdrawals
        .route("/api/withdrawals", post(handlers::withdraw::<P>))
        .route("/api/withdrawals/methods", get(handlers::withdrawal_methods))
        .route("/api/withdrawals/form", put(handlers::set_withdraw_form::<P>))
        // Referral
        .route("/api/referral", get(handlers::get_referral::<P>))
        .route("/api/referral/confirm", post(handlers::confirm_referral::<P>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
