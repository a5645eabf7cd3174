//! REST API endpoint handlers.
//!
//! Every handler goes through the shared [`GameSession`](tycoon_core::GameSession);
//! none touches the statistics record directly.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/session` | Full session snapshot |
//! | `GET` | `/api/stats` | Statistics record |
//! | `PUT` | `/api/view` | Switch the active view |
//! | `GET` | `/api/tasks` | Current batch, answers withheld |
//! | `POST` | `/api/tasks/refresh` | Fetch a new batch |
//! | `POST` | `/api/tasks/{id}/select` | Open a task |
//! | `POST` | `/api/tasks/active/close` | Close the open task |
//! | `PUT` | `/api/tasks/active/answer` | Update the answer text |
//! | `POST` | `/api/tasks/active/answer` | Submit an answer |
//! | `GET` | `/api/shop` | Shop catalog |
//! | `POST` | `/api/shop/{item_id}/purchase` | Buy an item |
//! | `GET` | `/api/withdrawals/methods` | Payment methods and minimum |
//! | `PUT` | `/api/withdrawals/form` | Edit the withdrawal form |
//! | `POST` | `/api/withdrawals` | Request a withdrawal |
//! | `GET` | `/api/referral` | Referral code and earnings |
//! | `POST` | `/api/referral/confirm` | Record a confirmed referral |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tycoon_core::{
    FetchOutcome, SessionSnapshot, SubmitOutcome, TaskView, WithdrawForm, WithdrawFormUpdate,
};
use tycoon_economy::{MIN_WITHDRAWAL, REFERRAL_BONUS, catalog, referral_earnings};
use tycoon_provider::TaskContentProvider;
use tycoon_types::{
    InventoryItem, PaymentMethod, ReferralCode, TaskId, UserStatistics, ViewMode,
    WithdrawalReceipt,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Body of `PUT /api/view`.
#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    /// The view to show.
    pub view: ViewMode,
}

/// Body of the answer endpoints.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Answer text.
    pub answer: String,
}

/// One entry of `GET /api/withdrawals/methods`.
#[derive(Debug, Serialize)]
pub struct MethodInfo {
    /// Wire name of the method.
    pub id: PaymentMethod,
    /// Display label.
    pub label: &'static str,
}

/// Response of `GET /api/withdrawals/methods`.
#[derive(Debug, Serialize)]
pub struct WithdrawalOptions {
    /// Supported payout methods.
    pub methods: Vec<MethodInfo>,
    /// Smallest amount accepted.
    pub minimum: Decimal,
}

/// Response of the referral endpoints.
#[derive(Debug, Serialize)]
pub struct ReferralInfo {
    /// The player's referral code.
    pub code: ReferralCode,
    /// Confirmed referrals.
    pub referrals_count: u32,
    /// Display bonus per referral.
    pub bonus_per_referral: Decimal,
    /// `referrals_count * bonus_per_referral`.
    pub earnings: Decimal,
}

impl ReferralInfo {
    fn from_stats(stats: UserStatistics) -> Result<Self, ApiError> {
        let earnings = referral_earnings(&stats).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Self {
            code: stats.referral_code,
            referrals_count: stats.referrals_count,
            bonus_per_referral: REFERRAL_BONUS,
            earnings,
        })
    }
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the session and API links.
pub async fn index<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> impl IntoResponse {
    let snapshot = state.session.snapshot().await;
    let stats = &snapshot.stats;
    let balance = stats.balance.normalize();
    let energy = stats.energy.normalize();
    let max_energy = stats.max_energy.normalize();
    let level = stats.level;
    let progress = snapshot.level_progress;
    let remaining = snapshot.daily_tasks_remaining;
    let task_count = snapshot.tasks.len();
    let uptime = state.started_at.elapsed().as_secs();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Tycoon</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #f2cc60; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #f2cc60; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Tycoon</h1>
    <p class="subtitle">Session API -- up {uptime}s</p>

    <div>
        <div class="metric">
            <div class="label">Balance</div>
            <div class="value">{balance}</div>
        </div>
        <div class="metric">
            <div class="label">Energy</div>
            <div class="value">{energy} / {max_energy}</div>
        </div>
        <div class="metric">
            <div class="label">Level</div>
            <div class="value">{level} ({progress}%)</div>
        </div>
        <div class="metric">
            <div class="label">Tasks left today</div>
            <div class="value">{remaining}</div>
        </div>
        <div class="metric">
            <div class="label">Tasks in batch</div>
            <div class="value">{task_count}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/api/session">/api/session</a> -- Full session snapshot</li>
        <li><a href="/api/stats">/api/stats</a> -- Statistics</li>
        <li><a href="/api/tasks">/api/tasks</a> -- Current task batch</li>
        <li><a href="/api/shop">/api/shop</a> -- Shop catalog</li>
        <li><a href="/api/withdrawals/methods">/api/withdrawals/methods</a> -- Payment methods</li>
        <li><a href="/api/referral">/api/referral</a> -- Referral code</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/updates</code> -- Live session updates</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Session and view
// ---------------------------------------------------------------------------

/// Return the full session snapshot.
pub async fn get_session<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

/// Return the statistics record.
pub async fn get_stats<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Json<UserStatistics> {
    Json(state.session.stats().await)
}

/// Switch the active view.
pub async fn set_view<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Json(body): Json<ViewRequest>,
) -> Json<SessionSnapshot> {
    state.session.set_view(body.view).await;
    Json(state.session.snapshot().await)
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// List the current batch with expected answers withheld.
pub async fn list_tasks<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Json<Vec<TaskView>> {
    Json(state.session.tasks().await)
}

/// Replace the batch with a freshly generated one.
pub async fn refresh_tasks<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<Json<FetchOutcome>, ApiError> {
    Ok(Json(state.session.fetch_tasks().await?))
}

/// Open a task for answering.
pub async fn select_task<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id_str): Path<String>,
) -> Result<Json<TaskView>, ApiError> {
    let id = TaskId::from(parse_uuid(&id_str)?);
    Ok(Json(state.session.select_task(id).await?))
}

/// Close the open task.
pub async fn close_task<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.session.close_task().await?;
    Ok(Json(state.session.snapshot().await))
}

/// Update the answer text without submitting.
pub async fn set_answer_input<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Json(body): Json<AnswerRequest>,
) -> Json<SessionSnapshot> {
    state.session.set_answer_input(&body.answer).await;
    Json(state.session.snapshot().await)
}

/// Submit an answer for the open task.
pub async fn submit_answer<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Json(body): Json<AnswerRequest>,
) -> Result<Json<SubmitOutcome>, ApiError> {
    Ok(Json(state.session.submit_answer(&body.answer).await?))
}

// ---------------------------------------------------------------------------
// Shop
// ---------------------------------------------------------------------------

/// Return the shop catalog.
pub async fn list_shop() -> Json<&'static [InventoryItem]> {
    Json(catalog())
}

/// Buy a shop item.
pub async fn purchase<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(item_id): Path<String>,
) -> Result<Json<UserStatistics>, ApiError> {
    Ok(Json(state.session.purchase(&item_id).await?))
}

// ---------------------------------------------------------------------------
// Withdrawals
// ---------------------------------------------------------------------------

/// Return the payout methods and the minimum amount.
pub async fn withdrawal_methods() -> Json<WithdrawalOptions> {
    let methods = PaymentMethod::ALL
        .into_iter()
        .map(|id| MethodInfo {
            id,
            label: id.label(),
        })
        .collect();
    Json(WithdrawalOptions {
        methods,
        minimum: MIN_WITHDRAWAL,
    })
}

/// Edit the withdrawal form.
pub async fn set_withdraw_form<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Json(body): Json<WithdrawFormUpdate>,
) -> Json<WithdrawForm> {
    Json(state.session.set_withdraw_form(body).await)
}

/// Merge the body into the withdrawal form and submit it.
pub async fn withdraw<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Json(body): Json<WithdrawFormUpdate>,
) -> Result<Json<WithdrawalReceipt>, ApiError> {
    Ok(Json(state.session.withdraw(body).await?))
}

// ---------------------------------------------------------------------------
// Referral
// ---------------------------------------------------------------------------

/// Return the referral code, count and display earnings.
pub async fn get_referral<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<Json<ReferralInfo>, ApiError> {
    Ok(Json(ReferralInfo::from_stats(state.session.stats().await)?))
}

/// Record a confirmed referral.
pub async fn confirm_referral<P: TaskContentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<Json<ReferralInfo>, ApiError> {
    let stats = state.session.confirm_referral().await?;
    Ok(Json(ReferralInfo::from_stats(stats)?))
}

fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}
