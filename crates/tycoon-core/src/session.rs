//! Session state: the statistics record plus everything the presentation
//! layer needs to render a screen.
//!
//! [`SessionState`] is owned by [`crate::GameSession`] behind a lock.
//! [`SessionSnapshot`] is the read-only projection sent to clients; it
//! withholds expected answers and drops expired notifications.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::warn;
use tycoon_economy::{
    DAILY_TASK_LIMIT, daily_limit_reached, level_progress_percent, referral_earnings,
};
use tycoon_types::{
    NotificationKind, PaymentMethod, Task, TaskId, TaskKind, UserStatistics, ViewMode,
};

// ---------------------------------------------------------------------------
// Mutable state
// ---------------------------------------------------------------------------

/// Withdrawal form contents as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawForm {
    /// Amount text, unparsed.
    pub amount: String,
    /// Destination account text.
    pub account: String,
    /// Selected payment method.
    pub method: PaymentMethod,
}

/// Partial update of the withdrawal form; `None` fields are left as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WithdrawFormUpdate {
    /// New amount text.
    #[serde(default)]
    pub amount: Option<String>,
    /// New account text.
    #[serde(default)]
    pub account: Option<String>,
    /// New payment method.
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

impl WithdrawForm {
    /// Apply a partial update.
    pub fn apply(&mut self, update: WithdrawFormUpdate) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(account) = update.account {
            self.account = account;
        }
        if let Some(method) = update.method {
            self.method = method;
        }
    }
}

/// A transient user-facing message.
///
/// Only one is shown at a time; a newer notification replaces the older
/// one. It disappears once its time-to-live elapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Message text.
    pub message: String,
    /// Wall-clock time the notification was raised.
    pub issued_at: DateTime<Utc>,
    /// Display lifetime in milliseconds.
    pub ttl_ms: u64,
    #[serde(skip)]
    expires_at: Instant,
}

impl Notification {
    /// Create a notification that expires `ttl` from now.
    pub fn new(kind: NotificationKind, message: impl Into<String>, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            kind,
            message: message.into(),
            issued_at: Utc::now(),
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            expires_at: now.checked_add(ttl).unwrap_or(now),
        }
    }

    /// Whether the notification is still visible at `now`.
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Everything the session tracks.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The statistics record. Replaced only with economy engine output.
    pub stats: UserStatistics,
    /// The current task batch.
    pub tasks: Vec<Task>,
    /// The screen being shown.
    pub view: ViewMode,
    /// The task open for answering, if any.
    pub active_task: Option<TaskId>,
    /// Answer text for the active task.
    pub answer_input: String,
    /// Withdrawal form contents.
    pub withdraw_form: WithdrawForm,
    /// The current notification (may be expired).
    pub notification: Option<Notification>,
    /// A task batch is being fetched.
    pub loading: bool,
    /// An answer is being verified.
    pub verifying: bool,
    /// Incremented on every fetch; responses from older fetches are
    /// discarded.
    pub batch_generation: u64,
}

impl SessionState {
    /// A fresh session around the given statistics record.
    pub fn new(stats: UserStatistics) -> Self {
        Self {
            stats,
            tasks: Vec::new(),
            view: ViewMode::default(),
            active_task: None,
            answer_input: String::new(),
            withdraw_form: WithdrawForm::default(),
            notification: None,
            loading: false,
            verifying: false,
            batch_generation: 0,
        }
    }

    /// Look up a task in the current batch.
    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The active task, if it is still in the batch.
    pub fn active(&self) -> Option<&Task> {
        self.active_task.and_then(|id| self.find_task(id))
    }

    /// Close the answer dialog.
    pub fn clear_active(&mut self) {
        self.active_task = None;
        self.answer_input.clear();
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.active().is_some() && !self.answer_input.trim().is_empty() && !self.verifying
    }
}

// ---------------------------------------------------------------------------
// Read-only projections
// ---------------------------------------------------------------------------

/// A task as shown to the player: the expected answer is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    /// Task identifier.
    pub id: TaskId,
    /// Display title.
    pub title: String,
    /// Challenge text.
    pub description: String,
    /// Currency granted on a correct answer.
    pub reward: Decimal,
    /// Energy consumed on a correct answer.
    pub energy_cost: Decimal,
    /// Difficulty label.
    pub difficulty: String,
    /// Category.
    pub kind: TaskKind,
    /// Whether the answer is checked (false = any answer is accepted).
    pub has_answer: bool,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            reward: task.reward,
            energy_cost: task.energy_cost,
            difficulty: task.difficulty.clone(),
            kind: task.kind,
            has_answer: task.expected_answer().is_some(),
        }
    }
}

/// Serializable view of the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// The statistics record.
    pub stats: UserStatistics,
    /// Progress toward the next level, in percent.
    pub level_progress: u32,
    /// Whether today's task limit is used up.
    pub daily_limit_reached: bool,
    /// Tasks left today.
    pub daily_tasks_remaining: u32,
    /// The daily task limit.
    pub daily_task_limit: u32,
    /// Display-only referral earnings; absent if the product overflows.
    pub referral_earnings: Option<Decimal>,
    /// The current task batch.
    pub tasks: Vec<TaskView>,
    /// The screen being shown.
    pub view: ViewMode,
    /// The task open for answering.
    pub active_task: Option<TaskView>,
    /// Answer text for the active task.
    pub answer_input: String,
    /// Whether the submit control is enabled.
    pub can_submit: bool,
    /// Withdrawal form contents.
    pub withdraw_form: WithdrawForm,
    /// The live notification, if any.
    pub notification: Option<Notification>,
    /// A task batch is being fetched.
    pub loading: bool,
    /// An answer is being verified.
    pub verifying: bool,
}

impl SessionSnapshot {
    /// Project the state as of `now`.
    pub fn capture(state: &SessionState, now: Instant) -> Self {
        let stats = &state.stats;
        Self {
            stats: stats.clone(),
            level_progress: level_progress_percent(stats),
            daily_limit_reached: daily_limit_reached(stats),
            daily_tasks_remaining: DAILY_TASK_LIMIT.saturating_sub(stats.daily_tasks_done),
            daily_task_limit: DAILY_TASK_LIMIT,
            referral_earnings: referral_earnings(stats)
                .inspect_err(|e| warn!(error = %e, "referral earnings unavailable"))
                .ok(),
            tasks: state.tasks.iter().map(TaskView::from).collect(),
            view: state.view,
            active_task: state.active().map(TaskView::from),
            answer_input: state.answer_input.clone(),
            can_submit: state.can_submit(),
            withdraw_form: state.withdraw_form.clone(),
            notification: state.notification.clone().filter(|n| n.is_live(now)),
            loading: state.loading,
            verifying: state.verifying,
        }
    }
}
