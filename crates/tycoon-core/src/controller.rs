//! The game session controller.
//!
//! [`GameSession`] owns the [`SessionState`] behind an async lock and is the
//! only writer of the statistics record. Every operation follows the same
//! shape: validate against the current state, call the economy engine,
//! swap in the new record, raise a notification, and publish a
//! [`SessionUpdate`] on the broadcast channel.
//!
//! Provider calls never hold the lock. Task batches carry a generation
//! number so a slow fetch cannot overwrite a newer one, and a verdict for
//! a task that has since left the batch is discarded.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::time::Instant;
use tracing::{debug, info};
use tycoon_economy::{
    DAILY_TASK_LIMIT, Withdrawal, apply_purchase, apply_referral_confirmed, apply_task_failure,
    apply_task_success, apply_withdrawal, can_attempt_task, daily_limit_reached, find_item,
    initial_statistics, xp_for_reward,
};
use tycoon_provider::{
    BatchSource, DEFAULT_TASK_BATCH_SIZE, TaskContentProvider, VerdictSource, fetch_batch,
    verify_answer,
};
use tycoon_types::{
    NotificationKind, ReferralCode, TaskId, UserStatistics, ViewMode, WithdrawalReceipt,
};

use crate::error::SessionError;
use crate::session::{
    Notification, SessionSnapshot, SessionState, TaskView, WithdrawForm, WithdrawFormUpdate,
};

/// Capacity of the session update channel.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and resumes from the newest
/// update. Each update is a full snapshot, so skipping is harmless.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Default notification lifetime.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Tasks requested per batch.
    pub task_batch_size: u32,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            task_batch_size: DEFAULT_TASK_BATCH_SIZE,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

/// Why a [`SessionUpdate`] was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateReason {
    /// A task batch request started.
    FetchStarted,
    /// The task batch was replaced.
    TasksReplaced,
    /// A task was opened for answering.
    TaskSelected,
    /// The answer dialog was closed.
    TaskClosed,
    /// The answer text changed.
    AnswerInputChanged,
    /// An answer is being verified.
    AnswerChecking,
    /// An answer was judged correct.
    AnswerAccepted,
    /// An answer was judged wrong.
    AnswerRejected,
    /// A shop item was bought.
    ItemPurchased,
    /// A withdrawal request was accepted.
    WithdrawalRequested,
    /// The withdrawal form changed.
    WithdrawFormChanged,
    /// The energy ticker added energy.
    EnergyRegenerated,
    /// A referral was confirmed.
    ReferralConfirmed,
    /// The active view changed.
    ViewChanged,
    /// An operation was refused; see the snapshot's notification.
    Rejected,
}

/// A state change pushed to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdate {
    /// What happened.
    pub reason: UpdateReason,
    /// The session after the change.
    pub snapshot: SessionSnapshot,
}

/// Result of [`GameSession::fetch_tasks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The batch was replaced.
    Replaced {
        /// Number of tasks in the new batch.
        count: usize,
        /// Where the batch came from.
        source: BatchSource,
    },
    /// A newer fetch started while this one was in flight; its result was
    /// dropped.
    Stale,
}

/// Result of a verified answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    /// The task that was answered.
    pub task_id: TaskId,
    /// Whether the answer was accepted.
    pub correct: bool,
    /// How the verdict was reached.
    pub verdict_source: VerdictSource,
    /// Currency credited (zero on a wrong answer).
    pub reward: Decimal,
    /// Experience credited (zero on a wrong answer).
    pub xp_gained: Decimal,
    /// The new level, if the answer caused a level-up.
    pub level_up: Option<u32>,
    /// Statistics after the answer.
    pub stats: UserStatistics,
}

/// A single player's game session.
///
/// Cheap to clone; clones share state and the update channel.
pub struct GameSession<P> {
    state: Arc<RwLock<SessionState>>,
    provider: Arc<P>,
    updates: broadcast::Sender<SessionUpdate>,
    settings: SessionSettings,
}

impl<P> Clone for GameSession<P> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            provider: Arc::clone(&self.provider),
            updates: self.updates.clone(),
            settings: self.settings,
        }
    }
}

impl<P: TaskContentProvider> GameSession<P> {
    /// Start a fresh session with starting statistics and a new referral
    /// code.
    pub fn new(provider: P, settings: SessionSettings) -> Self {
        let stats = initial_statistics(ReferralCode::generate());
        Self::from_state(Arc::new(provider), settings, SessionState::new(stats))
    }

    /// Wrap an existing state.
    pub fn from_state(provider: Arc<P>, settings: SessionSettings, state: SessionState) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(state)),
            provider,
            updates,
            settings,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot::capture(&state, Instant::now())
    }

    /// Current statistics record.
    pub async fn stats(&self) -> UserStatistics {
        self.state.read().await.stats.clone()
    }

    /// The current batch, answers withheld.
    pub async fn tasks(&self) -> Vec<TaskView> {
        let state = self.state.read().await;
        state.tasks.iter().map(TaskView::from).collect()
    }

    // -----------------------------------------------------------------------
    // Task flow
    // -----------------------------------------------------------------------

    /// Replace the task batch with a freshly generated one.
    ///
    /// Provider failures yield an empty batch, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DailyLimitReached`] when today's tasks are
    /// used up; no provider call is made in that case.
    pub async fn fetch_tasks(&self) -> Result<FetchOutcome, SessionError> {
        let (generation, level) = {
            let mut state = self.state.write().await;
            if daily_limit_reached(&state.stats) {
                return Err(self.reject(
                    &mut state,
                    SessionError::DailyLimitReached {
                        limit: DAILY_TASK_LIMIT,
                    },
                ));
            }
            state.batch_generation = state.batch_generation.wrapping_add(1);
            state.loading = true;
            self.publish(&state, UpdateReason::FetchStarted);
            (state.batch_generation, state.stats.level)
        };

        let batch = fetch_batch(self.provider.as_ref(), level, self.settings.task_batch_size).await;

        let mut state = self.state.write().await;
        if state.batch_generation != generation {
            debug!(
                generation,
                current = state.batch_generation,
                "discarding superseded task batch"
            );
            return Ok(FetchOutcome::Stale);
        }

        let count = batch.tasks.len();
        state.tasks = batch.tasks;
        state.clear_active();
        state.loading = false;
        info!(generation, count, source = ?batch.source, "task batch replaced");
        self.publish(&state, UpdateReason::TasksReplaced);

        Ok(FetchOutcome::Replaced {
            count,
            source: batch.source,
        })
    }

    /// Open a task for answering.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::VerificationInProgress`] while an answer is
    /// being checked, or [`SessionError::TaskNotFound`] if the id is not in
    /// the current batch.
    pub async fn select_task(&self, id: TaskId) -> Result<TaskView, SessionError> {
        let mut state = self.state.write().await;
        if state.verifying {
            return Err(self.reject(&mut state, SessionError::VerificationInProgress));
        }
        let Some(view) = state.find_task(id).map(TaskView::from) else {
            return Err(self.reject(&mut state, SessionError::TaskNotFound(id)));
        };
        state.active_task = Some(id);
        state.answer_input.clear();
        self.publish(&state, UpdateReason::TaskSelected);
        Ok(view)
    }

    /// Close the answer dialog without answering.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::VerificationInProgress`] while an answer is
    /// being checked.
    pub async fn close_task(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        if state.verifying {
            return Err(self.reject(&mut state, SessionError::VerificationInProgress));
        }
        state.clear_active();
        self.publish(&state, UpdateReason::TaskClosed);
        Ok(())
    }

    /// Update the answer text for the active task.
    pub async fn set_answer_input(&self, text: &str) {
        let mut state = self.state.write().await;
        text.clone_into(&mut state.answer_input);
        self.publish(&state, UpdateReason::AnswerInputChanged);
    }

    /// Submit an answer for the active task.
    ///
    /// A correct answer credits the reward, removes the task and closes the
    /// dialog. A wrong answer costs energy and leaves the dialog open so
    /// the player can try again.
    ///
    /// # Errors
    ///
    /// Checked in this order: [`SessionError::VerificationInProgress`],
    /// [`SessionError::NoActiveTask`],
    /// [`SessionError::EmptyAnswer`], [`SessionError::DailyLimitReached`],
    /// [`SessionError::InsufficientEnergy`]. After verification,
    /// [`SessionError::StaleTask`] if the task left the batch meanwhile.
    pub async fn submit_answer(&self, answer: &str) -> Result<SubmitOutcome, SessionError> {
        let task = {
            let mut state = self.state.write().await;
            if state.verifying {
                return Err(self.reject(&mut state, SessionError::VerificationInProgress));
            }
            let Some(task) = state.active().cloned() else {
                return Err(self.reject(&mut state, SessionError::NoActiveTask));
            };
            answer.clone_into(&mut state.answer_input);
            if answer.trim().is_empty() {
                return Err(self.reject(&mut state, SessionError::EmptyAnswer));
            }
            if daily_limit_reached(&state.stats) {
                return Err(self.reject(
                    &mut state,
                    SessionError::DailyLimitReached {
                        limit: DAILY_TASK_LIMIT,
                    },
                ));
            }
            if !can_attempt_task(&state.stats, &task) {
                let err = SessionError::InsufficientEnergy {
                    energy: state.stats.energy,
                    required: task.energy_cost,
                };
                return Err(self.reject(&mut state, err));
            }
            state.verifying = true;
            self.publish(&state, UpdateReason::AnswerChecking);
            task
        };

        let verdict = verify_answer(self.provider.as_ref(), &task, answer).await;

        let mut state = self.state.write().await;
        state.verifying = false;
        if state.find_task(task.id).is_none() {
            debug!(task_id = %task.id, "discarding verdict for replaced task");
            return Err(self.reject(&mut state, SessionError::StaleTask));
        }

        if verdict.correct {
            let applied = apply_task_success(&state.stats, &task)
                .and_then(|stats| xp_for_reward(task.reward).map(|xp| (stats, xp)));
            let (stats, xp_gained) = match applied {
                Ok(pair) => pair,
                Err(e) => return Err(self.reject(&mut state, e.into())),
            };
            let level_up = (stats.level > state.stats.level).then_some(stats.level);
            state.stats = stats;
            state.tasks.retain(|t| t.id != task.id);
            state.clear_active();

            let mut message = format!(
                "Success! You earned {} and {} XP.",
                task.reward.normalize(),
                xp_gained.normalize()
            );
            if let Some(level) = level_up {
                message = format!("Congratulations! You reached level {level}! {message}");
            }
            self.notify(&mut state, NotificationKind::Success, message);
            info!(
                task_id = %task.id,
                reward = %task.reward,
                level = state.stats.level,
                source = ?verdict.source,
                "task completed"
            );
            self.publish(&state, UpdateReason::AnswerAccepted);

            Ok(SubmitOutcome {
                task_id: task.id,
                correct: true,
                verdict_source: verdict.source,
                reward: task.reward,
                xp_gained,
                level_up,
                stats: state.stats.clone(),
            })
        } else {
            let stats = match apply_task_failure(&state.stats) {
                Ok(stats) => stats,
                Err(e) => return Err(self.reject(&mut state, e.into())),
            };
            state.stats = stats;
            self.notify(
                &mut state,
                NotificationKind::Error,
                "That answer is not correct. Try again.",
            );
            info!(
                task_id = %task.id,
                energy = %state.stats.energy,
                source = ?verdict.source,
                "answer rejected"
            );
            self.publish(&state, UpdateReason::AnswerRejected);

            Ok(SubmitOutcome {
                task_id: task.id,
                correct: false,
                verdict_source: verdict.source,
                reward: Decimal::ZERO,
                xp_gained: Decimal::ZERO,
                level_up: None,
                stats: state.stats.clone(),
            })
        }
    }

    // -----------------------------------------------------------------------
    // Shop and wallet
    // -----------------------------------------------------------------------

    /// Buy a shop item.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownItem`] for an id not in the catalog,
    /// or [`SessionError::Purchase`] if the balance is too low.
    pub async fn purchase(&self, item_id: &str) -> Result<UserStatistics, SessionError> {
        let mut state = self.state.write().await;
        let Some(item) = find_item(item_id) else {
            return Err(self.reject(&mut state, SessionError::UnknownItem(item_id.to_owned())));
        };
        match apply_purchase(&state.stats, item) {
            Ok(stats) => {
                state.stats = stats;
                self.notify(
                    &mut state,
                    NotificationKind::Success,
                    format!("{} purchased!", item.name),
                );
                self.publish(&state, UpdateReason::ItemPurchased);
                Ok(state.stats.clone())
            }
            Err(e) => Err(self.reject(&mut state, e.into())),
        }
    }

    /// Edit the withdrawal form without submitting it.
    pub async fn set_withdraw_form(&self, update: WithdrawFormUpdate) -> WithdrawForm {
        let mut state = self.state.write().await;
        state.withdraw_form.apply(update);
        self.publish(&state, UpdateReason::WithdrawFormChanged);
        state.withdraw_form.clone()
    }

    /// Merge `update` into the withdrawal form and submit it.
    ///
    /// On success the amount and account fields are cleared; the payment
    /// method is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Withdrawal`] when the amount is unparsable
    /// or below the minimum, exceeds the balance, or the account is blank.
    pub async fn withdraw(
        &self,
        update: WithdrawFormUpdate,
    ) -> Result<WithdrawalReceipt, SessionError> {
        let mut state = self.state.write().await;
        state.withdraw_form.apply(update);
        let form = state.withdraw_form.clone();

        let Withdrawal { stats, amount } =
            match apply_withdrawal(&state.stats, &form.amount, &form.account) {
                Ok(done) => done,
                Err(e) => return Err(self.reject(&mut state, e.into())),
            };
        state.stats = stats;
        state.withdraw_form.amount.clear();
        state.withdraw_form.account.clear();

        let receipt = WithdrawalReceipt {
            amount,
            account: form.account.trim().to_owned(),
            method: form.method,
            requested_at: Utc::now(),
        };
        self.notify(
            &mut state,
            NotificationKind::Success,
            format!(
                "Withdrawal request for {} via {} sent. Payment arrives within 24 hours.",
                amount.normalize(),
                form.method
            ),
        );
        info!(amount = %amount, method = %form.method, "withdrawal requested");
        self.publish(&state, UpdateReason::WithdrawalRequested);
        Ok(receipt)
    }

    // -----------------------------------------------------------------------
    // Progression and navigation
    // -----------------------------------------------------------------------

    /// Apply one energy regeneration tick and return the resulting energy.
    ///
    /// Publishes only when the energy actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Economy`] on arithmetic overflow.
    pub async fn regenerate_energy(&self) -> Result<Decimal, SessionError> {
        let mut state = self.state.write().await;
        let stats = tycoon_economy::regenerate_energy(&state.stats)?;
        if stats.energy != state.stats.energy {
            state.stats = stats;
            self.publish(&state, UpdateReason::EnergyRegenerated);
        }
        Ok(state.stats.energy)
    }

    /// Credit a confirmed referral.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Economy`] on arithmetic overflow.
    pub async fn confirm_referral(&self) -> Result<UserStatistics, SessionError> {
        let mut state = self.state.write().await;
        let stats = match apply_referral_confirmed(&state.stats) {
            Ok(stats) => stats,
            Err(e) => return Err(self.reject(&mut state, e.into())),
        };
        state.stats = stats;
        self.notify(
            &mut state,
            NotificationKind::Info,
            "A friend joined with your referral code!",
        );
        info!(referrals = state.stats.referrals_count, "referral confirmed");
        self.publish(&state, UpdateReason::ReferralConfirmed);
        Ok(state.stats.clone())
    }

    /// Switch the active view.
    pub async fn set_view(&self, view: ViewMode) {
        let mut state = self.state.write().await;
        state.view = view;
        self.publish(&state, UpdateReason::ViewChanged);
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn notify(&self, state: &mut SessionState, kind: NotificationKind, message: impl Into<String>) {
        state.notification = Some(Notification::new(
            kind,
            message,
            self.settings.notification_ttl,
        ));
    }

    fn publish(&self, state: &SessionState, reason: UpdateReason) {
        let update = SessionUpdate {
            reason,
            snapshot: SessionSnapshot::capture(state, Instant::now()),
        };
        // Err only means nobody is subscribed.
        let _ = self.updates.send(update);
    }

    fn reject(&self, state: &mut SessionState, err: SessionError) -> SessionError {
        debug!(error = %err, "session operation rejected");
        self.notify(state, err.notification_kind(), err.user_message());
        self.publish(state, UpdateReason::Rejected);
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use rust_decimal_macros::dec;
    use tycoon_provider::ProviderError;
    use tycoon_types::{PaymentMethod, Task, TaskKind};

    use super::*;

    fn task(title: &str, answer: Option<&str>, reward: Decimal, cost: Decimal) -> Task {
        Task {
            id: TaskId::new(),
            title: title.to_owned(),
            description: format!("{title} challenge"),
            reward,
            energy_cost: cost,
            difficulty: "Easy".to_owned(),
            kind: TaskKind::Riddle,
            answer: answer.map(ToOwned::to_owned),
        }
    }

    /// Serves queued batches and a fixed verdict.
    struct ScriptedProvider {
        batches: Mutex<Vec<Vec<Task>>>,
        verdict: Option<bool>,
        generate_calls: AtomicU32,
        judge_calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(batches: Vec<Vec<Task>>, verdict: Option<bool>) -> Self {
            Self {
                batches: Mutex::new(batches),
                verdict,
                generate_calls: AtomicU32::new(0),
                judge_calls: AtomicU32::new(0),
            }
        }
    }

    impl TaskContentProvider for ScriptedProvider {
        async fn generate_tasks(&self, _level: u32, _count: u32) -> Result<Vec<Task>, ProviderError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            let mut batches = self.batches.lock().unwrap();
            if batches.is_empty() {
                return Err(ProviderError::LlmBackend("no batch scripted".to_owned()));
            }
            Ok(batches.remove(0))
        }

        async fn judge_answer(&self, _task: &Task, _answer: &str) -> Result<bool, ProviderError> {
            self.judge_calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
                .ok_or_else(|| ProviderError::LlmBackend("judge down".to_owned()))
        }
    }

    fn session_with(
        provider: ScriptedProvider,
        stats: UserStatistics,
        tasks: Vec<Task>,
    ) -> GameSession<ScriptedProvider> {
        let mut state = SessionState::new(stats);
        state.tasks = tasks;
        GameSession::from_state(Arc::new(provider), SessionSettings::default(), state)
    }

    fn fresh_stats() -> UserStatistics {
        initial_statistics(ReferralCode::generate())
    }

    #[tokio::test]
    async fn fetch_replaces_batch_and_clears_dialog() {
        let old = task("old", Some("x"), dec!(10), dec!(5));
        let old_id = old.id;
        let provider = ScriptedProvider::new(
            vec![vec![
                task("a", Some("1"), dec!(10), dec!(5)),
                task("b", None, dec!(20), dec!(5)),
            ]],
            Some(true),
        );
        let session = session_with(provider, fresh_stats(), vec![old]);
        session.select_task(old_id).await.unwrap();

        let outcome = session.fetch_tasks().await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Replaced {
                count: 2,
                source: BatchSource::Provider
            }
        );
        let snap = session.snapshot().await;
        assert_eq!(snap.tasks.len(), 2);
        assert!(snap.active_task.is_none());
        assert!(!snap.loading);
    }

    #[tokio::test]
    async fn fetch_failure_yields_empty_batch_without_notification() {
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let session = session_with(
            provider,
            fresh_stats(),
            vec![task("old", None, dec!(1), dec!(1))],
        );
        let outcome = session.fetch_tasks().await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Replaced {
                count: 0,
                source: BatchSource::Unavailable
            }
        );
        let snap = session.snapshot().await;
        assert!(snap.tasks.is_empty());
        assert!(snap.notification.is_none());
    }

    #[tokio::test]
    async fn fetch_refused_at_daily_limit() {
        let provider = ScriptedProvider::new(vec![Vec::new()], Some(true));
        let mut stats = fresh_stats();
        stats.daily_tasks_done = DAILY_TASK_LIMIT;
        let session = session_with(provider, stats, Vec::new());

        let err = session.fetch_tasks().await.unwrap_err();
        assert_eq!(err, SessionError::DailyLimitReached { limit: 5 });
        assert_eq!(session.provider.generate_calls.load(Ordering::SeqCst), 0);
        let note = session.snapshot().await.notification.unwrap();
        assert_eq!(note.kind, NotificationKind::Info);
    }

    #[tokio::test]
    async fn correct_answer_credits_and_removes_task() {
        let t = task("riddle", Some("clock"), dec!(50), dec!(10));
        let id = t.id;
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let session = session_with(provider, fresh_stats(), vec![t]);

        session.select_task(id).await.unwrap();
        let outcome = session.submit_answer("Clock").await.unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.verdict_source, VerdictSource::Provider);
        assert_eq!(outcome.reward, dec!(50));
        assert_eq!(outcome.xp_gained, dec!(25));
        assert_eq!(outcome.level_up, None);
        assert_eq!(outcome.stats.balance, dec!(250));
        assert_eq!(outcome.stats.energy, dec!(90));
        assert_eq!(outcome.stats.daily_tasks_done, 1);

        let snap = session.snapshot().await;
        assert!(snap.tasks.is_empty());
        assert!(snap.active_task.is_none());
        assert!(snap.answer_input.is_empty());
        let note = snap.notification.unwrap();
        assert_eq!(note.kind, NotificationKind::Success);
        assert!(note.message.contains("50"));
    }

    #[tokio::test]
    async fn wrong_answer_costs_energy_and_keeps_dialog() {
        let t = task("riddle", Some("clock"), dec!(50), dec!(10));
        let id = t.id;
        let provider = ScriptedProvider::new(Vec::new(), Some(false));
        let session = session_with(provider, fresh_stats(), vec![t]);

        session.select_task(id).await.unwrap();
        let outcome = session.submit_answer("watch").await.unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.stats.energy, dec!(95));
        assert_eq!(outcome.stats.balance, dec!(200));
        assert_eq!(outcome.stats.daily_tasks_done, 0);

        let snap = session.snapshot().await;
        assert_eq!(snap.active_task.map(|t| t.id), Some(id));
        assert_eq!(snap.answer_input, "watch");
        assert_eq!(snap.notification.unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn task_without_answer_is_auto_accepted() {
        let t = task("creative", None, dec!(30), dec!(10));
        let id = t.id;
        let provider = ScriptedProvider::new(Vec::new(), Some(false));
        let session = session_with(provider, fresh_stats(), vec![t]);

        session.select_task(id).await.unwrap();
        let outcome = session.submit_answer("a poem").await.unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.verdict_source, VerdictSource::AutoAccepted);
        assert_eq!(session.provider.judge_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn judge_outage_falls_back_to_local_compare() {
        let t = task("riddle", Some("Clock"), dec!(10), dec!(10));
        let id = t.id;
        let provider = ScriptedProvider::new(Vec::new(), None);
        let session = session_with(provider, fresh_stats(), vec![t]);

        session.select_task(id).await.unwrap();
        let outcome = session.submit_answer("clock").await.unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.verdict_source, VerdictSource::LocalFallback);
    }

    #[tokio::test]
    async fn submit_gates_are_checked_in_order() {
        let t = task("riddle", Some("x"), dec!(10), dec!(50));
        let id = t.id;
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let mut stats = fresh_stats();
        stats.energy = dec!(20);
        let session = session_with(provider, stats, vec![t]);

        assert_eq!(
            session.submit_answer("x").await.unwrap_err(),
            SessionError::NoActiveTask
        );
        session.select_task(id).await.unwrap();
        assert_eq!(
            session.submit_answer("  ").await.unwrap_err(),
            SessionError::EmptyAnswer
        );
        assert_eq!(
            session.submit_answer("x").await.unwrap_err(),
            SessionError::InsufficientEnergy {
                energy: dec!(20),
                required: dec!(50)
            }
        );
        assert_eq!(session.provider.judge_calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.stats().await.energy, dec!(20));
    }

    #[tokio::test]
    async fn level_up_is_reported() {
        let t = task("big", None, dec!(200), dec!(10));
        let id = t.id;
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let mut stats = fresh_stats();
        stats.experience = dec!(900);
        let session = session_with(provider, stats, vec![t]);

        session.select_task(id).await.unwrap();
        let outcome = session.submit_answer("anything").await.unwrap();
        assert_eq!(outcome.level_up, Some(2));
        assert_eq!(outcome.stats.experience, dec!(0));
        assert_eq!(outcome.stats.next_level_exp, dec!(1500));
        let note = session.snapshot().await.notification.unwrap();
        assert!(note.message.contains("level 2"));
    }

    #[tokio::test]
    async fn dialog_is_locked_while_verifying() {
        let a = task("a", Some("1"), dec!(10), dec!(10));
        let b = task("b", Some("2"), dec!(10), dec!(10));
        let (a_id, b_id) = (a.id, b.id);
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let session = session_with(provider, fresh_stats(), vec![a, b]);
        session.select_task(a_id).await.unwrap();
        session.state.write().await.verifying = true;

        assert_eq!(
            session.select_task(b_id).await.unwrap_err(),
            SessionError::VerificationInProgress
        );
        assert_eq!(
            session.close_task().await.unwrap_err(),
            SessionError::VerificationInProgress
        );
        assert_eq!(
            session.submit_answer("1").await.unwrap_err(),
            SessionError::VerificationInProgress
        );
        let snap = session.snapshot().await;
        assert_eq!(snap.active_task.map(|t| t.id), Some(a_id));
        assert_eq!(session.provider.judge_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn select_unknown_task_is_rejected() {
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let session = session_with(provider, fresh_stats(), Vec::new());
        let missing = TaskId::new();
        assert_eq!(
            session.select_task(missing).await.unwrap_err(),
            SessionError::TaskNotFound(missing)
        );
    }

    #[tokio::test]
    async fn purchase_and_unknown_item() {
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let mut stats = fresh_stats();
        stats.balance = dec!(150);
        stats.energy = dec!(40);
        let session = session_with(provider, stats, Vec::new());

        let after = session.purchase("energy-drink").await.unwrap();
        assert_eq!(after.balance, dec!(50));
        assert_eq!(after.energy, dec!(90));

        let err = session.purchase("time-machine").await.unwrap_err();
        assert_eq!(err, SessionError::UnknownItem("time-machine".to_owned()));

        let err = session.purchase("energy-drink").await.unwrap_err();
        assert!(matches!(err, SessionError::Purchase(_)));
        assert_eq!(session.stats().await.balance, dec!(50));
    }

    #[tokio::test]
    async fn withdraw_clears_form_and_returns_receipt() {
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let mut stats = fresh_stats();
        stats.balance = dec!(200);
        let session = session_with(provider, stats, Vec::new());

        let receipt = session
            .withdraw(WithdrawFormUpdate {
                amount: Some("128".to_owned()),
                account: Some(" 01700000000 ".to_owned()),
                method: Some(PaymentMethod::Nagad),
            })
            .await
            .unwrap();
        assert_eq!(receipt.amount, dec!(128));
        assert_eq!(receipt.account, "01700000000");
        assert_eq!(receipt.method, PaymentMethod::Nagad);

        let snap = session.snapshot().await;
        assert_eq!(snap.stats.balance, dec!(72));
        assert!(snap.withdraw_form.amount.is_empty());
        assert!(snap.withdraw_form.account.is_empty());
        assert_eq!(snap.withdraw_form.method, PaymentMethod::Nagad);
    }

    #[tokio::test]
    async fn rejected_withdrawal_keeps_form() {
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let mut stats = fresh_stats();
        stats.balance = dec!(200);
        let session = session_with(provider, stats, Vec::new());

        session
            .set_withdraw_form(WithdrawFormUpdate {
                amount: Some("150".to_owned()),
                ..WithdrawFormUpdate::default()
            })
            .await;
        let err = session
            .withdraw(WithdrawFormUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Please enter an account number.");
        let snap = session.snapshot().await;
        assert_eq!(snap.withdraw_form.amount, "150");
        assert_eq!(snap.stats.balance, dec!(200));
    }

    #[tokio::test]
    async fn regenerate_publishes_only_on_change() {
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let mut stats = fresh_stats();
        stats.energy = dec!(99);
        let session = session_with(provider, stats, Vec::new());
        let mut rx = session.subscribe();

        assert_eq!(session.regenerate_energy().await.unwrap(), dec!(100));
        let update = rx.recv().await.unwrap();
        assert_eq!(update.reason, UpdateReason::EnergyRegenerated);

        assert_eq!(session.regenerate_energy().await.unwrap(), dec!(100));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn referral_and_view_updates_are_published() {
        let provider = ScriptedProvider::new(Vec::new(), Some(true));
        let session = session_with(provider, fresh_stats(), Vec::new());
        let mut rx = session.subscribe();

        let stats = session.confirm_referral().await.unwrap();
        assert_eq!(stats.referrals_count, 1);
        assert_eq!(
            rx.recv().await.unwrap().reason,
            UpdateReason::ReferralConfirmed
        );

        session.set_view(ViewMode::Shop).await;
        let update = rx.recv().await.unwrap();
        assert_eq!(update.reason, UpdateReason::ViewChanged);
        assert_eq!(update.snapshot.view, ViewMode::Shop);
    }
}
