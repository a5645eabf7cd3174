//! Out-of-order provider responses.
//!
//! A slow task batch must not overwrite a newer one, and a verdict that
//! arrives after its task left the batch must not touch the statistics.
//! While a verdict is pending, no other task can be opened or submitted.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rust_decimal_macros::dec;
use tycoon_core::{FetchOutcome, GameSession, SessionError, SessionSettings, SessionState};
use tycoon_economy::initial_statistics;
use tycoon_provider::{ProviderError, TaskContentProvider};
use tycoon_types::{ReferralCode, Task, TaskId, TaskKind};

fn task(title: &str) -> Task {
    Task {
        id: TaskId::new(),
        title: title.to_owned(),
        description: "Solve it".to_owned(),
        reward: dec!(40),
        energy_cost: dec!(10),
        difficulty: "Easy".to_owned(),
        kind: TaskKind::Math,
        answer: Some("4".to_owned()),
    }
}

/// The first generation call is slow and returns one task; later calls are
/// fast and return two. Judging takes `judge_delay`.
struct SlowProvider {
    calls: AtomicU32,
    judge_delay: Duration,
}

impl SlowProvider {
    fn new(judge_delay: Duration) -> Self {
        Self {
            calls: AtomicU32::new(0),
            judge_delay,
        }
    }
}

impl TaskContentProvider for SlowProvider {
    async fn generate_tasks(&self, _level: u32, _count: u32) -> Result<Vec<Task>, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(vec![task("slow")])
        } else {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(vec![task("fast-1"), task("fast-2")])
        }
    }

    async fn judge_answer(&self, _task: &Task, _answer: &str) -> Result<bool, ProviderError> {
        tokio::time::sleep(self.judge_delay).await;
        Ok(true)
    }
}

fn session(provider: SlowProvider) -> GameSession<SlowProvider> {
    let state = SessionState::new(initial_statistics(ReferralCode::generate()));
    GameSession::from_state(Arc::new(provider), SessionSettings::default(), state)
}

#[tokio::test(start_paused = true)]
async fn older_batch_is_discarded() {
    let session = session(SlowProvider::new(Duration::ZERO));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.fetch_tasks().await })
    };
    while !session.snapshot().await.loading {
        tokio::task::yield_now().await;
    }

    let second = session.fetch_tasks().await.unwrap();
    let first = first.await.unwrap().unwrap();

    assert_eq!(first, FetchOutcome::Stale);
    let count = match second {
        FetchOutcome::Replaced { count, .. } => count,
        FetchOutcome::Stale => 0,
    };
    assert_ne!(count, 0);
    let snap = session.snapshot().await;
    assert_eq!(snap.tasks.len(), count);
    assert!(!snap.loading);
}

#[tokio::test(start_paused = true)]
async fn verdict_for_replaced_task_is_dropped() {
    let session = session(SlowProvider::new(Duration::from_secs(30)));
    session.fetch_tasks().await.unwrap();
    let id = session.tasks().await.first().unwrap().id;
    session.select_task(id).await.unwrap();

    let submit = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_answer("4").await })
    };
    while !session.snapshot().await.verifying {
        tokio::task::yield_now().await;
    }

    session.fetch_tasks().await.unwrap();
    let err = submit.await.unwrap().unwrap_err();
    assert_eq!(err, SessionError::StaleTask);

    let stats = session.stats().await;
    assert_eq!(stats.balance, dec!(200));
    assert_eq!(stats.energy, dec!(100));
    assert_eq!(stats.daily_tasks_done, 0);
    let snap = session.snapshot().await;
    assert!(!snap.verifying);
    assert_eq!(snap.tasks.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn second_submission_waits_for_pending_verdict() {
    let mut stats = initial_statistics(ReferralCode::generate());
    stats.daily_tasks_done = 4;
    stats.energy = dec!(10);
    let first = task("first");
    let second = task("second");
    let (first_id, second_id) = (first.id, second.id);
    let mut state = SessionState::new(stats);
    state.tasks = vec![first, second];
    let session = GameSession::from_state(
        Arc::new(SlowProvider::new(Duration::from_secs(5))),
        SessionSettings::default(),
        state,
    );

    session.select_task(first_id).await.unwrap();
    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_answer("4").await })
    };
    while !session.snapshot().await.verifying {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        session.select_task(second_id).await.unwrap_err(),
        SessionError::VerificationInProgress
    );
    assert_eq!(
        session.submit_answer("4").await.unwrap_err(),
        SessionError::VerificationInProgress
    );

    let outcome = pending.await.unwrap().unwrap();
    assert!(outcome.correct);
    let stats = session.stats().await;
    assert_eq!(stats.daily_tasks_done, 5);
    assert_eq!(stats.energy, dec!(0));
    assert!(session.fetch_tasks().await.is_err());
}
