//! Task rewards, leveling, energy, and gating predicates.
//!
//! # Level-Up Rule
//!
//! A correct answer grants `reward` currency and `reward / 2` experience.
//! If experience reaches `next_level_exp`, the level increments once, the
//! threshold is subtracted, and the threshold grows to
//! `floor(next_level_exp * 1.5)`. The check runs exactly once per task:
//! a reward large enough to cross two thresholds carries the remainder
//! without a second level-up.
//!
//! # Energy
//!
//! - Success debits the task's `energy_cost` without re-checking; callers
//!   gate attempts with [`can_attempt_task`].
//! - Failure debits a fixed [`FAILURE_ENERGY_PENALTY`] with no floor, so
//!   energy can go negative after repeated wrong answers.
//! - Regeneration adds [`ENERGY_REGEN_PER_TICK`] capped at `max_energy`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;
use tycoon_types::{ReferralCode, Task, UserStatistics};

use crate::constants::{
    DAILY_TASK_LIMIT, ENERGY_REGEN_PER_TICK, FAILURE_ENERGY_PENALTY, LEVEL_CURVE_FACTOR,
    REFERRAL_BONUS, STARTING_BALANCE, STARTING_MAX_ENERGY, STARTING_NEXT_LEVEL_EXP,
    XP_REWARD_DIVISOR,
};
use crate::error::EconomyError;

/// Build the statistics record of a fresh session.
pub const fn initial_statistics(referral_code: ReferralCode) -> UserStatistics {
    UserStatistics {
        balance: STARTING_BALANCE,
        energy: STARTING_MAX_ENERGY,
        max_energy: STARTING_MAX_ENERGY,
        level: 1,
        experience: Decimal::ZERO,
        next_level_exp: STARTING_NEXT_LEVEL_EXP,
        referral_code,
        referrals_count: 0,
        daily_tasks_done: 0,
    }
}

/// Experience granted for a reward (`reward / 2`).
pub fn xp_for_reward(reward: Decimal) -> Result<Decimal, EconomyError> {
    reward
        .checked_div(XP_REWARD_DIVISOR)
        .ok_or_else(|| overflow("xp from reward"))
}

/// Apply a correct answer to the statistics record.
///
/// Credits the reward, debits the task's energy cost, adds experience
/// with a single-step level-up carry, and counts the task toward the
/// daily limit.
pub fn apply_task_success(
    stats: &UserStatistics,
    task: &Task,
) -> Result<UserStatistics, EconomyError> {
    let xp_gained = xp_for_reward(task.reward)?;
    let mut next = stats.clone();

    next.balance = stats
        .balance
        .checked_add(task.reward)
        .ok_or_else(|| overflow("balance credit"))?;
    next.energy = stats
        .energy
        .checked_sub(task.energy_cost)
        .ok_or_else(|| overflow("task energy debit"))?;

    let experience = stats
        .experience
        .checked_add(xp_gained)
        .ok_or_else(|| overflow("experience gain"))?;

    if experience >= stats.next_level_exp {
        next.level = stats
            .level
            .checked_add(1)
            .ok_or_else(|| overflow("level increment"))?;
        next.experience = experience
            .checked_sub(stats.next_level_exp)
            .ok_or_else(|| overflow("experience carry"))?;
        next.next_level_exp = next_threshold(stats.next_level_exp)?;
        debug!(
            level = next.level,
            carried_xp = %next.experience,
            next_level_exp = %next.next_level_exp,
            "level up"
        );
    } else {
        next.experience = experience;
    }

    next.daily_tasks_done = stats
        .daily_tasks_done
        .checked_add(1)
        .ok_or_else(|| overflow("daily task counter"))?;

    Ok(next)
}

/// Apply a wrong answer: energy drops by the fixed penalty, nothing else
/// changes.
pub fn apply_task_failure(stats: &UserStatistics) -> Result<UserStatistics, EconomyError> {
    let mut next = stats.clone();
    next.energy = stats
        .energy
        .checked_sub(FAILURE_ENERGY_PENALTY)
        .ok_or_else(|| overflow("failure energy penalty"))?;
    Ok(next)
}

/// Whether the player has enough energy to attempt the task.
pub fn can_attempt_task(stats: &UserStatistics, task: &Task) -> bool {
    stats.energy >= task.energy_cost
}

/// Whether the daily task limit has been reached.
pub const fn daily_limit_reached(stats: &UserStatistics) -> bool {
    stats.daily_tasks_done >= DAILY_TASK_LIMIT
}

/// One regeneration tick: energy + 1, capped at `max_energy`.
pub fn regenerate_energy(stats: &UserStatistics) -> Result<UserStatistics, EconomyError> {
    let mut next = stats.clone();
    next.energy = stats
        .energy
        .checked_add(ENERGY_REGEN_PER_TICK)
        .ok_or_else(|| overflow("energy regeneration"))?
        .min(stats.max_energy);
    Ok(next)
}

/// Record an externally confirmed referral.
///
/// Only the counter changes; the bonus is display-only.
pub fn apply_referral_confirmed(stats: &UserStatistics) -> Result<UserStatistics, EconomyError> {
    let mut next = stats.clone();
    next.referrals_count = stats
        .referrals_count
        .checked_add(1)
        .ok_or_else(|| overflow("referral counter"))?;
    Ok(next)
}

/// Earnings shown on the referral screen (`referrals_count * REFERRAL_BONUS`).
pub fn referral_earnings(stats: &UserStatistics) -> Result<Decimal, EconomyError> {
    Decimal::from(stats.referrals_count)
        .checked_mul(REFERRAL_BONUS)
        .ok_or_else(|| overflow("referral earnings"))
}

/// Progress toward the next level as a rounded percentage.
pub fn level_progress_percent(stats: &UserStatistics) -> u32 {
    if stats.next_level_exp <= Decimal::ZERO {
        return 0;
    }
    stats
        .experience
        .checked_div(stats.next_level_exp)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round())
        .and_then(|pct| pct.to_u32())
        .unwrap_or(0)
}

/// `floor(threshold * 1.5)`.
fn next_threshold(threshold: Decimal) -> Result<Decimal, EconomyError> {
    threshold
        .checked_mul(LEVEL_CURVE_FACTOR)
        .map(|grown| grown.floor())
        .ok_or_else(|| overflow("level threshold growth"))
}

fn overflow(context: &str) -> EconomyError {
    EconomyError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}
