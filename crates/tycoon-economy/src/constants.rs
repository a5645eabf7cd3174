//! Fixed economy parameters.
//!
//! These are game-balance constants, not deployment configuration. The
//! regeneration cadence (how often [`ENERGY_REGEN_PER_TICK`] is applied)
//! is configured in `tycoon-core`.

use rust_decimal::Decimal;

/// Completed tasks allowed per day.
pub const DAILY_TASK_LIMIT: u32 = 5;

/// Smallest accepted withdrawal.
pub const MIN_WITHDRAWAL: Decimal = Decimal::from_parts(128, 0, 0, false, 0);

/// Display-only bonus per confirmed referral.
pub const REFERRAL_BONUS: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Energy deducted for a wrong answer, independent of the task cost.
pub const FAILURE_ENERGY_PENALTY: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Energy restored per regeneration tick.
pub const ENERGY_REGEN_PER_TICK: Decimal = Decimal::ONE;

/// Growth factor of the level threshold (1.5).
pub const LEVEL_CURVE_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Divisor turning a reward into experience (`xp = reward / 2`).
pub const XP_REWARD_DIVISOR: Decimal = Decimal::TWO;

/// Balance of a fresh session.
pub const STARTING_BALANCE: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Energy and energy ceiling of a fresh session.
pub const STARTING_MAX_ENERGY: Decimal = Decimal::ONE_HUNDRED;

/// Level threshold of a fresh session.
pub const STARTING_NEXT_LEVEL_EXP: Decimal = Decimal::ONE_THOUSAND;
