//! Behavioral properties of the economy engine.
//!
//! Each test drives the public API only, over a spread of starting
//! records, and checks the relationship between input and output rather
//! than a single worked example.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tycoon_economy::{
    DAILY_TASK_LIMIT, FAILURE_ENERGY_PENALTY, MIN_WITHDRAWAL, PurchaseError, WithdrawalError,
    apply_purchase, apply_task_failure, apply_task_success, apply_withdrawal, can_attempt_task,
    daily_limit_reached, find_item, initial_statistics, regenerate_energy,
};
use tycoon_types::{
    BoostType, InventoryItem, ReferralCode, Task, TaskId, TaskKind, UserStatistics,
};

fn base_stats() -> UserStatistics {
    initial_statistics(ReferralCode::generate())
}

fn stats_with(balance: Decimal, energy: Decimal, experience: Decimal) -> UserStatistics {
    let mut stats = base_stats();
    stats.balance = balance;
    stats.energy = energy;
    stats.experience = experience;
    stats
}

fn task(reward: Decimal, energy_cost: Decimal) -> Task {
    Task {
        id: TaskId::new(),
        title: String::from("Riddle"),
        description: String::from("What has keys but can't open locks?"),
        reward,
        energy_cost,
        difficulty: String::from("Medium"),
        kind: TaskKind::Riddle,
        answer: Some(String::from("piano")),
    }
}

fn sample_records() -> Vec<UserStatistics> {
    let mut out = Vec::new();
    for balance in [dec!(0), dec!(0.5), dec!(200), dec!(12345.67)] {
        for energy in [dec!(-10), dec!(0), dec!(37), dec!(100)] {
            for experience in [dec!(0), dec!(499.5), dec!(999)] {
                out.push(stats_with(balance, energy, experience));
            }
        }
    }
    out
}

fn sample_tasks() -> Vec<Task> {
    vec![
        task(dec!(10), dec!(5)),
        task(dec!(45.5), dec!(12)),
        task(dec!(150), dec!(30)),
        task(dec!(2000), dec!(0)),
    ]
}

#[test]
fn success_credits_exactly_the_reward() {
    for stats in sample_records() {
        for t in sample_tasks() {
            if !can_attempt_task(&stats, &t) {
                continue;
            }
            let after = apply_task_success(&stats, &t).unwrap();
            assert_eq!(after.balance, stats.balance + t.reward);
            assert_eq!(after.energy, stats.energy - t.energy_cost);
            assert_eq!(after.daily_tasks_done, stats.daily_tasks_done + 1);
            assert!(after.level >= stats.level);
        }
    }
}

#[test]
fn failure_only_touches_energy() {
    for stats in sample_records() {
        let after = apply_task_failure(&stats).unwrap();
        assert_eq!(after.energy, stats.energy - FAILURE_ENERGY_PENALTY);

        let mut expected = stats.clone();
        expected.energy = after.energy;
        assert_eq!(after, expected);
    }
}

#[test]
fn leveling_worked_example() {
    let stats = stats_with(dec!(200), dec!(100), dec!(900));
    let after = apply_task_success(&stats, &task(dec!(300), dec!(10))).unwrap();
    assert_eq!(after.level, 2);
    assert_eq!(after.experience, dec!(50));
    assert_eq!(after.next_level_exp, dec!(1500));
}

#[test]
fn experience_renormalized_below_threshold_for_ordinary_rewards() {
    for stats in sample_records() {
        // Rewards below 2 * next_level_exp cannot cross two thresholds.
        for t in sample_tasks().into_iter().filter(|t| t.reward < dec!(1000)) {
            let after = apply_task_success(&stats, &t).unwrap();
            assert!(after.experience < after.next_level_exp);
            assert!(after.experience >= Decimal::ZERO);
        }
    }
}

#[test]
fn regeneration_never_exceeds_max() {
    let mut stats = stats_with(dec!(200), dec!(99), dec!(0));
    stats = regenerate_energy(&stats).unwrap();
    assert_eq!(stats.energy, dec!(100));

    for _ in 0..10 {
        stats = regenerate_energy(&stats).unwrap();
        assert!(stats.energy <= stats.max_energy);
    }
    assert_eq!(stats.energy, stats.max_energy);
}

#[test]
fn purchase_rejection_leaves_balance_unchanged() {
    let stats = stats_with(dec!(50), dec!(20), dec!(0));
    let item = InventoryItem {
        id: String::from("energy-drink"),
        name: String::from("Energy Drink"),
        description: String::new(),
        price: dec!(100),
        boost_type: BoostType::Energy,
        boost_value: dec!(50),
        icon: String::from("fa-bolt"),
    };

    let result = apply_purchase(&stats, &item);
    assert!(matches!(result, Err(PurchaseError::InsufficientFunds { .. })));
    assert_eq!(stats.balance, dec!(50));
}

#[test]
fn purchases_never_make_balance_negative() {
    for stats in sample_records() {
        for id in ["energy-drink", "brain-booster", "super-cpu"] {
            let item = find_item(id).unwrap();
            match apply_purchase(&stats, item) {
                Ok(after) => {
                    assert!(after.balance >= Decimal::ZERO);
                    assert!(after.energy <= after.max_energy);
                }
                Err(err) => {
                    assert!(stats.balance < item.price, "unexpected rejection: {err}");
                }
            }
        }
    }
}

#[test]
fn withdrawal_boundary() {
    let stats = stats_with(dec!(200), dec!(100), dec!(0));

    let done = apply_withdrawal(&stats, "128", "01700000000").unwrap();
    assert_eq!(done.amount, dec!(128));
    assert_eq!(done.stats.balance, dec!(72));

    let rejected = apply_withdrawal(&stats, "127", "01700000000");
    assert_eq!(
        rejected,
        Err(WithdrawalError::InvalidAmount {
            input: String::from("127"),
            minimum: MIN_WITHDRAWAL,
        })
    );
}

#[test]
fn withdrawals_never_make_balance_negative() {
    for stats in sample_records() {
        for amount in ["128", "200", "12345.67", "99999"] {
            if let Ok(done) = apply_withdrawal(&stats, amount, "acct") {
                assert!(done.stats.balance >= Decimal::ZERO);
            }
        }
    }
}

#[test]
fn predicates_are_pure() {
    let mut stats = base_stats();
    stats.daily_tasks_done = DAILY_TASK_LIMIT;
    let snapshot = stats.clone();
    let t = task(dec!(10), dec!(5));

    let first = (can_attempt_task(&stats, &t), daily_limit_reached(&stats));
    let second = (can_attempt_task(&stats, &t), daily_limit_reached(&stats));

    assert_eq!(first, second);
    assert_eq!(first, (true, true));
    assert_eq!(stats, snapshot);
}
