//! The static shop catalog.
//!
//! Defined once at process start and never mutated. `Earning` and `XP`
//! entries advertise multipliers the reward computation does not apply.

use std::sync::LazyLock;

use rust_decimal::Decimal;
use tycoon_types::{BoostType, InventoryItem};

static CATALOG: LazyLock<Vec<InventoryItem>> = LazyLock::new(|| {
    vec![
        InventoryItem {
            id: "energy-drink".to_owned(),
            name: "Energy Drink".to_owned(),
            description: "Instantly refills 50 energy.".to_owned(),
            price: Decimal::ONE_HUNDRED,
            boost_type: BoostType::Energy,
            boost_value: Decimal::new(50, 0),
            icon: "fa-bolt".to_owned(),
        },
        InventoryItem {
            id: "brain-booster".to_owned(),
            name: "Brain Booster".to_owned(),
            description: "Earn 20% more money and XP on every task.".to_owned(),
            price: Decimal::new(500, 0),
            boost_type: BoostType::Earning,
            boost_value: Decimal::new(12, 1),
            icon: "fa-brain".to_owned(),
        },
        InventoryItem {
            id: "super-cpu".to_owned(),
            name: "Super CPU".to_owned(),
            description: "Makes hard tasks easier.".to_owned(),
            price: Decimal::new(2000, 0),
            boost_type: BoostType::Xp,
            boost_value: Decimal::TWO,
            icon: "fa-microchip".to_owned(),
        },
    ]
});

/// All shop items in display order.
pub fn catalog() -> &'static [InventoryItem] {
    &CATALOG
}

/// Look up a shop item by its catalog key.
pub fn find_item(id: &str) -> Option<&'static InventoryItem> {
    CATALOG.iter().find(|item| item.id == id)
}
