use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::FlatCategory;

/// Unit counters for one flat category. `remaining` never leaves the
/// `0..=total` band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCount {
    pub total: u32,
    pub remaining: u32,
}

/// Per-project flat inventory. The category set is fixed when the inventory
/// is created; only `remaining` moves afterwards, and only through
/// [`FlatInventory::adjust`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatInventory {
    units: BTreeMap<FlatCategory, UnitCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("this project does not offer {0} flats")]
    UnknownCategory(FlatCategory),
    #[error("no {category} units remaining")]
    Exhausted { category: FlatCategory },
    #[error("releasing a {category} unit would exceed its total of {total}")]
    ExceedsTotal { category: FlatCategory, total: u32 },
}

impl FlatInventory {
    /// Build an inventory where every category starts fully available.
    pub fn new(totals: BTreeMap<FlatCategory, u32>) -> Self {
        let units = totals
            .into_iter()
            .map(|(category, total)| (category, UnitCount { total, remaining: total }))
            .collect();
        Self { units }
    }

    pub fn offers(&self, category: FlatCategory) -> bool {
        self.units.contains_key(&category)
    }

    pub fn remaining(&self, category: FlatCategory) -> Option<u32> {
        self.units.get(&category).map(|unit| unit.remaining)
    }

    pub fn total(&self, category: FlatCategory) -> Option<u32> {
        self.units.get(&category).map(|unit| unit.total)
    }

    pub fn categories(&self) -> impl Iterator<Item = FlatCategory> + '_ {
        self.units.keys().copied()
    }

    /// Bounded mutation. Fails without touching any counter when the
    /// category is unknown or the delta would push `remaining` below zero or
    /// past `total`. Returns the new remaining count on success.
    pub fn adjust(&mut self, category: FlatCategory, delta: i64) -> Result<u32, InventoryError> {
        let unit = self
            .units
            .get_mut(&category)
            .ok_or(InventoryError::UnknownCategory(category))?;

        let next = i64::from(unit.remaining) + delta;
        if next < 0 {
            return Err(InventoryError::Exhausted { category });
        }
        if next > i64::from(unit.total) {
            return Err(InventoryError::ExceedsTotal {
                category,
                total: unit.total,
            });
        }

        unit.remaining = next as u32;
        Ok(unit.remaining)
    }

    /// Consume one unit for a confirmed booking.
    pub fn book_unit(&mut self, category: FlatCategory) -> Result<u32, InventoryError> {
        self.adjust(category, -1)
    }

    /// Return the unit held by a booked application whose withdrawal was
    /// approved.
    pub fn release_unit(&mut self, category: FlatCategory) -> Result<u32, InventoryError> {
        self.adjust(category, 1)
    }

    /// Rows for the remaining-unit snapshot query, in category order.
    pub fn snapshot(&self) -> Vec<InventoryRow> {
        self.units
            .iter()
            .map(|(category, unit)| InventoryRow {
                category: *category,
                category_label: category.label(),
                total: unit.total,
                remaining: unit.remaining,
            })
            .collect()
    }
}

/// Row view of one category's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    pub category: FlatCategory,
    pub category_label: &'static str,
    pub total: u32,
    pub remaining: u32,
}
