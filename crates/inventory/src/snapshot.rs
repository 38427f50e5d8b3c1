use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stocktally_core::{DomainError, ItemId, SnapshotId};

use crate::quantity::{ItemType, StockAmount};
use crate::units;

/// One item's recorded on-hand stock for one calendar day.
///
/// At most one snapshot exists per `(date, item_id)`; a second recording for
/// the same key overwrites the amount in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub id: SnapshotId,
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub amount: StockAmount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockSnapshot {
    pub fn from_entry(id: SnapshotId, entry: &DailyStockEntry, now: DateTime<Utc>) -> Self {
        Self {
            id,
            date: entry.date,
            item_id: entry.item_id,
            amount: entry.amount,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn item_type(&self) -> ItemType {
        self.amount.item_type()
    }

    /// Replace the recorded amount, keeping identity and creation time.
    pub fn overwrite(&mut self, amount: StockAmount, now: DateTime<Utc>) {
        self.amount = amount;
        self.updated_at = now;
    }
}

/// Input for recording daily stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStockEntry {
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub item_type: ItemType,
    pub amount: StockAmount,
}

impl DailyStockEntry {
    pub fn liquor(date: NaiveDate, item_id: ItemId, bottles: i64, milliliters: i64) -> Self {
        Self {
            date,
            item_id,
            item_type: ItemType::Liquor,
            amount: StockAmount::liquor(bottles, milliliters),
        }
    }

    pub fn other(date: NaiveDate, item_id: ItemId, quantity: i64) -> Self {
        Self {
            date,
            item_id,
            item_type: ItemType::Other,
            amount: StockAmount::other(quantity),
        }
    }

    /// The amount must match the declared item type and be in range.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.amount.item_type() != self.item_type {
            return Err(DomainError::validation(format!(
                "amount shape does not match item_type '{}'",
                self.item_type
            )));
        }
        if let StockAmount::Liquor(a) = &self.amount {
            if a.total_ml != units::to_total_ml(a.bottles, a.milliliters) {
                return Err(DomainError::validation(
                    "total_ml does not match bottles and milliliters",
                ));
            }
        }
        self.amount.validate()
    }
}
