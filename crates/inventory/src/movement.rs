//! Day-over-day stock movement.
//!
//! A movement compares an item's snapshot for `date - 1` against the one for
//! `date`. `difference = previous - current`: positive means stock was consumed
//! (sold), negative means stock went up (restocked).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stocktally_core::{ItemId, MovementId};

use crate::quantity::{BottleAmount, ItemType, StockAmount};
use crate::snapshot::StockSnapshot;

/// Shown in place of a consumption amount when stock did not go down.
pub const NO_SALES: &str = "No sales";

/// The computed part of a movement record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub previous_stock: StockAmount,
    pub current_stock: StockAmount,
    pub difference: StockAmount,
}

/// Compare two snapshots of the same item.
///
/// Both snapshots are read in `item_type`'s shape; a snapshot recorded in the
/// other shape contributes zero.
pub fn derive_movement(
    item_type: ItemType,
    previous: &StockSnapshot,
    current: &StockSnapshot,
) -> StockMovement {
    let previous_stock = previous.amount.as_type(item_type);
    let current_stock = current.amount.as_type(item_type);
    StockMovement {
        previous_stock,
        current_stock,
        difference: previous_stock.minus(&current_stock),
    }
}

/// The calendar day a movement for `date` compares against.
pub fn comparison_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// Persisted movement for one item on one day. Never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: MovementId,
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub item_type: ItemType,
    pub previous_stock: StockAmount,
    pub current_stock: StockAmount,
    pub difference: StockAmount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovementRecord {
    pub fn new(
        id: MovementId,
        date: NaiveDate,
        item_id: ItemId,
        item_type: ItemType,
        movement: StockMovement,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            date,
            item_id,
            item_type,
            previous_stock: movement.previous_stock,
            current_stock: movement.current_stock,
            difference: movement.difference,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the computed fields with a fresh derivation.
    pub fn recompute(&mut self, movement: StockMovement, now: DateTime<Utc>) {
        self.previous_stock = movement.previous_stock;
        self.current_stock = movement.current_stock;
        self.difference = movement.difference;
        self.updated_at = now;
    }

    /// Stock went down between the two days.
    pub fn is_consumption(&self) -> bool {
        match self.difference {
            StockAmount::Liquor(d) => d.total_ml > 0,
            StockAmount::Other(q) => q > 0,
        }
    }

    /// Net consumption for display.
    ///
    /// The liquor difference is component-wise and may carry negative
    /// milliliters, so the text is rebuilt from the net total. Restocks and
    /// unchanged stock read as [`NO_SALES`].
    pub fn consumption_display(&self) -> String {
        match self.difference {
            StockAmount::Liquor(d) if d.total_ml > 0 => {
                BottleAmount::from_total_ml(d.total_ml).to_string()
            }
            StockAmount::Other(q) if q > 0 => q.to_string(),
            _ => NO_SALES.to_string(),
        }
    }
}
