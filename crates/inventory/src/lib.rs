//! Inventory domain module.
//!
//! Business rules for liquor and general stock, daily snapshots and the
//! day-over-day movement derivation, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod alert;
pub mod item;
pub mod movement;
pub mod quantity;
pub mod snapshot;
pub mod units;

pub use alert::{LowStockAlert, low_stock_alerts};
pub use item::{
    LiquorItem, LiquorItemPatch, NewLiquorItem, NewOtherStockItem, OtherStockItem,
    OtherStockItemPatch,
};
pub use movement::{MovementRecord, NO_SALES, StockMovement, derive_movement};
pub use quantity::{BottleAmount, ItemType, StockAmount};
pub use snapshot::{DailyStockEntry, StockSnapshot};
pub use units::BOTTLE_ML;
