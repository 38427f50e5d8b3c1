//! Low stock detection.

use serde::Serialize;

use stocktally_core::ItemId;

use crate::item::{LiquorItem, OtherStockItem};
use crate::quantity::ItemType;

/// One item whose on-hand stock is below its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockAlert {
    pub item_id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    /// Display form, e.g. `"3 bottles and 250ML"` or `"4 kg"`.
    pub current_stock: String,
    /// Display form, e.g. `"5 bottles"`.
    pub threshold: String,
}

/// Collect alerts for every low item, liquor first, each group in input order.
pub fn low_stock_alerts(liquor: &[LiquorItem], other: &[OtherStockItem]) -> Vec<LowStockAlert> {
    let liquor_alerts = liquor.iter().filter(|i| i.is_low_stock()).map(|i| LowStockAlert {
        item_id: i.id,
        name: i.name.clone(),
        item_type: ItemType::Liquor,
        current_stock: i.on_hand().to_string(),
        threshold: format!("{} bottles", i.threshold),
    });

    let other_alerts = other.iter().filter(|i| i.is_low_stock()).map(|i| LowStockAlert {
        item_id: i.id,
        name: i.name.clone(),
        item_type: ItemType::Other,
        current_stock: format!("{} {}", i.quantity, i.unit),
        threshold: format!("{} {}", i.threshold, i.unit),
    });

    liquor_alerts.chain(other_alerts).collect()
}
