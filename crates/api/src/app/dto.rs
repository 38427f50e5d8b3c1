use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stocktally_auth::{Capabilities, Permission, Role};
use stocktally_core::{AccountId, DomainError, ItemId};
use stocktally_inventory::{DailyStockEntry, ItemType, MovementRecord, StockAmount, StockSnapshot};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Body of `POST /daily-stock`.
///
/// Liquor entries carry `bottles` (and optionally `milliliters`); other
/// entries carry `quantity`.
#[derive(Debug, Deserialize)]
pub struct DailyStockRequest {
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub item_type: ItemType,
    #[serde(default)]
    pub bottles: Option<i64>,
    #[serde(default)]
    pub milliliters: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl DailyStockRequest {
    pub fn into_entry(self) -> Result<DailyStockEntry, DomainError> {
        match self.item_type {
            ItemType::Liquor => {
                let bottles = self
                    .bottles
                    .ok_or_else(|| DomainError::validation("bottles is required for liquor"))?;
                if self.quantity.is_some() {
                    return Err(DomainError::validation("quantity is not valid for liquor"));
                }
                Ok(DailyStockEntry::liquor(
                    self.date,
                    self.item_id,
                    bottles,
                    self.milliliters.unwrap_or(0),
                ))
            }
            ItemType::Other => {
                let quantity = self
                    .quantity
                    .ok_or_else(|| DomainError::validation("quantity is required for other stock"))?;
                if self.bottles.is_some() || self.milliliters.is_some() {
                    return Err(DomainError::validation(
                        "bottles/milliliters are only valid for liquor",
                    ));
                }
                Ok(DailyStockEntry::other(self.date, self.item_id, quantity))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RederiveRequest {
    pub item_id: ItemId,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub account_id: AccountId,
    pub role: Role,
    pub permissions: &'static [Permission],
}

impl From<&Capabilities> for WhoAmIResponse {
    fn from(caps: &Capabilities) -> Self {
        Self {
            account_id: caps.account_id(),
            role: caps.role(),
            permissions: caps.permissions(),
        }
    }
}

/// A stock amount with its human-readable form alongside.
#[derive(Debug, Serialize)]
pub struct AmountView {
    #[serde(flatten)]
    pub amount: AmountFields,
    pub display: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AmountFields {
    Liquor {
        bottles: i64,
        milliliters: i64,
        total_ml: i64,
    },
    Other {
        quantity: i64,
    },
}

impl AmountView {
    /// Raw fields of `amount` with a caller-supplied display string.
    pub fn with_display(amount: StockAmount, display: String) -> Self {
        let amount = match amount {
            StockAmount::Liquor(a) => AmountFields::Liquor {
                bottles: a.bottles,
                milliliters: a.milliliters,
                total_ml: a.total_ml,
            },
            StockAmount::Other(q) => AmountFields::Other { quantity: q },
        };
        Self { amount, display }
    }
}

impl From<StockAmount> for AmountView {
    fn from(amount: StockAmount) -> Self {
        let display = match amount {
            StockAmount::Liquor(a) => a.to_string(),
            StockAmount::Other(q) => q.to_string(),
        };
        Self::with_display(amount, display)
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub id: String,
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub item_type: ItemType,
    pub stock: AmountView,
}

impl From<StockSnapshot> for SnapshotResponse {
    fn from(s: StockSnapshot) -> Self {
        Self {
            id: s.id.to_string(),
            date: s.date,
            item_id: s.item_id,
            item_type: s.item_type(),
            stock: s.amount.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub id: String,
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub item_type: ItemType,
    pub previous_stock: AmountView,
    pub current_stock: AmountView,
    pub difference: AmountView,
    pub consumed: bool,
}

impl From<MovementRecord> for MovementResponse {
    fn from(m: MovementRecord) -> Self {
        // Differences are not canonical; their text comes from the net total.
        let difference = AmountView::with_display(m.difference, m.consumption_display());
        Self {
            id: m.id.to_string(),
            consumed: m.is_consumption(),
            date: m.date,
            item_id: m.item_id,
            item_type: m.item_type,
            previous_stock: m.previous_stock.into(),
            current_stock: m.current_stock.into(),
            difference,
        }
    }
}
