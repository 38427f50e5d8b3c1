use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocktally_core::{DomainError, ItemId};

use crate::quantity::BottleAmount;
use crate::units;

fn default_threshold() -> i64 {
    1
}

fn ensure_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn ensure_non_negative(field: &str, value: i64) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::validation(format!("{field} must be non-negative")));
    }
    Ok(())
}

fn ensure_residual_ml(milliliters: i64) -> Result<(), DomainError> {
    ensure_non_negative("milliliters", milliliters)?;
    if milliliters >= units::BOTTLE_ML {
        return Err(DomainError::validation(format!(
            "milliliters must be less than {}",
            units::BOTTLE_ML
        )));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Liquor
// ─────────────────────────────────────────────────────────────────────────────

/// A liquor product tracked in bottles + milliliters.
///
/// `total_ml` is always derived from `bottles` and `milliliters`; it is never
/// accepted from callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquorItem {
    pub id: ItemId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub bottles: i64,
    pub milliliters: i64,
    pub total_ml: i64,
    /// Minimum number of bottles before the item is flagged as low stock.
    pub threshold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LiquorItem {
    pub fn on_hand(&self) -> BottleAmount {
        BottleAmount::new(self.bottles, self.milliliters)
    }

    pub fn is_low_stock(&self) -> bool {
        self.bottles < self.threshold
    }
}

/// Command: add a liquor item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLiquorItem {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub bottles: i64,
    #[serde(default)]
    pub milliliters: i64,
    #[serde(default = "default_threshold")]
    pub threshold: i64,
}

impl NewLiquorItem {
    pub fn validate(&self) -> Result<(), DomainError> {
        ensure_name(&self.name)?;
        ensure_non_negative("bottles", self.bottles)?;
        ensure_residual_ml(self.milliliters)?;
        ensure_non_negative("threshold", self.threshold)
    }

    pub fn into_item(self, id: ItemId, now: DateTime<Utc>) -> Result<LiquorItem, DomainError> {
        self.validate()?;
        Ok(LiquorItem {
            id,
            name: self.name,
            brand: self.brand,
            category: self.category,
            bottles: self.bottles,
            milliliters: self.milliliters,
            total_ml: units::to_total_ml(self.bottles, self.milliliters),
            threshold: self.threshold,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Command: partial update of a liquor item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquorItemPatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub bottles: Option<i64>,
    pub milliliters: Option<i64>,
    pub threshold: Option<i64>,
}

impl LiquorItemPatch {
    /// Apply onto `item`, recomputing `total_ml` when either volume field changes.
    ///
    /// The item is left untouched when validation fails.
    pub fn apply(self, item: &mut LiquorItem, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut next = item.clone();
        if let Some(name) = self.name {
            ensure_name(&name)?;
            next.name = name;
        }
        if let Some(brand) = self.brand {
            next.brand = brand;
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if let Some(threshold) = self.threshold {
            ensure_non_negative("threshold", threshold)?;
            next.threshold = threshold;
        }
        if self.bottles.is_some() || self.milliliters.is_some() {
            next.bottles = self.bottles.unwrap_or(item.bottles);
            next.milliliters = self.milliliters.unwrap_or(item.milliliters);
            ensure_non_negative("bottles", next.bottles)?;
            ensure_residual_ml(next.milliliters)?;
            next.total_ml = units::to_total_ml(next.bottles, next.milliliters);
        }
        next.updated_at = now;
        *item = next;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Other stock
// ─────────────────────────────────────────────────────────────────────────────

/// A non-liquor product tracked as a plain quantity in some unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherStockItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub unit: String,
    /// Minimum quantity (in `unit`) before the item is flagged as low stock.
    pub threshold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OtherStockItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.threshold
    }
}

/// Command: add an other-stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOtherStockItem {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_threshold")]
    pub threshold: i64,
}

impl NewOtherStockItem {
    pub fn validate(&self) -> Result<(), DomainError> {
        ensure_name(&self.name)?;
        ensure_non_negative("quantity", self.quantity)?;
        ensure_non_negative("threshold", self.threshold)
    }

    pub fn into_item(self, id: ItemId, now: DateTime<Utc>) -> Result<OtherStockItem, DomainError> {
        self.validate()?;
        Ok(OtherStockItem {
            id,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            unit: self.unit,
            threshold: self.threshold,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Command: partial update of an other-stock item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherStockItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub threshold: Option<i64>,
}

impl OtherStockItemPatch {
    pub fn apply(self, item: &mut OtherStockItem, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut next = item.clone();
        if let Some(name) = self.name {
            ensure_name(&name)?;
            next.name = name;
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if let Some(quantity) = self.quantity {
            ensure_non_negative("quantity", quantity)?;
            next.quantity = quantity;
        }
        if let Some(unit) = self.unit {
            next.unit = unit;
        }
        if let Some(threshold) = self.threshold {
            ensure_non_negative("threshold", threshold)?;
            next.threshold = threshold;
        }
        next.updated_at = now;
        *item = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house_vodka() -> LiquorItem {
        NewLiquorItem {
            name: "House Vodka".to_string(),
            brand: "Smirnoff".to_string(),
            category: "vodka".to_string(),
            bottles: 3,
            milliliters: 250,
            threshold: 5,
        }
        .into_item(ItemId::new(), Utc::now())
        .unwrap()
    }

    #[test]
    fn new_liquor_item_derives_total() {
        let item = house_vodka();
        assert_eq!(item.total_ml, 2500);
        assert!(item.is_low_stock());
    }

    #[test]
    fn empty_name_rejected() {
        let cmd = NewOtherStockItem {
            name: "  ".to_string(),
            category: String::new(),
            quantity: 1,
            unit: "kg".to_string(),
            threshold: 1,
        };
        assert!(matches!(cmd.into_item(ItemId::new(), Utc::now()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_recomputes_total_from_merged_fields() {
        let mut item = house_vodka();
        LiquorItemPatch {
            bottles: Some(6),
            ..Default::default()
        }
        .apply(&mut item, Utc::now())
        .unwrap();

        assert_eq!(item.bottles, 6);
        assert_eq!(item.milliliters, 250);
        assert_eq!(item.total_ml, 6 * 750 + 250);
        assert!(!item.is_low_stock());
    }

    #[test]
    fn failed_patch_leaves_item_untouched() {
        let mut item = house_vodka();
        let before = item.clone();
        let res = LiquorItemPatch {
            name: Some("Renamed".to_string()),
            milliliters: Some(-1),
            ..Default::default()
        }
        .apply(&mut item, Utc::now());

        assert!(res.is_err());
        assert_eq!(item, before);
    }

    #[test]
    fn a_full_bottle_of_residual_ml_is_rejected() {
        let cmd = NewLiquorItem {
            milliliters: 750,
            ..NewLiquorItem {
                name: "Gin".to_string(),
                brand: String::new(),
                category: String::new(),
                bottles: 1,
                milliliters: 0,
                threshold: 1,
            }
        };
        assert!(matches!(cmd.validate(), Err(DomainError::Validation(_))));

        let mut item = house_vodka();
        assert!(LiquorItemPatch {
            milliliters: Some(800),
            ..Default::default()
        }
        .apply(&mut item, Utc::now())
        .is_err());
    }

    #[test]
    fn other_stock_low_when_below_threshold() {
        let mut item = NewOtherStockItem {
            name: "Limes".to_string(),
            category: "garnish".to_string(),
            quantity: 10,
            unit: "pcs".to_string(),
            threshold: 10,
        }
        .into_item(ItemId::new(), Utc::now())
        .unwrap();
        assert!(!item.is_low_stock());

        OtherStockItemPatch {
            quantity: Some(9),
            ..Default::default()
        }
        .apply(&mut item, Utc::now())
        .unwrap();
        assert!(item.is_low_stock());
    }

    #[test]
    fn threshold_defaults_to_one() {
        let cmd: NewOtherStockItem = serde_json::from_value(serde_json::json!({
            "name": "Ice",
            "unit": "bags"
        }))
        .unwrap();
        assert_eq!(cmd.threshold, 1);
        assert_eq!(cmd.quantity, 0);
    }
}
