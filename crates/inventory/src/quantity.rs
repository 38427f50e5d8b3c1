//! Stock quantity shapes.

use serde::{Deserialize, Serialize};

use stocktally_core::{DomainError, ValueObject};

use crate::units;

/// Which quantity shape an item is tracked in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Bottles plus leftover milliliters.
    Liquor,
    /// A single scalar quantity.
    Other,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Liquor => "liquor",
            ItemType::Other => "other",
        }
    }
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ItemType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "liquor" => Ok(ItemType::Liquor),
            "other" => Ok(ItemType::Other),
            other => Err(DomainError::validation(format!(
                "item_type must be one of: liquor, other (got '{other}')"
            ))),
        }
    }
}

/// Two-part liquor amount with its normalized milliliter total.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottleAmount {
    pub bottles: i64,
    pub milliliters: i64,
    pub total_ml: i64,
}

impl ValueObject for BottleAmount {}

impl BottleAmount {
    /// Build from bottles + milliliters; the total is always computed.
    pub fn new(bottles: i64, milliliters: i64) -> Self {
        Self {
            bottles,
            milliliters,
            total_ml: units::to_total_ml(bottles, milliliters),
        }
    }

    /// Build the canonical two-part form of a milliliter total.
    pub fn from_total_ml(total_ml: i64) -> Self {
        let (bottles, milliliters) = units::from_total_ml(total_ml);
        Self {
            bottles,
            milliliters,
            total_ml,
        }
    }

    /// Component-wise `self - other`.
    ///
    /// The result is not canonicalized: `{10,0} - {8,375}` is `{2,-375,1125}`.
    pub fn minus(&self, other: &BottleAmount) -> BottleAmount {
        BottleAmount {
            bottles: self.bottles - other.bottles,
            milliliters: self.milliliters - other.milliliters,
            total_ml: self.total_ml - other.total_ml,
        }
    }
}

impl core::fmt::Display for BottleAmount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&units::format_liquor_quantity(self.bottles, self.milliliters))
    }
}

/// A stock amount in whichever shape the item is tracked in.
///
/// Serializes as a bare number for simple quantities and as an object for
/// liquor amounts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StockAmount {
    Liquor(BottleAmount),
    Other(i64),
}

impl ValueObject for StockAmount {}

impl StockAmount {
    pub fn liquor(bottles: i64, milliliters: i64) -> Self {
        StockAmount::Liquor(BottleAmount::new(bottles, milliliters))
    }

    pub fn other(quantity: i64) -> Self {
        StockAmount::Other(quantity)
    }

    pub fn zero(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Liquor => StockAmount::Liquor(BottleAmount::default()),
            ItemType::Other => StockAmount::Other(0),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            StockAmount::Liquor(_) => ItemType::Liquor,
            StockAmount::Other(_) => ItemType::Other,
        }
    }

    /// View this amount as `item_type`; a mismatched shape reads as zero.
    pub fn as_type(&self, item_type: ItemType) -> StockAmount {
        if self.item_type() == item_type {
            *self
        } else {
            StockAmount::zero(item_type)
        }
    }

    fn bottles_or_zero(&self) -> BottleAmount {
        match self {
            StockAmount::Liquor(a) => *a,
            StockAmount::Other(_) => BottleAmount::default(),
        }
    }

    fn quantity_or_zero(&self) -> i64 {
        match self {
            StockAmount::Other(q) => *q,
            StockAmount::Liquor(_) => 0,
        }
    }

    /// `self - other`, component-wise, in `self`'s shape.
    pub fn minus(&self, other: &StockAmount) -> StockAmount {
        match self {
            StockAmount::Liquor(a) => StockAmount::Liquor(a.minus(&other.bottles_or_zero())),
            StockAmount::Other(q) => StockAmount::Other(q - other.quantity_or_zero()),
        }
    }

    /// Reject negative components and non-canonical milliliters.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            StockAmount::Liquor(a) => {
                if a.bottles < 0 {
                    return Err(DomainError::validation("bottles must be non-negative"));
                }
                if !(0..units::BOTTLE_ML).contains(&a.milliliters) {
                    return Err(DomainError::validation(format!(
                        "milliliters must be between 0 and {}",
                        units::BOTTLE_ML - 1
                    )));
                }
                Ok(())
            }
            StockAmount::Other(q) => {
                if *q < 0 {
                    return Err(DomainError::validation("quantity must be non-negative"));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottle_difference_is_component_wise() {
        let prev = BottleAmount::new(10, 0);
        let curr = BottleAmount::new(8, 375);
        let diff = prev.minus(&curr);
        assert_eq!(diff.bottles, 2);
        assert_eq!(diff.milliliters, -375);
        assert_eq!(diff.total_ml, 1125);
    }

    #[test]
    fn mismatched_shape_reads_as_zero() {
        let qty = StockAmount::other(12);
        assert_eq!(qty.as_type(ItemType::Liquor), StockAmount::liquor(0, 0));
    }

    #[test]
    fn json_shape_depends_on_item_type() {
        let liquor = serde_json::to_value(StockAmount::liquor(4, 500)).unwrap();
        assert_eq!(
            liquor,
            serde_json::json!({"bottles": 4, "milliliters": 500, "total_ml": 3500})
        );

        let other = serde_json::to_value(StockAmount::other(7)).unwrap();
        assert_eq!(other, serde_json::json!(7));

        let parsed: StockAmount = serde_json::from_value(serde_json::json!(7)).unwrap();
        assert_eq!(parsed, StockAmount::other(7));
    }

    #[test]
    fn validation_bounds_milliliters() {
        assert!(StockAmount::liquor(1, 749).validate().is_ok());
        assert!(StockAmount::liquor(1, 750).validate().is_err());
        assert!(StockAmount::liquor(-1, 0).validate().is_err());
        assert!(StockAmount::other(-3).validate().is_err());
    }

    #[test]
    fn item_type_parses_lowercase_names() {
        assert_eq!("liquor".parse::<ItemType>().unwrap(), ItemType::Liquor);
        assert!("wine".parse::<ItemType>().is_err());
    }
}
