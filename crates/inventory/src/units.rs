//! Bottle/milliliter unit conversion.
//!
//! A liquor quantity is kept in two parts (whole bottles + leftover milliliters)
//! and as a single normalized milliliter total. Nothing here validates input;
//! callers are expected to pass non-negative values with `milliliters < BOTTLE_ML`.

/// Capacity of one bottle in milliliters.
pub const BOTTLE_ML: i64 = 750;

/// `bottles * BOTTLE_ML + milliliters`.
pub fn to_total_ml(bottles: i64, milliliters: i64) -> i64 {
    bottles * BOTTLE_ML + milliliters
}

/// Split a milliliter total into `(bottles, milliliters)` using floor division.
pub fn from_total_ml(total_ml: i64) -> (i64, i64) {
    (total_ml.div_euclid(BOTTLE_ML), total_ml.rem_euclid(BOTTLE_ML))
}

/// Human-readable rendering, e.g. `"3 bottles and 250ML"`, `"1 bottle"`, `"0"`.
pub fn format_liquor_quantity(bottles: i64, milliliters: i64) -> String {
    if bottles == 0 && milliliters == 0 {
        return "0".to_string();
    }

    let mut out = String::new();
    if bottles > 0 {
        out.push_str(&format!(
            "{} bottle{}",
            bottles,
            if bottles != 1 { "s" } else { "" }
        ));
    }
    if milliliters > 0 {
        if !out.is_empty() {
            out.push_str(" and ");
        }
        out.push_str(&format!("{milliliters}ML"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn total_of_eight_bottles_and_a_half() {
        assert_eq!(to_total_ml(8, 375), 6375);
    }

    #[test]
    fn split_exact_bottles() {
        assert_eq!(from_total_ml(2250), (3, 0));
        assert_eq!(from_total_ml(0), (0, 0));
        assert_eq!(from_total_ml(749), (0, 749));
    }

    #[test]
    fn formatting_matches_display_rules() {
        assert_eq!(format_liquor_quantity(0, 0), "0");
        assert_eq!(format_liquor_quantity(1, 0), "1 bottle");
        assert_eq!(format_liquor_quantity(3, 250), "3 bottles and 250ML");
        assert_eq!(format_liquor_quantity(0, 500), "500ML");
    }

    proptest! {
        #[test]
        fn total_is_linear_in_bottles(bottles in 0i64..1_000_000, ml in 0i64..BOTTLE_ML) {
            prop_assert_eq!(to_total_ml(bottles, ml), bottles * BOTTLE_ML + ml);
        }

        #[test]
        fn canonical_amounts_survive_split(bottles in 0i64..1_000_000, ml in 0i64..BOTTLE_ML) {
            prop_assert_eq!(from_total_ml(to_total_ml(bottles, ml)), (bottles, ml));
        }

        #[test]
        fn split_residual_is_always_canonical(total in 0i64..1_000_000_000) {
            let (bottles, ml) = from_total_ml(total);
            prop_assert!((0..BOTTLE_ML).contains(&ml));
            prop_assert_eq!(to_total_ml(bottles, ml), total);
        }
    }
}
