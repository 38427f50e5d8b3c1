//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: they are defined entirely by their
/// attribute values and are never mutated in place. A stock amount such as
/// "4 bottles and 500ML" is a value object; the liquor item it belongs to is an
/// entity.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Volume { ml: i64 }
///
/// impl ValueObject for Volume {}
///
/// assert_eq!(Volume { ml: 750 }, Volume { ml: 750 });
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
