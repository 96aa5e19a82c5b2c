//! Traits connecting user types to the engine.
//!
//! [`Record`] is the typed accessor every specification is generic over. It
//! is usually derived with `#[derive(Record)]` from `sieve-macros`, but a
//! manual implementation is just a `match` on the field path.

use crate::value::{FieldKind, Timestamp, Value};

/// A type whose fields can be filtered, sorted and searched.
///
/// # Derive Usage
///
/// ```ignore
/// use sieve::Record;
///
/// #[derive(Record)]
/// struct Person {
///     #[field(String)]
///     name: String,
///     #[field(Number)]
///     age: u8,
/// }
///
/// assert_eq!(Person::AGE, "age");
/// ```
///
/// # Manual Implementation
///
/// ```
/// use sieve::{FieldKind, Number, Record, Value};
///
/// struct Person {
///     name: String,
///     age: u8,
/// }
///
/// impl Record for Person {
///     fn field_value(&self, path: &str) -> Value<'_> {
///         match path {
///             "name" => Value::String(&self.name),
///             "age" => Value::Number(Number::from(self.age)),
///             _ => Value::None,
///         }
///     }
///
///     fn field_kind(path: &str) -> Option<FieldKind> {
///         match path {
///             "name" => Some(FieldKind::String),
///             "age" => Some(FieldKind::Number),
///             _ => None,
///         }
///     }
/// }
/// ```
///
/// Paths are plain strings. An implementation may resolve dotted paths such
/// as `"address.city"` by delegating to a nested record.
pub trait Record {
    /// Returns the value of a field for comparison.
    ///
    /// Unknown paths and null values return [`Value::None`].
    fn field_value(&self, path: &str) -> Value<'_>;

    /// Returns the declared kind of a field, or `None` if the path does not
    /// resolve to a readable member.
    ///
    /// Builders call this when a criterion is added so that unknown fields
    /// and kind mismatches surface at the call site.
    fn field_kind(path: &str) -> Option<FieldKind>
    where
        Self: Sized;
}

/// A projection target whose members can be set by name.
///
/// ```
/// use sieve::{Assign, Value};
///
/// #[derive(Default)]
/// struct Summary {
///     label: String,
/// }
///
/// impl Assign for Summary {
///     fn assign(&mut self, field: &str, value: Value<'_>) -> bool {
///         match (field, value) {
///             ("label", Value::String(s)) => {
///                 self.label = s.to_string();
///                 true
///             }
///             _ => false,
///         }
///     }
/// }
/// ```
pub trait Assign {
    /// Sets `field` from `value`.
    ///
    /// Returns `false` when the field is unknown or the value has the wrong
    /// kind; the member keeps its current value in that case.
    fn assign(&mut self, field: &str, value: Value<'_>) -> bool;
}

/// Converts enum types to the stable discriminant they are compared by.
///
/// ```
/// use sieve::Discriminant;
///
/// enum Status {
///     Pending,
///     Active,
/// }
///
/// impl Discriminant for Status {
///     fn discriminant(&self) -> u32 {
///         match self {
///             Status::Pending => 0,
///             Status::Active => 1,
///         }
///     }
/// }
/// ```
pub trait Discriminant {
    /// Returns the discriminant value for this enum variant.
    ///
    /// Use explicit values rather than declaration order so that stored
    /// specifications keep their meaning when variants are added.
    fn discriminant(&self) -> u32;
}

/// Converts date/time types to a [`Timestamp`] instant.
pub trait IntoTimestamp {
    /// Converts this value to a [`Timestamp`] for comparison.
    fn timestamp(&self) -> Timestamp;
}

impl IntoTimestamp for Timestamp {
    fn timestamp(&self) -> Timestamp {
        *self
    }
}

impl IntoTimestamp for i64 {
    fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl IntoTimestamp for u64 {
    fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl IntoTimestamp for std::time::SystemTime {
    fn timestamp(&self) -> Timestamp {
        match self.duration_since(std::time::UNIX_EPOCH) {
            Ok(after) => Timestamp::from_millis(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => Timestamp::from_millis(
                i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;
    use crate::value::Number;

    struct Item {
        name: String,
        count: i32,
    }

    impl Record for Item {
        fn field_value(&self, path: &str) -> Value<'_> {
            match path {
                "name" => Value::String(&self.name),
                "count" => Value::Number(Number::from(self.count)),
                _ => Value::None,
            }
        }

        fn field_kind(path: &str) -> Option<FieldKind> {
            match path {
                "name" => Some(FieldKind::String),
                "count" => Some(FieldKind::Number),
                _ => None,
            }
        }
    }

    #[test]
    fn manual_record() {
        let item = Item {
            name: "test".to_string(),
            count: 42,
        };

        assert_eq!(item.field_value("name"), Value::String("test"));
        assert_eq!(item.field_value("count"), Value::Number(Number::I64(42)));
        assert_eq!(item.field_value("unknown"), Value::None);
        assert_eq!(Item::field_kind("count"), Some(FieldKind::Number));
        assert_eq!(Item::field_kind("unknown"), None);
    }

    #[test]
    fn timestamps_from_integers() {
        assert_eq!(1000i64.timestamp(), Timestamp(1000));
        assert_eq!(1000u64.timestamp(), Timestamp(1000));
        assert_eq!(u64::MAX.timestamp(), Timestamp(i64::MAX));
    }

    #[test]
    fn timestamps_from_system_time() {
        let later = UNIX_EPOCH + Duration::from_millis(1500);
        assert_eq!(later.timestamp(), Timestamp(1500));

        let earlier = UNIX_EPOCH - Duration::from_millis(250);
        assert_eq!(earlier.timestamp(), Timestamp(-250));
    }
}
