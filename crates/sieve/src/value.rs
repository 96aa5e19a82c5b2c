//! Runtime value types for field comparison.
//!
//! [`Value`] is the borrowed value of a field read from a record at
//! evaluation time. [`Operand`] is the owned value a criterion compares
//! against. [`FieldKind`] names the type of a field in a record's schema and
//! drives construction-time validation.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

/// The declared type of a record field.
///
/// The declaration order ranks values of different kinds when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKind {
    /// Text, compared ordinally.
    String,
    /// Signed, unsigned or floating point number.
    Number,
    /// Instant in milliseconds since the Unix epoch.
    Timestamp,
    /// Enum compared by its underlying discriminant.
    Enum,
    /// Boolean flag.
    Bool,
}

impl FieldKind {
    /// Returns `true` if values of this kind have a meaningful order for the
    /// `GreaterThan`/`LessThan` operator family.
    pub fn is_orderable(self) -> bool {
        matches!(
            self,
            FieldKind::String | FieldKind::Number | FieldKind::Timestamp
        )
    }

    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum => "enum",
            FieldKind::Bool => "bool",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime value of a field, borrowed from the source record.
///
/// # Example
///
/// ```
/// use sieve::{Number, Value};
///
/// struct Person {
///     name: String,
///     age: u8,
/// }
///
/// fn field<'a>(person: &'a Person, path: &str) -> Value<'a> {
///     match path {
///         "name" => Value::String(&person.name),
///         "age" => Value::Number(Number::from(person.age)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Enum discriminant value.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Field not present, null, or unsupported.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns the kind of this value, or `None` for [`Value::None`].
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Value::String(_) => Some(FieldKind::String),
            Value::Number(_) => Some(FieldKind::Number),
            Value::Timestamp(_) => Some(FieldKind::Timestamp),
            Value::Enum(_) => Some(FieldKind::Enum),
            Value::Bool(_) => Some(FieldKind::Bool),
            Value::None => None,
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Extracts the enum discriminant, if present.
    pub fn as_enum(&self) -> Option<u32> {
        match self {
            Value::Enum(d) => Some(*d),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons are exact across representations: `I64(9007199254740993)`
/// is greater than `F64(9007199254740992.0)` even though both round to the
/// same `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns `true` for a floating point NaN.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        Some(self.total_cmp(other))
    }

    /// Total order over numbers, used for sorting.
    ///
    /// Values compare by their exact mathematical value. NaN is greater than
    /// every other number and equal to itself; `-0.0` equals `0.0`.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a.cmp(&b),
            (Number::U64(a), Number::U64(b)) => a.cmp(&b),
            // A negative signed value is below every unsigned value; otherwise
            // both fit in u64 and compare exactly.
            (Number::I64(a), Number::U64(b)) => match u64::try_from(a) {
                Ok(a) => a.cmp(&b),
                Err(_) => Ordering::Less,
            },
            (Number::U64(a), Number::I64(b)) => match u64::try_from(b) {
                Ok(b) => a.cmp(&b),
                Err(_) => Ordering::Greater,
            },
            (Number::F64(a), Number::F64(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            },
            (Number::I64(a), Number::F64(b)) => cmp_i64_f64(a, b),
            (Number::F64(a), Number::I64(b)) => cmp_i64_f64(b, a).reverse(),
            (Number::U64(a), Number::F64(b)) => cmp_u64_f64(a, b),
            (Number::F64(a), Number::U64(b)) => cmp_u64_f64(b, a).reverse(),
        }
    }
}

// 2^63 and 2^64 are exactly representable as f64.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Ordering of the fractional part of `b` once the integral parts tie.
fn fraction_order(b: f64, whole: f64) -> Ordering {
    if b > whole {
        Ordering::Less
    } else if b < whole {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

fn cmp_i64_f64(a: i64, b: f64) -> Ordering {
    if b.is_nan() || b >= TWO_POW_63 {
        return Ordering::Less;
    }
    if b < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let whole = b.trunc();
    a.cmp(&(whole as i64)).then_with(|| fraction_order(b, whole))
}

fn cmp_u64_f64(a: u64, b: f64) -> Ordering {
    if b.is_nan() || b >= TWO_POW_64 {
        return Ordering::Less;
    }
    if b < 0.0 {
        return Ordering::Greater;
    }
    let whole = b.trunc();
    a.cmp(&(whole as u64)).then_with(|| fraction_order(b, whole))
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// Date/time values compare by instant; convert from your datetime type
/// through [`IntoTimestamp`](crate::IntoTimestamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

/// Owned value stored in a predicate criterion.
///
/// Unlike [`Value`], which borrows from the record, an operand owns its data
/// so it can live inside a specification.
#[derive(Debug, Clone)]
pub enum Operand {
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Enum discriminant.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Candidate set for the `In` operator.
    List(Vec<Operand>),
    /// Compiled regular expression for the `Matches` operator.
    Regex(Regex),
}

impl Operand {
    /// Builds an enum set operand from discriminants.
    pub fn enums<I>(discriminants: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Operand::List(discriminants.into_iter().map(Operand::Enum).collect())
    }

    /// Returns the field kind this operand compares against.
    ///
    /// Lists have no single kind; regexes match strings.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Operand::String(_) | Operand::Regex(_) => Some(FieldKind::String),
            Operand::Number(_) => Some(FieldKind::Number),
            Operand::Timestamp(_) => Some(FieldKind::Timestamp),
            Operand::Enum(_) => Some(FieldKind::Enum),
            Operand::Bool(_) => Some(FieldKind::Bool),
            Operand::List(_) => None,
        }
    }

    /// Returns a short description of the operand type for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::List(_) => "list",
            Operand::Regex(_) => "regex",
            other => other.kind().map_or("none", FieldKind::as_str),
        }
    }

    /// Orders a field value relative to this operand.
    ///
    /// Returns `None` for kind mismatches, missing values, lists, regexes
    /// and NaN.
    pub fn compare_value(&self, value: &Value<'_>) -> Option<Ordering> {
        match (value, self) {
            (Value::String(field), Operand::String(operand)) => {
                Some((**field).cmp(operand.as_str()))
            }
            (Value::Number(field), Operand::Number(operand)) => field.compare(*operand),
            (Value::Timestamp(field), Operand::Timestamp(operand)) => Some(field.cmp(operand)),
            (Value::Enum(field), Operand::Enum(operand)) => Some(field.cmp(operand)),
            (Value::Bool(field), Operand::Bool(operand)) => Some(field.cmp(operand)),
            _ => None,
        }
    }

    /// Returns `true` if the field value equals this operand.
    pub fn equals(&self, value: &Value<'_>) -> bool {
        self.compare_value(value) == Some(Ordering::Equal)
    }
}

impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::String(a), Operand::String(b)) => a == b,
            (Operand::Number(a), Operand::Number(b)) => a == b,
            (Operand::Timestamp(a), Operand::Timestamp(b)) => a == b,
            (Operand::Enum(a), Operand::Enum(b)) => a == b,
            (Operand::Bool(a), Operand::Bool(b)) => a == b,
            (Operand::List(a), Operand::List(b)) => a == b,
            (Operand::Regex(a), Operand::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<Timestamp> for Operand {
    fn from(t: Timestamp) -> Self {
        Operand::Timestamp(t)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl From<Regex> for Operand {
    fn from(r: Regex) -> Self {
        Operand::Regex(r)
    }
}

impl<T: Into<Operand>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Operand::List(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! operand_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Operand {
                fn from(n: $source) -> Self {
                    Operand::Number(Number::from(n))
                }
            }
        )*
    };
}

operand_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kinds() {
        assert_eq!(Value::String("x").kind(), Some(FieldKind::String));
        assert_eq!(Value::Number(Number::I64(1)).kind(), Some(FieldKind::Number));
        assert_eq!(Value::Timestamp(Timestamp(0)).kind(), Some(FieldKind::Timestamp));
        assert_eq!(Value::Enum(3).kind(), Some(FieldKind::Enum));
        assert_eq!(Value::Bool(true).kind(), Some(FieldKind::Bool));
        assert_eq!(Value::None.kind(), None);
        assert!(Value::None.is_none());
    }

    #[test]
    fn value_extractors() {
        assert_eq!(Value::String("hello").as_str(), Some("hello"));
        assert_eq!(
            Value::Number(Number::I64(42)).as_number(),
            Some(Number::I64(42))
        );
        assert_eq!(
            Value::Timestamp(Timestamp(1000)).as_timestamp(),
            Some(Timestamp(1000))
        );
        assert_eq!(Value::Enum(5).as_enum(), Some(5));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));

        assert_eq!(Value::String("test").as_number(), None);
        assert_eq!(Value::Number(Number::I64(1)).as_str(), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(Number::I64(5).compare(Number::U64(10)), Some(Ordering::Less));
        assert_eq!(Number::I64(-1).compare(Number::U64(0)), Some(Ordering::Less));
        assert_eq!(Number::U64(0).compare(Number::I64(-1)), Some(Ordering::Greater));
        assert_eq!(Number::I64(5).compare(Number::F64(5.0)), Some(Ordering::Equal));
        assert_eq!(Number::U64(10).compare(Number::F64(5.5)), Some(Ordering::Greater));
    }

    #[test]
    fn number_large_unsigned_is_exact() {
        let big = Number::U64(u64::MAX);
        let almost = Number::U64(u64::MAX - 1);
        assert_eq!(almost.compare(big), Some(Ordering::Less));
        assert_eq!(Number::I64(i64::MAX).compare(big), Some(Ordering::Less));
    }

    #[test]
    fn number_mixed_int_float_is_exact() {
        // 2^53 + 1 has no f64 representation; a cast would make these equal.
        let odd = Number::I64(9_007_199_254_740_993);
        let even = Number::F64(9_007_199_254_740_992.0);
        assert_eq!(odd.compare(even), Some(Ordering::Greater));
        assert_eq!(even.compare(odd), Some(Ordering::Less));

        assert_eq!(Number::U64(u64::MAX).compare(Number::F64(TWO_POW_64)), Some(Ordering::Less));
        assert_eq!(Number::I64(i64::MIN).compare(Number::F64(-TWO_POW_63)), Some(Ordering::Equal));
        assert_eq!(Number::I64(-3).compare(Number::F64(-2.5)), Some(Ordering::Less));
        assert_eq!(Number::I64(-2).compare(Number::F64(-2.5)), Some(Ordering::Greater));
        assert_eq!(Number::U64(0).compare(Number::F64(-0.0)), Some(Ordering::Equal));
    }

    #[test]
    fn number_total_cmp_puts_nan_last() {
        let nan = Number::F64(f64::NAN);
        assert_eq!(nan.total_cmp(Number::F64(f64::INFINITY)), Ordering::Greater);
        assert_eq!(Number::I64(i64::MAX).total_cmp(nan), Ordering::Less);
        assert_eq!(nan.total_cmp(Number::U64(u64::MAX)), Ordering::Greater);
        assert_eq!(nan.total_cmp(nan), Ordering::Equal);
        assert_eq!(Number::F64(-0.0).total_cmp(Number::F64(0.0)), Ordering::Equal);

        let mut values = [
            Number::F64(2.5),
            nan,
            Number::I64(-1),
            Number::U64(2),
            Number::F64(f64::NEG_INFINITY),
        ];
        values.sort_by(|a, b| a.total_cmp(*b));
        assert_eq!(values[0], Number::F64(f64::NEG_INFINITY));
        assert_eq!(values[1], Number::I64(-1));
        assert_eq!(values[2], Number::U64(2));
        assert_eq!(values[3], Number::F64(2.5));
        assert!(values[4].is_nan());
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert_eq!(Number::I64(1).compare(Number::F64(f64::NAN)), None);
    }

    #[test]
    fn number_conversions() {
        assert_eq!(Number::from(42i32), Number::I64(42));
        assert_eq!(Number::from(42u32), Number::U64(42));
        assert_eq!(Number::from(42.5f64), Number::F64(42.5));
        assert_eq!(Number::from(7usize), Number::U64(7));
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(Timestamp::from_secs(1).as_millis(), 1000);
        assert_eq!(Timestamp::from_millis(5000).as_secs(), 5);
        assert!(Timestamp(1000) < Timestamp(2000));
    }

    #[test]
    fn operand_compare_value() {
        let age = Operand::from(21);
        assert_eq!(
            age.compare_value(&Value::Number(Number::U64(30))),
            Some(Ordering::Greater)
        );
        assert!(age.equals(&Value::Number(Number::F64(21.0))));
        assert_eq!(age.compare_value(&Value::String("21")), None);
        assert_eq!(age.compare_value(&Value::None), None);
    }

    #[test]
    fn operand_kinds_and_names() {
        assert_eq!(Operand::from("a").kind(), Some(FieldKind::String));
        assert_eq!(Operand::Enum(1).kind(), Some(FieldKind::Enum));
        assert_eq!(Operand::enums([1, 2]).kind(), None);
        assert_eq!(Operand::enums([1, 2]).type_name(), "list");
        assert_eq!(Operand::from(true).type_name(), "bool");
    }

    #[test]
    fn operand_structural_equality() {
        assert_eq!(Operand::from("a"), Operand::from("a".to_string()));
        assert_ne!(Operand::from("a"), Operand::from(1));
        assert_eq!(Operand::from(vec![1, 2]), Operand::from(vec![1, 2]));

        let a = Regex::new("^a").unwrap();
        let b = Regex::new("^a").unwrap();
        assert_eq!(Operand::from(a), Operand::from(b));
    }
}
