//! Comparison operators and logical connectives for predicate criteria.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::FieldKind;

/// Comparison operator for a predicate criterion.
///
/// - **Equality**: `Equal`, `NotEqual` - every kind
/// - **Ordering**: `GreaterThan`, `GreaterOrEqual`, `LessThan`, `LessOrEqual` -
///   orderable kinds only (string, number, timestamp)
/// - **String**: `Contains`, `StartsWith`, `EndsWith`, `Matches`
/// - **Membership**: `In` - every kind, against a list operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equal (exact match).
    Equal,
    /// Not equal.
    NotEqual,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal.
    LessOrEqual,
    /// String contains substring.
    Contains,
    /// String starts with prefix.
    StartsWith,
    /// String ends with suffix.
    EndsWith,
    /// Value is one of the given set.
    In,
    /// String matches a regular expression.
    Matches,
}

impl Operator {
    /// Returns `true` for the `GreaterThan`/`LessThan` family.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterOrEqual
                | Operator::LessThan
                | Operator::LessOrEqual
        )
    }

    /// Returns `true` for operators that only apply to string fields.
    pub fn is_string_only(self) -> bool {
        matches!(
            self,
            Operator::Contains | Operator::StartsWith | Operator::EndsWith | Operator::Matches
        )
    }

    /// Returns `true` if this operator can be applied to a field of `kind`.
    pub fn accepts(self, kind: FieldKind) -> bool {
        if self.is_string_only() {
            kind == FieldKind::String
        } else if self.is_ordering() {
            kind.is_orderable()
        } else {
            true
        }
    }

    /// Evaluates an equality or ordering operator given how the field value
    /// orders against the operand.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterOrEqual => ordering != Ordering::Less,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "eq",
            Operator::NotEqual => "ne",
            Operator::GreaterThan => "gt",
            Operator::GreaterOrEqual => "gte",
            Operator::LessThan => "lt",
            Operator::LessOrEqual => "lte",
            Operator::Contains => "contains",
            Operator::StartsWith => "startswith",
            Operator::EndsWith => "endswith",
            Operator::In => "in",
            Operator::Matches => "matches",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a criterion joins the criteria before it.
///
/// Chains fold strictly left to right: `A, B(And), C(Or)` is
/// `(A and B) or C`. The connective of the first criterion is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Connective {
    /// Both sides must hold.
    #[default]
    And,
    /// Either side may hold.
    Or,
}

impl Connective {
    /// Joins the accumulated result with the next criterion.
    ///
    /// `right` is only evaluated when it can change the outcome.
    pub fn combine(self, left: bool, right: impl FnOnce() -> bool) -> bool {
        match self {
            Connective::And => left && right(),
            Connective::Or => left || right(),
        }
    }

    /// Returns the display name of this connective.
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
