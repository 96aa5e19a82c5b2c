//! Predicate criteria and the filter builder.
//!
//! A [`PredicateCriterion`] is a single condition: a field path, an
//! operator, an operand and the connective joining it to the criteria
//! before it. A [`FilterBuilder`] keeps criteria in insertion order and
//! compiles them into one [`Predicate`] by folding left to right.

use std::fmt;
use std::marker::PhantomData;

use regex::Regex;

use crate::collation::Collation;
use crate::compiled::Predicate;
use crate::error::{Result, SpecError};
use crate::op::{Connective, Operator};
use crate::record::Record;
use crate::value::{FieldKind, Operand, Timestamp, Value};

/// A single filter condition.
///
/// # Example
///
/// ```
/// use sieve::{Connective, Operator, PredicateCriterion};
///
/// let adult = PredicateCriterion::new("age", Operator::GreaterOrEqual, 21);
/// let reno = PredicateCriterion::new("city", Operator::Equal, "Reno").with_connective(Connective::Or);
/// assert_eq!(reno.connective, Connective::Or);
/// # let _ = adult;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateCriterion {
    /// The field path to compare.
    pub field: String,
    /// The comparison operator.
    pub op: Operator,
    /// The value to compare against.
    pub value: Operand,
    /// How this criterion joins the criteria before it.
    pub connective: Connective,
}

impl PredicateCriterion {
    /// Creates a criterion joined with `And`.
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Operand>) -> Self {
        PredicateCriterion {
            field: field.into(),
            op,
            value: value.into(),
            connective: Connective::And,
        }
    }

    /// Replaces the connective.
    pub fn with_connective(mut self, connective: Connective) -> Self {
        self.connective = connective;
        self
    }

    /// Checks the criterion against the schema of `T`.
    ///
    /// Fails when the field does not resolve, the operator does not apply to
    /// the field's kind, or the operand has the wrong type.
    pub fn validate<T: Record>(&self) -> Result<()> {
        let kind = T::field_kind(&self.field).ok_or_else(|| SpecError::UnknownField {
            field: self.field.clone(),
        })?;

        if !self.op.accepts(kind) {
            return Err(SpecError::InvalidOperatorForType {
                field: self.field.clone(),
                op: self.op.as_str(),
                kind: kind.as_str(),
            });
        }

        match (self.op, &self.value) {
            (Operator::In, Operand::List(items)) => items
                .iter()
                .try_for_each(|item| self.expect_kind(kind, item)),
            (Operator::In, other) => Err(self.mismatch("list", other)),
            (Operator::Matches, Operand::Regex(_)) => Ok(()),
            (Operator::Matches, other) => Err(self.mismatch("regex", other)),
            (_, Operand::Regex(_)) => Err(self.mismatch(kind.as_str(), &self.value)),
            (_, value) => self.expect_kind(kind, value),
        }
    }

    fn expect_kind(&self, kind: FieldKind, value: &Operand) -> Result<()> {
        if value.kind() == Some(kind) && !matches!(value, Operand::Regex(_)) {
            Ok(())
        } else {
            Err(self.mismatch(kind.as_str(), value))
        }
    }

    fn mismatch(&self, expected: &'static str, actual: &Operand) -> SpecError {
        SpecError::TypeMismatch {
            field: self.field.clone(),
            expected,
            actual: actual.type_name(),
        }
    }

    /// Evaluates this criterion against a field value.
    ///
    /// A missing field ([`Value::None`]) never matches, not even `NotEqual`.
    /// String operators follow `collation`; equality stays ordinal.
    pub fn matches(&self, field_value: &Value<'_>, collation: Collation) -> bool {
        if field_value.is_none() {
            return false;
        }

        match (self.op, &self.value) {
            (Operator::In, Operand::List(items)) => items.iter().any(|item| item.equals(field_value)),
            (Operator::Matches, Operand::Regex(regex)) => {
                field_value.as_str().is_some_and(|s| regex.is_match(s))
            }
            (Operator::Contains, Operand::String(pattern)) => field_value
                .as_str()
                .is_some_and(|s| collation.contains(s, pattern)),
            (Operator::StartsWith, Operand::String(pattern)) => field_value
                .as_str()
                .is_some_and(|s| collation.starts_with(s, pattern)),
            (Operator::EndsWith, Operand::String(pattern)) => field_value
                .as_str()
                .is_some_and(|s| collation.ends_with(s, pattern)),
            (op, operand) => operand
                .compare_value(field_value)
                .is_some_and(|ordering| op.eval_ordering(ordering)),
        }
    }
}

impl fmt::Display for PredicateCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.field, self.op, self.value)
    }
}

/// Ordered collection of predicate criteria over records of type `T`.
///
/// # Example
///
/// ```
/// use sieve::{Collation, FieldKind, FilterBuilder, Number, Record, Value};
///
/// struct Person {
///     age: u8,
/// }
///
/// impl Record for Person {
///     fn field_value(&self, path: &str) -> Value<'_> {
///         match path {
///             "age" => Value::Number(Number::from(self.age)),
///             _ => Value::None,
///         }
///     }
///
///     fn field_kind(path: &str) -> Option<FieldKind> {
///         (path == "age").then_some(FieldKind::Number)
///     }
/// }
///
/// let mut filter = FilterBuilder::<Person>::new();
/// filter.and_gte("age", 21)?.or_eq("age", 18)?;
///
/// let predicate = filter.compile(Collation::Ordinal);
/// assert!(predicate.matches(&Person { age: 18 }));
/// assert!(!predicate.matches(&Person { age: 19 }));
/// # Ok::<(), sieve::SpecError>(())
/// ```
pub struct FilterBuilder<T> {
    criteria: Vec<PredicateCriterion>,
    _record: PhantomData<fn(&T)>,
}

impl<T> FilterBuilder<T> {
    /// Creates an empty builder; it compiles to an always-true predicate.
    pub fn new() -> Self {
        FilterBuilder {
            criteria: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Returns the criteria in insertion order.
    pub fn criteria(&self) -> &[PredicateCriterion] {
        &self.criteria
    }

    /// Returns the number of criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns `true` if there are no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Removes the first criterion structurally equal to `criterion`.
    ///
    /// Returns `true` if one was removed.
    pub fn remove(&mut self, criterion: &PredicateCriterion) -> bool {
        match self.criteria.iter().position(|c| c == criterion) {
            Some(index) => {
                self.criteria.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every criterion.
    pub fn clear(&mut self) {
        self.criteria.clear();
    }
}

impl<T: Record> FilterBuilder<T> {
    /// Validates and appends a criterion.
    pub fn add(&mut self, criterion: PredicateCriterion) -> Result<&mut Self> {
        criterion.validate::<T>()?;
        self.criteria.push(criterion);
        Ok(self)
    }

    // ========================================================================
    // Generic criterion builders
    // ========================================================================

    /// Appends a criterion joined with `And`.
    pub fn and(&mut self, field: &str, op: Operator, value: impl Into<Operand>) -> Result<&mut Self> {
        self.add(PredicateCriterion::new(field, op, value))
    }

    /// Appends a criterion joined with `Or`.
    pub fn or(&mut self, field: &str, op: Operator, value: impl Into<Operand>) -> Result<&mut Self> {
        self.add(PredicateCriterion::new(field, op, value).with_connective(Connective::Or))
    }

    // ========================================================================
    // AND shorthand methods
    // ========================================================================

    /// Appends an `And` equality criterion.
    pub fn and_eq(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.and(field, Operator::Equal, value)
    }

    /// Appends an `And` not-equal criterion.
    pub fn and_ne(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.and(field, Operator::NotEqual, value)
    }

    /// Appends an `And` greater-than criterion.
    pub fn and_gt(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.and(field, Operator::GreaterThan, value)
    }

    /// Appends an `And` greater-than-or-equal criterion.
    pub fn and_gte(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.and(field, Operator::GreaterOrEqual, value)
    }

    /// Appends an `And` less-than criterion.
    pub fn and_lt(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.and(field, Operator::LessThan, value)
    }

    /// Appends an `And` less-than-or-equal criterion.
    pub fn and_lte(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.and(field, Operator::LessOrEqual, value)
    }

    /// Appends an `And` substring criterion.
    pub fn and_contains(&mut self, field: &str, value: &str) -> Result<&mut Self> {
        self.and(field, Operator::Contains, value)
    }

    /// Appends an `And` prefix criterion.
    pub fn and_starts_with(&mut self, field: &str, value: &str) -> Result<&mut Self> {
        self.and(field, Operator::StartsWith, value)
    }

    /// Appends an `And` suffix criterion.
    pub fn and_ends_with(&mut self, field: &str, value: &str) -> Result<&mut Self> {
        self.and(field, Operator::EndsWith, value)
    }

    /// Appends an `And` set-membership criterion.
    pub fn and_in<I, V>(&mut self, field: &str, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        let set = Operand::List(values.into_iter().map(Into::into).collect());
        self.and(field, Operator::In, set)
    }

    /// Appends an `And` regular-expression criterion.
    ///
    /// Returns an error if the pattern is invalid.
    pub fn and_matches(&mut self, field: &str, pattern: &str) -> Result<&mut Self> {
        let regex = Regex::new(pattern)?;
        self.and(field, Operator::Matches, regex)
    }

    /// Appends an `And` timestamp-before criterion.
    pub fn and_before(&mut self, field: &str, ts: Timestamp) -> Result<&mut Self> {
        self.and(field, Operator::LessThan, ts)
    }

    /// Appends an `And` timestamp-after criterion.
    pub fn and_after(&mut self, field: &str, ts: Timestamp) -> Result<&mut Self> {
        self.and(field, Operator::GreaterThan, ts)
    }

    // ========================================================================
    // OR shorthand methods
    // ========================================================================

    /// Appends an `Or` equality criterion.
    pub fn or_eq(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.or(field, Operator::Equal, value)
    }

    /// Appends an `Or` not-equal criterion.
    pub fn or_ne(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.or(field, Operator::NotEqual, value)
    }

    /// Appends an `Or` greater-than-or-equal criterion.
    pub fn or_gte(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.or(field, Operator::GreaterOrEqual, value)
    }

    /// Appends an `Or` less-than-or-equal criterion.
    pub fn or_lte(&mut self, field: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.or(field, Operator::LessOrEqual, value)
    }

    /// Appends an `Or` substring criterion.
    pub fn or_contains(&mut self, field: &str, value: &str) -> Result<&mut Self> {
        self.or(field, Operator::Contains, value)
    }

    /// Appends an `Or` set-membership criterion.
    pub fn or_in<I, V>(&mut self, field: &str, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        let set = Operand::List(values.into_iter().map(Into::into).collect());
        self.or(field, Operator::In, set)
    }

    // ========================================================================
    // Compile
    // ========================================================================

    /// Folds the criteria left to right into one predicate.
    ///
    /// The first criterion seeds the fold; each later criterion joins the
    /// accumulated predicate through its own connective. There is no
    /// precedence grouping. An empty builder compiles to an always-true
    /// predicate. Compiling is pure and may be repeated.
    pub fn compile(&self, collation: Collation) -> Predicate<T>
    where
        T: 'static,
    {
        let Some((seed, rest)) = self.criteria.split_first() else {
            return Predicate::always();
        };

        let seed = seed.clone();
        let rest = rest.to_vec();
        Predicate::new(move |item: &T| {
            let mut matched = seed.matches(&item.field_value(&seed.field), collation);
            for criterion in &rest {
                matched = criterion.connective.combine(matched, || {
                    criterion.matches(&item.field_value(&criterion.field), collation)
                });
            }
            matched
        })
    }
}

impl<T> Default for FilterBuilder<T> {
    fn default() -> Self {
        FilterBuilder::new()
    }
}

impl<T> Clone for FilterBuilder<T> {
    fn clone(&self) -> Self {
        FilterBuilder {
            criteria: self.criteria.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for FilterBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBuilder")
            .field("criteria", &self.criteria)
            .finish()
    }
}
