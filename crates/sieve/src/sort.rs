//! Sort criteria and the sort builder.
//!
//! Provides [`Direction`], [`SortCriterion`] and [`SortBuilder`], which
//! compiles its criteria into a stable multi-key [`Comparator`].

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::compiled::Comparator;
use crate::error::{Result, SpecError};
use crate::record::Record;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl Direction {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ordering rule.
///
/// `position` ranks the criterion among its siblings: the lowest position
/// is the primary key and the rest break ties in ascending position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriterion {
    /// The field path to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: Direction,
    /// Rank among the sort criteria.
    pub position: usize,
}

impl SortCriterion {
    /// Creates a criterion at the given position.
    pub fn new(field: impl Into<String>, direction: Direction, position: usize) -> Self {
        SortCriterion {
            field: field.into(),
            direction,
            position,
        }
    }

    /// Compares two field values according to this criterion.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Ordering {
        self.direction.apply(compare_values(a, b))
    }
}

/// Total order over field values.
///
/// Values of one kind compare naturally, with NaN after every other number.
/// Values of different kinds are ranked by [`FieldKind`](crate::FieldKind) declaration order.
/// Missing values sort last in ascending order.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),

        (Value::None, Value::None) => Ordering::Equal,
        (Value::None, _) => Ordering::Greater,
        (_, Value::None) => Ordering::Less,

        _ => a.kind().cmp(&b.kind()),
    }
}

/// Compares two records with criteria already sorted by position.
///
/// The first criterion is the primary key; later ones only break ties.
fn compare_records<T: Record>(a: &T, b: &T, criteria: &[SortCriterion]) -> Ordering {
    for criterion in criteria {
        let val_a = a.field_value(&criterion.field);
        let val_b = b.field_value(&criterion.field);

        let ordering = criterion.compare(&val_a, &val_b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Ordered collection of sort criteria over records of type `T`.
pub struct SortBuilder<T> {
    criteria: Vec<SortCriterion>,
    _record: PhantomData<fn(&T)>,
}

impl<T> SortBuilder<T> {
    /// Creates an empty builder; it imposes no ordering.
    pub fn new() -> Self {
        SortBuilder {
            criteria: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Returns the criteria in insertion order.
    pub fn criteria(&self) -> &[SortCriterion] {
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
    pub fn remove(&mut self, criterion: &SortCriterion) -> bool {
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

    /// Returns the criteria ranked by position, ties in insertion order.
    pub fn ranked(&self) -> Vec<SortCriterion> {
        let mut ranked = self.criteria.clone();
        ranked.sort_by_key(|c| c.position);
        ranked
    }

    fn next_position(&self) -> usize {
        self.criteria
            .iter()
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0)
    }
}

impl<T: Record> SortBuilder<T> {
    /// Validates and appends a criterion.
    ///
    /// Fails if the field does not resolve or is already sorted on.
    pub fn add(&mut self, criterion: SortCriterion) -> Result<&mut Self> {
        if T::field_kind(&criterion.field).is_none() {
            return Err(SpecError::UnknownField {
                field: criterion.field,
            });
        }
        if self.criteria.iter().any(|c| c.field == criterion.field) {
            return Err(SpecError::DuplicateSortField {
                field: criterion.field,
            });
        }
        self.criteria.push(criterion);
        Ok(self)
    }

    /// Appends a criterion after every existing one.
    pub fn order_by(&mut self, field: &str, direction: Direction) -> Result<&mut Self> {
        let position = self.next_position();
        self.add(SortCriterion::new(field, direction, position))
    }

    /// Appends an ascending criterion.
    pub fn asc(&mut self, field: &str) -> Result<&mut Self> {
        self.order_by(field, Direction::Ascending)
    }

    /// Appends a descending criterion.
    pub fn desc(&mut self, field: &str) -> Result<&mut Self> {
        self.order_by(field, Direction::Descending)
    }

    /// Compiles the criteria into a multi-key comparator.
    ///
    /// Returns `None` for an empty builder: no ordering is imposed and the
    /// source keeps its natural order.
    pub fn compile(&self) -> Option<Comparator<T>>
    where
        T: 'static,
    {
        if self.criteria.is_empty() {
            return None;
        }
        let ranked = self.ranked();
        Some(Comparator::new(move |a: &T, b: &T| {
            compare_records(a, b, &ranked)
        }))
    }
}

impl<T> Default for SortBuilder<T> {
    fn default() -> Self {
        SortBuilder::new()
    }
}

impl<T> Clone for SortBuilder<T> {
    fn clone(&self) -> Self {
        SortBuilder {
            criteria: self.criteria.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SortBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortBuilder")
            .field("criteria", &self.criteria)
            .finish()
    }
}
