//! The queryable-sequence capability the pipeline folds through.
//!
//! A backend implements [`QuerySource`] (narrow, reorder, skip, take, hint),
//! [`Project`] (reshape) and [`Materialize`] (count, collect). `Vec<T>` and
//! [`MemorySource`] are the in-memory backends; [`Candidate`] is the
//! single-element source used by the satisfaction check.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collation::Collation;
use crate::compiled::{Comparator, Predicate};
use crate::projection::{ProjectMany, Transform};

/// Backend execution hints derived from a specification's behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryHint {
    /// Do not track loaded records for change detection.
    NoTracking,
    /// Fetch nested collections with separate queries.
    SplitQuery,
    /// Skip the backend's default eager loads.
    IgnoreAutoIncludes,
    /// Skip ambient row-level filters such as soft-delete or tenant scoping.
    IgnoreGlobalFilters,
}

impl QueryHint {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryHint::NoTracking => "no_tracking",
            QueryHint::SplitQuery => "split_query",
            QueryHint::IgnoreAutoIncludes => "ignore_auto_includes",
            QueryHint::IgnoreGlobalFilters => "ignore_global_filters",
        }
    }
}

impl fmt::Display for QueryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sequence of `T` that can be narrowed, reordered and sliced.
///
/// Every step consumes the source and returns the next one, so a backend
/// can accumulate a query instead of touching data.
pub trait QuerySource<T>: Sized {
    /// Keeps only records accepted by `predicate`.
    fn filter(self, predicate: &Predicate<T>) -> Self;

    /// Stable-sorts by `comparator`.
    fn order_by(self, comparator: &Comparator<T>) -> Self;

    /// Drops the first `n` records.
    fn skip(self, n: usize) -> Self;

    /// Keeps at most `n` records.
    fn take(self, n: usize) -> Self;

    /// How this backend compares strings for pattern operators.
    fn collation(&self) -> Collation {
        Collation::Ordinal
    }

    /// Applies an execution hint. Backends without the concept ignore it.
    fn apply_hint(self, _hint: QueryHint) -> Self {
        self
    }
}

/// A source that can reshape its records.
pub trait Project<T>: QuerySource<T> {
    /// The source type after projection to `R`.
    type Output<R>;

    /// Maps each record to one `R`.
    fn select<R>(self, transform: &Transform<T, R>) -> Self::Output<R>;

    /// Maps each record to zero or more `R`, flattened.
    fn select_many<R>(self, expand: &ProjectMany<T, R>) -> Self::Output<R>;
}

/// A source whose records can be counted and collected.
pub trait Materialize<T> {
    fn count(&self) -> usize;

    fn into_vec(self) -> Vec<T>;
}

impl<T> QuerySource<T> for Vec<T> {
    fn filter(mut self, predicate: &Predicate<T>) -> Self {
        self.retain(|item| predicate.matches(item));
        self
    }

    fn order_by(mut self, comparator: &Comparator<T>) -> Self {
        comparator.sort(&mut self);
        self
    }

    fn skip(mut self, n: usize) -> Self {
        self.drain(..n.min(self.len()));
        self
    }

    fn take(mut self, n: usize) -> Self {
        self.truncate(n);
        self
    }
}

impl<T> Project<T> for Vec<T> {
    type Output<R> = Vec<R>;

    fn select<R>(self, transform: &Transform<T, R>) -> Vec<R> {
        self.iter().map(|item| transform.apply(item)).collect()
    }

    fn select_many<R>(self, expand: &ProjectMany<T, R>) -> Vec<R> {
        self.iter().flat_map(|item| expand.expand(item)).collect()
    }
}

impl<T> Materialize<T> for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }

    fn into_vec(self) -> Vec<T> {
        self
    }
}

/// In-memory backend with a configurable collation.
///
/// Records every hint it receives, in order, so callers can observe how a
/// specification's flags reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySource<T> {
    items: Vec<T>,
    collation: Collation,
    hints: Vec<QueryHint>,
}

impl<T> MemorySource<T> {
    /// Creates an ordinal (case-sensitive) source.
    pub fn new(items: Vec<T>) -> Self {
        MemorySource {
            items,
            collation: Collation::Ordinal,
            hints: Vec::new(),
        }
    }

    /// Replaces the collation used for string pattern operators.
    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Hints applied so far.
    pub fn hints(&self) -> &[QueryHint] {
        &self.hints
    }

    fn map_items<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> MemorySource<U> {
        MemorySource {
            items: f(self.items),
            collation: self.collation,
            hints: self.hints,
        }
    }
}

impl<T> QuerySource<T> for MemorySource<T> {
    fn filter(self, predicate: &Predicate<T>) -> Self {
        self.map_items(|items| items.filter(predicate))
    }

    fn order_by(self, comparator: &Comparator<T>) -> Self {
        self.map_items(|items| items.order_by(comparator))
    }

    fn skip(self, n: usize) -> Self {
        self.map_items(|items| QuerySource::skip(items, n))
    }

    fn take(self, n: usize) -> Self {
        self.map_items(|items| QuerySource::take(items, n))
    }

    fn collation(&self) -> Collation {
        self.collation
    }

    fn apply_hint(mut self, hint: QueryHint) -> Self {
        self.hints.push(hint);
        self
    }
}

impl<T> Project<T> for MemorySource<T> {
    type Output<R> = MemorySource<R>;

    fn select<R>(self, transform: &Transform<T, R>) -> MemorySource<R> {
        self.map_items(|items| items.select(transform))
    }

    fn select_many<R>(self, expand: &ProjectMany<T, R>) -> MemorySource<R> {
        self.map_items(|items| items.select_many(expand))
    }
}

impl<T> Materialize<T> for MemorySource<T> {
    fn count(&self) -> usize {
        self.items.len()
    }

    fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<Vec<T>> for MemorySource<T> {
    fn from(items: Vec<T>) -> Self {
        MemorySource::new(items)
    }
}

impl<T> FromIterator<T> for MemorySource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        MemorySource::new(iter.into_iter().collect())
    }
}

/// A borrowed one-element sequence.
///
/// Filtering can only empty it and ordering leaves it unchanged, so a
/// candidate needs no `Clone` to be evaluated.
#[derive(Debug)]
pub struct Candidate<'a, T> {
    item: Option<&'a T>,
    collation: Collation,
}

impl<'a, T> Candidate<'a, T> {
    pub fn new(item: &'a T, collation: Collation) -> Self {
        Candidate {
            item: Some(item),
            collation,
        }
    }

    /// Returns `true` if the candidate survived every step so far.
    pub fn is_present(&self) -> bool {
        self.item.is_some()
    }
}

impl<T> QuerySource<T> for Candidate<'_, T> {
    fn filter(mut self, predicate: &Predicate<T>) -> Self {
        self.item = self.item.filter(|item| predicate.matches(item));
        self
    }

    fn order_by(self, _comparator: &Comparator<T>) -> Self {
        self
    }

    fn skip(mut self, n: usize) -> Self {
        if n > 0 {
            self.item = None;
        }
        self
    }

    fn take(mut self, n: usize) -> Self {
        if n == 0 {
            self.item = None;
        }
        self
    }

    fn collation(&self) -> Collation {
        self.collation
    }
}
