//! Free-text search across string fields.
//!
//! Every [`SearchCriterion`] in a [`SearchBuilder`] is OR-combined, so a
//! single pattern can be searched across several columns. Per-field AND
//! filtering belongs in the [`FilterBuilder`](crate::FilterBuilder).

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::collation::Collation;
use crate::compiled::Predicate;
use crate::error::{Result, SpecError};
use crate::record::Record;
use crate::value::{FieldKind, Value};

/// Where in the field a search pattern must occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// Anywhere in the field.
    #[default]
    Contains,
    /// At the start of the field.
    StartsWith,
    /// At the end of the field.
    EndsWith,
}

/// A pattern match over one string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriterion {
    /// The string field path to search.
    pub field: String,
    /// The text to look for.
    pub pattern: String,
    /// Where the pattern must occur.
    pub mode: MatchMode,
}

impl SearchCriterion {
    /// Creates a `Contains` search criterion.
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        SearchCriterion {
            field: field.into(),
            pattern: pattern.into(),
            mode: MatchMode::Contains,
        }
    }

    /// Replaces the match mode.
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns `true` if the field value matches the pattern.
    ///
    /// Non-string and missing values never match.
    pub fn matches(&self, field_value: &Value<'_>, collation: Collation) -> bool {
        let Some(text) = field_value.as_str() else {
            return false;
        };
        match self.mode {
            MatchMode::Contains => collation.contains(text, &self.pattern),
            MatchMode::StartsWith => collation.starts_with(text, &self.pattern),
            MatchMode::EndsWith => collation.ends_with(text, &self.pattern),
        }
    }
}

/// Ordered collection of search criteria over records of type `T`.
pub struct SearchBuilder<T> {
    criteria: Vec<SearchCriterion>,
    _record: PhantomData<fn(&T)>,
}

impl<T> SearchBuilder<T> {
    /// Creates an empty builder; it compiles to an always-true predicate.
    pub fn new() -> Self {
        SearchBuilder {
            criteria: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Returns the criteria in insertion order.
    pub fn criteria(&self) -> &[SearchCriterion] {
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
    pub fn remove(&mut self, criterion: &SearchCriterion) -> bool {
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

impl<T: Record> SearchBuilder<T> {
    /// Validates and appends a criterion.
    ///
    /// The field must resolve to a string member.
    pub fn add(&mut self, criterion: SearchCriterion) -> Result<&mut Self> {
        match T::field_kind(&criterion.field) {
            None => Err(SpecError::UnknownField {
                field: criterion.field,
            }),
            Some(FieldKind::String) => {
                self.criteria.push(criterion);
                Ok(self)
            }
            Some(kind) => Err(SpecError::TypeMismatch {
                field: criterion.field,
                expected: FieldKind::String.as_str(),
                actual: kind.as_str(),
            }),
        }
    }

    /// Appends a `Contains` search of `pattern` over `field`.
    pub fn search(&mut self, field: &str, pattern: &str) -> Result<&mut Self> {
        self.add(SearchCriterion::new(field, pattern))
    }

    /// Appends a `Contains` search of `pattern` over each of `fields`.
    pub fn search_all(&mut self, fields: &[&str], pattern: &str) -> Result<&mut Self> {
        for field in fields {
            self.search(field, pattern)?;
        }
        Ok(self)
    }

    /// OR-combines every criterion into one predicate.
    ///
    /// An empty builder compiles to an always-true predicate.
    pub fn compile(&self, collation: Collation) -> Predicate<T>
    where
        T: 'static,
    {
        if self.criteria.is_empty() {
            return Predicate::always();
        }
        let criteria = self.criteria.clone();
        Predicate::new(move |item: &T| {
            criteria
                .iter()
                .any(|c| c.matches(&item.field_value(&c.field), collation))
        })
    }
}

impl<T> Default for SearchBuilder<T> {
    fn default() -> Self {
        SearchBuilder::new()
    }
}

impl<T> Clone for SearchBuilder<T> {
    fn clone(&self) -> Self {
        SearchBuilder {
            criteria: self.criteria.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SearchBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchBuilder")
            .field("criteria", &self.criteria)
            .finish()
    }
}
