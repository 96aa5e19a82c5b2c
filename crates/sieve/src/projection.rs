//! Projection of source records into a result shape.
//!
//! A [`ProjectionBuilder`] maps target members of `R` to expressions over
//! `T`. [`Projection`] holds either field mappings or a project-many
//! expression, never both.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SpecError};
use crate::record::{Assign, Record};
use crate::value::Value;

type SourceFn<T> = Arc<dyn for<'a> Fn(&'a T) -> Value<'a> + Send + Sync>;

struct FieldMapping<T> {
    target: String,
    source: SourceFn<T>,
}

impl<T> Clone for FieldMapping<T> {
    fn clone(&self) -> Self {
        FieldMapping {
            target: self.target.clone(),
            source: Arc::clone(&self.source),
        }
    }
}

/// A compiled `T -> R` transform.
pub struct Transform<T, R> {
    apply: Arc<dyn Fn(&T) -> R + Send + Sync>,
}

impl<T, R> Transform<T, R> {
    /// Wraps a closure.
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        Transform {
            apply: Arc::new(apply),
        }
    }

    /// Projects one record.
    pub fn apply(&self, item: &T) -> R {
        (self.apply)(item)
    }
}

impl<T, R> Clone for Transform<T, R> {
    fn clone(&self) -> Self {
        Transform {
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<T, R> fmt::Debug for Transform<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// A compiled `T -> [R]` flattening expression.
pub struct ProjectMany<T, R> {
    expand: Arc<dyn Fn(&T) -> Vec<R> + Send + Sync>,
}

impl<T, R> ProjectMany<T, R> {
    /// Wraps a closure.
    pub fn new<F>(expand: F) -> Self
    where
        F: Fn(&T) -> Vec<R> + Send + Sync + 'static,
    {
        ProjectMany {
            expand: Arc::new(expand),
        }
    }

    /// Produces zero or more results for one record.
    pub fn expand(&self, item: &T) -> Vec<R> {
        (self.expand)(item)
    }
}

impl<T, R> Clone for ProjectMany<T, R> {
    fn clone(&self) -> Self {
        ProjectMany {
            expand: Arc::clone(&self.expand),
        }
    }
}

impl<T, R> fmt::Debug for ProjectMany<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProjectMany(..)")
    }
}

/// Maps members of a result shape `R` to expressions over `T`.
///
/// Registering a target twice replaces the earlier mapping. Members without
/// a mapping keep their `Default` value.
pub struct ProjectionBuilder<T, R> {
    mappings: Vec<FieldMapping<T>>,
    _result: std::marker::PhantomData<fn() -> R>,
}

impl<T, R> ProjectionBuilder<T, R> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        ProjectionBuilder {
            mappings: Vec::new(),
            _result: std::marker::PhantomData,
        }
    }

    /// Returns the mapped target members in registration order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|m| m.target.as_str())
    }

    /// Returns the number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` if there are no mappings.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Removes the mapping for `target`.
    pub fn remove(&mut self, target: &str) -> bool {
        let before = self.mappings.len();
        self.mappings.retain(|m| m.target != target);
        self.mappings.len() != before
    }

    /// Removes every mapping.
    pub fn clear(&mut self) {
        self.mappings.clear();
    }
}

impl<T, R: Record> ProjectionBuilder<T, R> {
    /// Maps `target` to an expression over the source record.
    ///
    /// Fails if `target` is not a member of `R`.
    pub fn add<F>(&mut self, target: &str, source: F) -> Result<&mut Self>
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        if R::field_kind(target).is_none() {
            return Err(SpecError::UnknownField {
                field: target.to_string(),
            });
        }

        let mapping = FieldMapping {
            target: target.to_string(),
            source: Arc::new(source),
        };
        match self.mappings.iter_mut().find(|m| m.target == target) {
            Some(existing) => *existing = mapping,
            None => self.mappings.push(mapping),
        }
        Ok(self)
    }

    /// Maps `target` to the source field `source_field`.
    ///
    /// Both members must exist and have the same kind.
    pub fn copy(&mut self, target: &str, source_field: &str) -> Result<&mut Self>
    where
        T: Record + 'static,
    {
        let source_kind = T::field_kind(source_field).ok_or_else(|| SpecError::UnknownField {
            field: source_field.to_string(),
        })?;
        let target_kind = R::field_kind(target).ok_or_else(|| SpecError::UnknownField {
            field: target.to_string(),
        })?;
        if source_kind != target_kind {
            return Err(SpecError::TypeMismatch {
                field: target.to_string(),
                expected: target_kind.as_str(),
                actual: source_kind.as_str(),
            });
        }

        let source_field = source_field.to_string();
        self.add(target, move |item| item.field_value(&source_field))
    }
}

impl<T: 'static, R: Assign + Default + 'static> ProjectionBuilder<T, R> {
    /// Composes the mappings into one `T -> R` transform.
    ///
    /// An empty builder yields a transform producing `R::default()`; the
    /// pipeline rejects that case before building.
    pub fn build(&self) -> Transform<T, R> {
        let mappings = self.mappings.clone();
        Transform::new(move |item: &T| {
            let mut out = R::default();
            for mapping in &mappings {
                let value = (mapping.source)(item);
                if !out.assign(&mapping.target, value) {
                    debug!(target_member = %mapping.target, "projection value not assigned");
                }
            }
            out
        })
    }
}

impl<T, R> Default for ProjectionBuilder<T, R> {
    fn default() -> Self {
        ProjectionBuilder::new()
    }
}

impl<T, R> Clone for ProjectionBuilder<T, R> {
    fn clone(&self) -> Self {
        ProjectionBuilder {
            mappings: self.mappings.clone(),
            _result: std::marker::PhantomData,
        }
    }
}

impl<T, R> fmt::Debug for ProjectionBuilder<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.targets()).finish()
    }
}

/// How a projecting specification shapes its results.
pub enum Projection<T, R> {
    /// Nothing defined yet.
    None,
    /// Field-by-field mapping into `R`.
    Fields(ProjectionBuilder<T, R>),
    /// Zero or more `R` per source record.
    Many(ProjectMany<T, R>),
}

impl<T, R> Projection<T, R> {
    /// Returns `true` when no usable projection is defined.
    ///
    /// A field projection without mappings counts as undefined.
    pub fn is_undefined(&self) -> bool {
        match self {
            Projection::None => true,
            Projection::Fields(builder) => builder.is_empty(),
            Projection::Many(_) => false,
        }
    }
}

impl<T, R> Default for Projection<T, R> {
    fn default() -> Self {
        Projection::None
    }
}

impl<T, R> Clone for Projection<T, R> {
    fn clone(&self) -> Self {
        match self {
            Projection::None => Projection::None,
            Projection::Fields(builder) => Projection::Fields(builder.clone()),
            Projection::Many(expand) => Projection::Many(expand.clone()),
        }
    }
}

impl<T, R> fmt::Debug for Projection<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::None => f.write_str("None"),
            Projection::Fields(builder) => f.debug_tuple("Fields").field(builder).finish(),
            Projection::Many(_) => f.write_str("Many(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FieldKind, Number};

    struct Person {
        first: String,
        last: String,
        age: u8,
    }

    impl Record for Person {
        fn field_value(&self, path: &str) -> Value<'_> {
            match path {
                "first" => Value::String(&self.first),
                "last" => Value::String(&self.last),
                "age" => Value::Number(Number::from(self.age)),
                _ => Value::None,
            }
        }

        fn field_kind(path: &str) -> Option<FieldKind> {
            match path {
                "first" | "last" => Some(FieldKind::String),
                "age" => Some(FieldKind::Number),
                _ => None,
            }
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Card {
        label: String,
        years: u64,
        adult: bool,
    }

    impl Record for Card {
        fn field_value(&self, path: &str) -> Value<'_> {
            match path {
                "label" => Value::String(&self.label),
                "years" => Value::Number(Number::U64(self.years)),
                "adult" => Value::Bool(self.adult),
                _ => Value::None,
            }
        }

        fn field_kind(path: &str) -> Option<FieldKind> {
            match path {
                "label" => Some(FieldKind::String),
                "years" => Some(FieldKind::Number),
                "adult" => Some(FieldKind::Bool),
                _ => None,
            }
        }
    }

    impl Assign for Card {
        fn assign(&mut self, field: &str, value: Value<'_>) -> bool {
            match (field, value) {
                ("label", Value::String(s)) => self.label = s.to_string(),
                ("years", Value::Number(Number::U64(n))) => self.years = n,
                ("adult", Value::Bool(b)) => self.adult = b,
                _ => return false,
            }
            true
        }
    }

    fn ada() -> Person {
        Person {
            first: "Ada".to_string(),
            last: "Lovelace".to_string(),
            age: 36,
        }
    }

    #[test]
    fn build_populates_mapped_members() {
        let mut projection = ProjectionBuilder::<Person, Card>::new();
        projection
            .copy("label", "first")
            .unwrap()
            .add("adult", |p| Value::Bool(p.age >= 18))
            .unwrap();

        let card = projection.build().apply(&ada());
        assert_eq!(
            card,
            Card {
                label: "Ada".to_string(),
                years: 0,
                adult: true,
            }
        );
    }

    #[test]
    fn last_registration_wins() {
        let mut projection = ProjectionBuilder::<Person, Card>::new();
        projection
            .copy("label", "first")
            .unwrap()
            .add("years", |p| Value::Number(Number::from(p.age)))
            .unwrap()
            .copy("label", "last")
            .unwrap();

        assert_eq!(projection.len(), 2);
        assert_eq!(projection.targets().collect::<Vec<_>>(), vec!["label", "years"]);

        let card = projection.build().apply(&ada());
        assert_eq!(card.label, "Lovelace");
        assert_eq!(card.years, 36);
    }

    #[test]
    fn unassignable_values_leave_defaults() {
        let mut projection = ProjectionBuilder::<Person, Card>::new();
        projection.add("adult", |p| Value::String(&p.first)).unwrap();

        let card = projection.build().apply(&ada());
        assert_eq!(card, Card::default());
    }

    #[test]
    fn unknown_members_are_rejected() {
        let err = ProjectionBuilder::<Person, Card>::new()
            .add("nickname", |_| Value::None)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, SpecError::UnknownField { ref field } if field == "nickname"));

        let err = ProjectionBuilder::<Person, Card>::new()
            .copy("label", "middle")
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, SpecError::UnknownField { ref field } if field == "middle"));
    }

    #[test]
    fn copy_requires_matching_kinds() {
        let err = ProjectionBuilder::<Person, Card>::new()
            .copy("adult", "age")
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(
            err,
            SpecError::TypeMismatch { expected: "bool", actual: "number", .. }
        ));
    }

    #[test]
    fn remove_and_clear() {
        let mut projection = ProjectionBuilder::<Person, Card>::new();
        projection.copy("label", "first").unwrap();
        assert!(projection.remove("label"));
        assert!(!projection.remove("label"));
        projection.copy("label", "first").unwrap();
        projection.clear();
        assert!(projection.is_empty());
    }

    #[test]
    fn projection_definedness() {
        assert!(Projection::<Person, Card>::None.is_undefined());
        assert!(Projection::Fields(ProjectionBuilder::<Person, Card>::new()).is_undefined());
        let many = ProjectMany::new(|p: &Person| vec![p.age]);
        assert!(!Projection::Many(many.clone()).is_undefined());
        assert_eq!(many.expand(&ada()), vec![36]);
    }
}
