//! The specification aggregate.
//!
//! A [`Specification`] owns the filter, sort and search builders, paging
//! state, four backend behavior flags and an optional post-processing step.
//! [`ProjectingSpecification`] adds exactly one projection mode on top.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::error::{Result, SpecError};
use crate::filter::FilterBuilder;
use crate::paging::{Paging, PagingConfig};
use crate::pipeline::SpecificationEvaluator;
use crate::projection::{ProjectMany, Projection, ProjectionBuilder};
use crate::record::Record;
use crate::search::SearchBuilder;
use crate::sort::SortBuilder;

type PostProcess<T> = Arc<dyn Fn(Vec<T>) -> Vec<T> + Send + Sync>;

/// What subset, order and page of a collection of `T` to retrieve.
///
/// ```
/// use sieve::{FieldKind, MemorySource, Number, Record, Specification, SpecificationEvaluator, Value};
///
/// struct User {
///     id: u32,
///     age: u32,
/// }
///
/// impl Record for User {
///     fn field_value(&self, path: &str) -> Value<'_> {
///         match path {
///             "id" => Value::Number(Number::from(self.id)),
///             "age" => Value::Number(Number::from(self.age)),
///             _ => Value::None,
///         }
///     }
///
///     fn field_kind(path: &str) -> Option<FieldKind> {
///         match path {
///             "id" | "age" => Some(FieldKind::Number),
///             _ => None,
///         }
///     }
/// }
///
/// let mut spec = Specification::<User>::new();
/// spec.filter_mut().and_gte("age", 21).unwrap();
/// spec.sort_mut().asc("age").unwrap();
/// spec.set_page(1, 2);
///
/// let users = vec![
///     User { id: 1, age: 30 },
///     User { id: 2, age: 20 },
///     User { id: 3, age: 25 },
/// ];
/// let ids: Vec<u32> = SpecificationEvaluator::shared()
///     .list(MemorySource::new(users), &spec)
///     .iter()
///     .map(|u| u.id)
///     .collect();
/// assert_eq!(ids, vec![3, 1]);
/// ```
pub struct Specification<T> {
    filter: FilterBuilder<T>,
    sort: SortBuilder<T>,
    search: SearchBuilder<T>,
    paging: Paging,
    config: PagingConfig,
    post_process: Option<PostProcess<T>>,
    /// Ask the backend not to track loaded records.
    pub no_tracking: bool,
    /// Ask the backend to fetch nested collections separately.
    pub split_query: bool,
    /// Ask the backend to skip its default eager loads.
    pub ignore_auto_includes: bool,
    /// Ask the backend to skip ambient row-level filters.
    ///
    /// The engine does not authorize this. Gate it upstream before letting
    /// untrusted input set it.
    pub ignore_global_filters: bool,
}

impl<T> Specification<T> {
    /// Creates an empty specification with default paging configuration.
    pub fn new() -> Self {
        Specification::with_config(PagingConfig::default())
    }

    pub fn with_config(config: PagingConfig) -> Self {
        Specification {
            filter: FilterBuilder::new(),
            sort: SortBuilder::new(),
            search: SearchBuilder::new(),
            paging: Paging::default(),
            config,
            post_process: None,
            no_tracking: false,
            split_query: false,
            ignore_auto_includes: false,
            ignore_global_filters: false,
        }
    }

    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    pub fn filter(&self) -> &FilterBuilder<T> {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterBuilder<T> {
        &mut self.filter
    }

    pub fn sort(&self) -> &SortBuilder<T> {
        &self.sort
    }

    pub fn sort_mut(&mut self) -> &mut SortBuilder<T> {
        &mut self.sort
    }

    pub fn search(&self) -> &SearchBuilder<T> {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchBuilder<T> {
        &mut self.search
    }

    /// Selects a 1-based page.
    ///
    /// A page number of zero is treated as 1. A page size of zero becomes
    /// the configured default, and sizes above the configured maximum are
    /// clamped.
    pub fn set_page(&mut self, page_number: usize, page_size: usize) -> &mut Self {
        let page_number = page_number.max(1);
        let page_size = self.config.normalize_page_size(page_size);
        self.paging = Paging {
            skip: (page_number - 1).saturating_mul(page_size),
            take: Some(page_size),
        };
        self
    }

    /// Sets the number of leading records to drop.
    pub fn set_skip(&mut self, skip: usize) -> &mut Self {
        self.paging.skip = skip;
        self
    }

    /// Sets the maximum number of records to return.
    ///
    /// Zero is rejected; use [`clear_paging`](Self::clear_paging) to remove
    /// the limit.
    pub fn set_take(&mut self, take: usize) -> Result<&mut Self> {
        if take == 0 {
            return Err(SpecError::InvalidPaging("take must be positive"));
        }
        self.paging.take = Some(take);
        Ok(self)
    }

    pub fn clear_paging(&mut self) -> &mut Self {
        self.paging = Paging::default();
        self
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn skip(&self) -> usize {
        self.paging.skip
    }

    pub fn take(&self) -> Option<usize> {
        self.paging.take
    }

    /// The 1-based page implied by skip/take, if a take is set.
    pub fn page_number(&self) -> Option<usize> {
        self.paging.take.map(|take| self.paging.skip / take + 1)
    }

    pub fn page_size(&self) -> Option<usize> {
        self.paging.take
    }

    /// Sets a transform applied to materialized results.
    ///
    /// The pipeline's `list` and `page` run it after paging.
    pub fn set_post_process<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
    {
        self.post_process = Some(Arc::new(f));
        self
    }

    pub fn clear_post_process(&mut self) -> &mut Self {
        self.post_process = None;
        self
    }

    /// Applies the post-processing transform, if any.
    pub fn post_process(&self, items: Vec<T>) -> Vec<T> {
        match &self.post_process {
            Some(f) => f(items),
            None => items,
        }
    }

    /// Returns `true` if any criteria builder has entries.
    pub fn has_criteria(&self) -> bool {
        !(self.filter.is_empty() && self.sort.is_empty() && self.search.is_empty())
    }
}

impl<T: Record + 'static> Specification<T> {
    /// Returns `true` if `candidate` would appear under this specification.
    ///
    /// Only filter, sort and search apply; paging and behavior flags are
    /// skipped. String operators compare ordinally.
    pub fn is_satisfied_by(&self, candidate: &T) -> bool {
        SpecificationEvaluator::shared().is_satisfied_by(candidate, self)
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Specification::new()
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Specification {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            search: self.search.clone(),
            paging: self.paging,
            config: self.config,
            post_process: self.post_process.clone(),
            no_tracking: self.no_tracking,
            split_query: self.split_query,
            ignore_auto_includes: self.ignore_auto_includes,
            ignore_global_filters: self.ignore_global_filters,
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("search", &self.search)
            .field("paging", &self.paging)
            .field("post_process", &self.post_process.is_some())
            .field("no_tracking", &self.no_tracking)
            .field("split_query", &self.split_query)
            .field("ignore_auto_includes", &self.ignore_auto_includes)
            .field("ignore_global_filters", &self.ignore_global_filters)
            .finish()
    }
}

/// A specification whose results are reshaped into `R`.
///
/// Dereferences to the inner [`Specification`], so builders, paging and
/// flags are reached the same way.
pub struct ProjectingSpecification<T, R> {
    inner: Specification<T>,
    projection: Projection<T, R>,
}

impl<T, R> ProjectingSpecification<T, R> {
    pub fn new() -> Self {
        ProjectingSpecification::from_spec(Specification::new())
    }

    /// Wraps an existing specification with no projection yet.
    pub fn from_spec(inner: Specification<T>) -> Self {
        ProjectingSpecification {
            inner,
            projection: Projection::None,
        }
    }

    pub fn projection(&self) -> &Projection<T, R> {
        &self.projection
    }

    /// Returns the field projection builder, creating it if needed.
    ///
    /// Fails with [`SpecError::ProjectionAmbiguity`] if a project-many
    /// expression is already set.
    pub fn select(&mut self) -> Result<&mut ProjectionBuilder<T, R>> {
        if let Projection::None = self.projection {
            self.projection = Projection::Fields(ProjectionBuilder::new());
        }
        match &mut self.projection {
            Projection::Fields(builder) => Ok(builder),
            _ => Err(SpecError::ProjectionAmbiguity),
        }
    }

    /// Sets the project-many expression.
    ///
    /// Fails with [`SpecError::ProjectionAmbiguity`] if field mappings are
    /// already registered. Replaces an earlier project-many expression.
    pub fn select_many<F>(&mut self, expand: F) -> Result<&mut Self>
    where
        F: Fn(&T) -> Vec<R> + Send + Sync + 'static,
    {
        if let Projection::Fields(builder) = &self.projection {
            if !builder.is_empty() {
                return Err(SpecError::ProjectionAmbiguity);
            }
        }
        self.projection = Projection::Many(ProjectMany::new(expand));
        Ok(self)
    }

    pub fn clear_projection(&mut self) -> &mut Self {
        self.projection = Projection::None;
        self
    }

    pub fn into_inner(self) -> Specification<T> {
        self.inner
    }
}

impl<T, R: Record> ProjectingSpecification<T, R> {
    /// Maps `target` on `R` to the source field `source_field`.
    pub fn select_field(&mut self, target: &str, source_field: &str) -> Result<&mut Self>
    where
        T: Record + 'static,
    {
        self.select()?.copy(target, source_field)?;
        Ok(self)
    }
}

impl<T, R> Deref for ProjectingSpecification<T, R> {
    type Target = Specification<T>;

    fn deref(&self) -> &Specification<T> {
        &self.inner
    }
}

impl<T, R> DerefMut for ProjectingSpecification<T, R> {
    fn deref_mut(&mut self) -> &mut Specification<T> {
        &mut self.inner
    }
}

impl<T, R> Default for ProjectingSpecification<T, R> {
    fn default() -> Self {
        ProjectingSpecification::new()
    }
}

impl<T, R> Clone for ProjectingSpecification<T, R> {
    fn clone(&self) -> Self {
        ProjectingSpecification {
            inner: self.inner.clone(),
            projection: self.projection.clone(),
        }
    }
}

impl<T, R> fmt::Debug for ProjectingSpecification<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectingSpecification")
            .field("inner", &self.inner)
            .field("projection", &self.projection)
            .finish()
    }
}
