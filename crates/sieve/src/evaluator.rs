//! The closed set of evaluators.
//!
//! Each variant applies one concern of a [`Specification`] to a
//! [`QuerySource`] and is a no-op when that concern is left at its default.
//! Evaluators hold no state and never mutate the specification.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::Record;
use crate::source::{QueryHint, QuerySource};
use crate::specification::Specification;

/// One step of the evaluation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Evaluator {
    /// Narrows to records accepted by the filter builder.
    Filter,
    /// Applies the multi-key sort.
    Sort,
    /// Narrows to records matching any search criterion.
    Search,
    /// Applies skip, then take.
    Pagination,
    NoTracking,
    SplitQuery,
    IgnoreAutoIncludes,
    IgnoreGlobalFilters,
}

impl Evaluator {
    /// The default pipeline order.
    ///
    /// Search follows Filter so it narrows already-filtered records, and
    /// Pagination is the last content step. The hint steps only affect how
    /// the backend executes.
    pub const DEFAULT_ORDER: [Evaluator; 8] = [
        Evaluator::Filter,
        Evaluator::Sort,
        Evaluator::Search,
        Evaluator::Pagination,
        Evaluator::NoTracking,
        Evaluator::SplitQuery,
        Evaluator::IgnoreAutoIncludes,
        Evaluator::IgnoreGlobalFilters,
    ];

    /// Returns `true` for the steps used by satisfaction checks and counts.
    pub fn is_criteria(self) -> bool {
        matches!(self, Evaluator::Filter | Evaluator::Sort | Evaluator::Search)
    }

    /// Returns `true` if this step would change `source` for `spec`.
    pub fn is_active<T>(self, spec: &Specification<T>) -> bool {
        match self {
            Evaluator::Filter => !spec.filter().is_empty(),
            Evaluator::Sort => !spec.sort().is_empty(),
            Evaluator::Search => !spec.search().is_empty(),
            Evaluator::Pagination => !spec.paging().is_unset(),
            Evaluator::NoTracking => spec.no_tracking,
            Evaluator::SplitQuery => spec.split_query,
            Evaluator::IgnoreAutoIncludes => spec.ignore_auto_includes,
            Evaluator::IgnoreGlobalFilters => spec.ignore_global_filters,
        }
    }

    /// Applies this step.
    pub fn apply<T, S>(self, source: S, spec: &Specification<T>) -> S
    where
        T: Record + 'static,
        S: QuerySource<T>,
    {
        if !self.is_active(spec) {
            return source;
        }

        match self {
            Evaluator::Filter => {
                let predicate = spec.filter().compile(source.collation());
                source.filter(&predicate)
            }
            Evaluator::Sort => match spec.sort().compile() {
                Some(comparator) => source.order_by(&comparator),
                None => source,
            },
            Evaluator::Search => {
                let predicate = spec.search().compile(source.collation());
                source.filter(&predicate)
            }
            Evaluator::Pagination => {
                let paging = spec.paging();
                let source = if paging.skip > 0 {
                    source.skip(paging.skip)
                } else {
                    source
                };
                match paging.take {
                    Some(take) if take > 0 => source.take(take),
                    _ => source,
                }
            }
            Evaluator::NoTracking => source.apply_hint(QueryHint::NoTracking),
            Evaluator::SplitQuery => source.apply_hint(QueryHint::SplitQuery),
            Evaluator::IgnoreAutoIncludes => source.apply_hint(QueryHint::IgnoreAutoIncludes),
            Evaluator::IgnoreGlobalFilters => {
                debug!("global filters bypassed for this query");
                source.apply_hint(QueryHint::IgnoreGlobalFilters)
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Evaluator::Filter => "filter",
            Evaluator::Sort => "sort",
            Evaluator::Search => "search",
            Evaluator::Pagination => "pagination",
            Evaluator::NoTracking => "no_tracking",
            Evaluator::SplitQuery => "split_query",
            Evaluator::IgnoreAutoIncludes => "ignore_auto_includes",
            Evaluator::IgnoreGlobalFilters => "ignore_global_filters",
        }
    }
}

impl fmt::Display for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
