//! Sieve - data-source-agnostic query specifications.
//!
//! A [`Specification`] describes what subset, order, shape and page of a
//! collection to retrieve. It can be evaluated two ways:
//!
//! - folded through a [`SpecificationEvaluator`] over any [`QuerySource`]
//!   (an in-memory `Vec`, [`MemorySource`], or a backend that builds a query)
//! - checked against a single candidate with
//!   [`is_satisfied_by`](Specification::is_satisfied_by)
//!
//! # Quick Start
//!
//! ```rust
//! use sieve::{FieldKind, MemorySource, Number, Record, Specification, SpecificationEvaluator, Value};
//!
//! struct Task {
//!     name: String,
//!     priority: i32,
//!     archived: bool,
//! }
//!
//! impl Record for Task {
//!     fn field_value(&self, path: &str) -> Value<'_> {
//!         match path {
//!             "name" => Value::String(&self.name),
//!             "priority" => Value::Number(Number::from(self.priority)),
//!             "archived" => Value::Bool(self.archived),
//!             _ => Value::None,
//!         }
//!     }
//!
//!     fn field_kind(path: &str) -> Option<FieldKind> {
//!         match path {
//!             "name" => Some(FieldKind::String),
//!             "priority" => Some(FieldKind::Number),
//!             "archived" => Some(FieldKind::Bool),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let tasks = vec![
//!     Task { name: "Write docs".into(), priority: 3, archived: false },
//!     Task { name: "Fix bug".into(), priority: 5, archived: false },
//!     Task { name: "Old task".into(), priority: 1, archived: true },
//! ];
//!
//! let mut spec = Specification::<Task>::new();
//! spec.filter_mut()
//!     .and_gte("priority", 3)?
//!     .and_eq("archived", false)?;
//! spec.sort_mut().desc("priority")?;
//!
//! let results = SpecificationEvaluator::shared().list(MemorySource::new(tasks), &spec);
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].name, "Fix bug");
//! # Ok::<(), sieve::SpecError>(())
//! ```
//!
//! # Evaluation Order
//!
//! The default pipeline applies, in order:
//!
//! ```text
//! Filter -> Sort -> Search -> Pagination
//!        -> NoTracking -> SplitQuery -> IgnoreAutoIncludes -> IgnoreGlobalFilters
//! ```
//!
//! Every step is a no-op when its part of the specification is empty or
//! unset. Satisfaction checks and [`count`](SpecificationEvaluator::count)
//! run only Filter, Sort and Search.
//!
//! # Filter Semantics
//!
//! Criteria fold strictly left to right. Each criterion's [`Connective`]
//! joins it to everything before it, so `A, B(And), C(Or)` means
//! `(A && B) || C`. The first criterion's connective is ignored.
//!
//! | Kind | Operators |
//! |------|-----------|
//! | String | all, including `Contains`, `StartsWith`, `EndsWith`, `Matches` |
//! | Number | `Equal`, `NotEqual`, ordering, `In` |
//! | Timestamp | `Equal`, `NotEqual`, ordering, `In` |
//! | Enum | `Equal`, `NotEqual`, `In` |
//! | Bool | `Equal`, `NotEqual`, `In` |
//!
//! A missing value never matches any operator. Case sensitivity of the
//! pattern operators and of search follows the source's [`Collation`].

mod collation;
mod compiled;
mod error;
mod evaluator;
mod filter;
mod op;
mod paging;
mod pipeline;
mod projection;
mod record;
mod search;
mod sort;
mod source;
mod specification;
mod value;

pub use collation::Collation;
pub use compiled::{Comparator, Predicate};
pub use error::{Result, SpecError};
pub use evaluator::Evaluator;
pub use filter::{FilterBuilder, PredicateCriterion};
pub use op::{Connective, Operator};
pub use paging::{Page, Paging, PagingConfig};
pub use pipeline::SpecificationEvaluator;
pub use projection::{ProjectMany, Projection, ProjectionBuilder, Transform};
pub use record::{Assign, Discriminant, IntoTimestamp, Record};
pub use search::{MatchMode, SearchBuilder, SearchCriterion};
pub use sort::{compare_values, Direction, SortBuilder, SortCriterion};
pub use source::{Candidate, Materialize, MemorySource, Project, QueryHint, QuerySource};
pub use specification::{ProjectingSpecification, Specification};
pub use value::{FieldKind, Number, Operand, Timestamp, Value};

#[cfg(feature = "derive")]
pub use sieve_macros::Record;
