//! Folding a specification through the evaluator chain.

use std::borrow::Cow;

use tracing::{debug, instrument, trace};

use crate::collation::Collation;
use crate::error::{Result, SpecError};
use crate::evaluator::Evaluator;
use crate::paging::Page;
use crate::projection::Projection;
use crate::record::{Assign, Record};
use crate::source::{Candidate, Materialize, Project, QuerySource};
use crate::specification::{ProjectingSpecification, Specification};

static DEFAULT_PIPELINE: SpecificationEvaluator = SpecificationEvaluator {
    evaluators: Cow::Borrowed(&Evaluator::DEFAULT_ORDER),
};

/// An ordered composition of [`Evaluator`]s.
///
/// The default order is Filter, Sort, Search, Pagination, then the four
/// hint steps. [`shared`](Self::shared) returns a process-wide instance of
/// that pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecificationEvaluator {
    evaluators: Cow<'static, [Evaluator]>,
}

impl SpecificationEvaluator {
    /// Builds a pipeline from a custom ordered list of steps.
    pub fn new(evaluators: Vec<Evaluator>) -> Self {
        SpecificationEvaluator {
            evaluators: Cow::Owned(evaluators),
        }
    }

    /// The shared default pipeline.
    pub fn shared() -> &'static SpecificationEvaluator {
        &DEFAULT_PIPELINE
    }

    pub fn evaluators(&self) -> &[Evaluator] {
        &self.evaluators
    }

    /// Folds `source` through every step.
    ///
    /// A missing specification returns `source` unchanged.
    #[instrument(skip_all, fields(steps = self.evaluators.len()))]
    pub fn evaluate<'s, T, S>(&self, source: S, spec: impl Into<Option<&'s Specification<T>>>) -> S
    where
        T: Record + 'static,
        S: QuerySource<T>,
    {
        match spec.into() {
            Some(spec) => self.fold(source, spec, |_| true),
            None => {
                trace!("no specification, passing source through");
                source
            }
        }
    }

    /// Evaluates, then reshapes the results with the specification's
    /// projection.
    ///
    /// Fails with [`SpecError::NoProjection`] before touching the source if
    /// no projection is defined.
    #[instrument(skip_all, fields(steps = self.evaluators.len()))]
    pub fn evaluate_projection<T, R, S>(
        &self,
        source: S,
        spec: &ProjectingSpecification<T, R>,
    ) -> Result<S::Output<R>>
    where
        T: Record + 'static,
        R: Assign + Default + 'static,
        S: Project<T>,
    {
        if spec.projection().is_undefined() {
            return Err(SpecError::NoProjection);
        }

        let source = self.fold(source, &**spec, |_| true);
        match spec.projection() {
            Projection::Fields(builder) => {
                trace!(mappings = builder.len(), "projecting fields");
                Ok(source.select(&builder.build()))
            }
            Projection::Many(expand) => {
                trace!("projecting many");
                Ok(source.select_many(expand))
            }
            Projection::None => Err(SpecError::NoProjection),
        }
    }

    /// Returns `true` if `candidate` survives the criteria steps.
    ///
    /// Paging and hint steps are skipped. String operators compare
    /// ordinally.
    pub fn is_satisfied_by<T>(&self, candidate: &T, spec: &Specification<T>) -> bool
    where
        T: Record + 'static,
    {
        self.is_satisfied_by_with_collation(candidate, spec, Collation::Ordinal)
    }

    /// Like [`is_satisfied_by`](Self::is_satisfied_by), with string
    /// operators compiled against `collation`.
    pub fn is_satisfied_by_with_collation<T>(
        &self,
        candidate: &T,
        spec: &Specification<T>,
        collation: Collation,
    ) -> bool
    where
        T: Record + 'static,
    {
        if !spec.has_criteria() {
            return true;
        }
        let candidate = Candidate::new(candidate, collation);
        self.fold(candidate, spec, Evaluator::is_criteria).is_present()
    }

    /// Evaluates and collects, then applies the post-processing step.
    #[instrument(skip_all)]
    pub fn list<T, S>(&self, source: S, spec: &Specification<T>) -> Vec<T>
    where
        T: Record + 'static,
        S: QuerySource<T> + Materialize<T>,
    {
        let items = self.evaluate(source, spec).into_vec();
        debug!(count = items.len(), "listed records");
        spec.post_process(items)
    }

    /// Counts the records the criteria steps keep, ignoring paging.
    #[instrument(skip_all)]
    pub fn count<T, S>(&self, source: S, spec: &Specification<T>) -> usize
    where
        T: Record + 'static,
        S: QuerySource<T> + Materialize<T>,
    {
        let count = self.fold(source, spec, Evaluator::is_criteria).count();
        debug!(count, "counted records");
        count
    }

    /// Evaluates into a [`Page`].
    ///
    /// The total is taken just before the pagination step, then the page is
    /// sliced and post-processed.
    #[instrument(skip_all)]
    pub fn page<T, S>(&self, source: S, spec: &Specification<T>) -> Page<T>
    where
        T: Record + 'static,
        S: QuerySource<T> + Materialize<T>,
    {
        let mut total_count = None;
        let mut source = source;
        for evaluator in self.evaluators.iter().copied() {
            if evaluator == Evaluator::Pagination && total_count.is_none() {
                total_count = Some(source.count());
            }
            source = self.step(evaluator, source, spec);
        }

        let items = source.into_vec();
        let total_count = total_count.unwrap_or(items.len());
        let page = Page {
            page_number: spec.page_number().unwrap_or(1),
            page_size: spec.page_size().unwrap_or(total_count),
            total_count,
            items: spec.post_process(items),
        };
        debug!(
            total_count = page.total_count,
            page_number = page.page_number,
            page_size = page.page_size,
            "paged records"
        );
        page
    }

    fn fold<T, S>(&self, source: S, spec: &Specification<T>, include: fn(Evaluator) -> bool) -> S
    where
        T: Record + 'static,
        S: QuerySource<T>,
    {
        self.evaluators
            .iter()
            .copied()
            .filter(|evaluator| include(*evaluator))
            .fold(source, |source, evaluator| self.step(evaluator, source, spec))
    }

    fn step<T, S>(&self, evaluator: Evaluator, source: S, spec: &Specification<T>) -> S
    where
        T: Record + 'static,
        S: QuerySource<T>,
    {
        if evaluator.is_active(spec) {
            trace!(evaluator = evaluator.as_str(), "applying evaluator");
        }
        evaluator.apply(source, spec)
    }
}

impl Default for SpecificationEvaluator {
    fn default() -> Self {
        DEFAULT_PIPELINE.clone()
    }
}
