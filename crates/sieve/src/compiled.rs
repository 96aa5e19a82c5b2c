//! Compiled, immutable artefacts produced by the builders.
//!
//! Both types wrap an `Arc`'d closure, so cloning is cheap and a compiled
//! value can be shared across threads evaluating the same specification.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A compiled boolean test over records of type `T`.
pub struct Predicate<T> {
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Predicate<T> {
    /// Wraps a closure.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Predicate {
            test: Arc::new(test),
        }
    }

    /// Returns a predicate that accepts every record.
    pub fn always() -> Self
    where
        T: 'static,
    {
        Predicate::new(|_| true)
    }

    /// Tests a record.
    pub fn matches(&self, item: &T) -> bool {
        (self.test)(item)
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Predicate {
            test: Arc::clone(&self.test),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A compiled multi-key ordering over records of type `T`.
///
/// Apply it with a stable sort (`slice::sort_by`) so that records with
/// equal keys keep their input order.
pub struct Comparator<T> {
    compare: Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>,
}

impl<T> Comparator<T> {
    /// Wraps a closure.
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Comparator {
            compare: Arc::new(compare),
        }
    }

    /// Orders two records.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    /// Stable-sorts a slice in place.
    pub fn sort(&self, items: &mut [T]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

impl<T> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        Comparator {
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Comparator(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_matches() {
        let even = Predicate::new(|n: &i32| n % 2 == 0);
        let shared = even.clone();

        assert!(Predicate::<i32>::always().matches(&7));
        assert!(even.matches(&12));
        assert!(!shared.matches(&5));
    }

    #[test]
    fn comparator_sort_is_stable() {
        let by_key = Comparator::new(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        let mut items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        by_key.sort(&mut items);
        assert_eq!(items, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }
}
