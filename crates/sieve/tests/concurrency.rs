//! A finished specification and its compiled artefacts are shared across
//! threads for concurrent evaluation.

use std::thread;

use sieve::{
    Collation, Comparator, FieldKind, Number, Predicate, ProjectingSpecification, Record,
    Specification, SpecificationEvaluator, Value,
};

#[derive(Debug, Clone, PartialEq)]
struct Order {
    id: u32,
    customer: String,
    total: f64,
}

impl Record for Order {
    fn field_value(&self, path: &str) -> Value<'_> {
        match path {
            "id" => Value::Number(Number::from(self.id)),
            "customer" => Value::String(&self.customer),
            "total" => Value::Number(Number::F64(self.total)),
            _ => Value::None,
        }
    }

    fn field_kind(path: &str) -> Option<FieldKind> {
        match path {
            "id" | "total" => Some(FieldKind::Number),
            "customer" => Some(FieldKind::String),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Summary;

fn assert_send_sync<T: Send + Sync>() {}

fn orders() -> Vec<Order> {
    (0..200u32)
        .map(|id| Order {
            id,
            customer: format!("customer-{}", id % 7),
            total: if id % 11 == 0 {
                f64::NAN
            } else {
                f64::from(id % 13) * 2.5
            },
        })
        .collect()
}

#[test]
fn shared_types_are_send_and_sync() {
    assert_send_sync::<Specification<Order>>();
    assert_send_sync::<ProjectingSpecification<Order, Summary>>();
    assert_send_sync::<SpecificationEvaluator>();
    assert_send_sync::<Predicate<Order>>();
    assert_send_sync::<Comparator<Order>>();
}

#[test]
fn one_specification_serves_many_threads() {
    let mut spec = Specification::<Order>::new();
    spec.filter_mut().and_gte("total", 5.0).unwrap();
    spec.search_mut().search("customer", "-3").unwrap();
    spec.sort_mut().desc("total").unwrap().asc("id").unwrap();
    spec.set_page(1, 10);

    let spec = &spec;
    let pipeline = SpecificationEvaluator::shared();
    let expected: Vec<u32> = pipeline.list(orders(), spec).iter().map(|o| o.id).collect();
    assert!(!expected.is_empty());

    let results: Vec<Vec<u32>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(move || {
                    let listed = SpecificationEvaluator::shared().list(orders(), spec);
                    listed.iter().map(|o| o.id).collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    });

    for ids in results {
        assert_eq!(ids, expected);
    }
}

#[test]
fn compiled_artefacts_are_shared_across_threads() {
    let mut spec = Specification::<Order>::new();
    spec.filter_mut().and_lt("id", 50u32).unwrap();
    spec.sort_mut().asc("total").unwrap();

    let predicate = spec.filter().compile(Collation::Ordinal);
    let comparator = spec.sort().compile().unwrap();

    let expected = {
        let mut kept: Vec<Order> = orders().into_iter().filter(|o| predicate.matches(o)).collect();
        comparator.sort(&mut kept);
        kept
    };

    thread::scope(|scope| {
        for _ in 0..4 {
            let predicate = predicate.clone();
            let comparator = &comparator;
            let expected = &expected;
            scope.spawn(move || {
                let mut kept: Vec<Order> =
                    orders().into_iter().filter(|o| predicate.matches(o)).collect();
                comparator.sort(&mut kept);
                let ids: Vec<u32> = kept.iter().map(|o| o.id).collect();
                let want: Vec<u32> = expected.iter().map(|o| o.id).collect();
                assert_eq!(ids, want);
            });
        }
    });
}
