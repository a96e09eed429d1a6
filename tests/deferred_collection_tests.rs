//! Unit tests for the deferred collection core: construction entry points,
//! strategy control, and materialization.

use deferra::deferred::{Deferred, DeferredHashSet, DeferredVec, Evaluation};
use deferra::error::DeferredError;
use rstest::rstest;
use std::cell::Cell;
use std::rc::Rc;

fn counted_source(pulls: &Rc<Cell<usize>>, upper: i32) -> impl Iterator<Item = i32> + 'static {
    let pulls = Rc::clone(pulls);
    (0..upper).map(move |value| {
        pulls.set(pulls.get() + 1);
        value
    })
}

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn test_empty_has_no_elements() {
    let empty: DeferredVec<i32> = DeferredVec::empty();
    assert!(empty.is_empty().unwrap());
    assert_eq!(empty.len().unwrap(), 0);
}

#[rstest]
fn test_of_wraps_elements_lazily() {
    let collection: DeferredVec<i32> = DeferredVec::of([1, 2, 3]);
    assert!(!collection.is_materialized());
    assert_eq!(collection.to_vec().unwrap(), vec![1, 2, 3]);
}

#[rstest]
fn test_singleton_holds_one_element() {
    let collection: DeferredHashSet<i32> = DeferredHashSet::singleton(42);
    assert_eq!(collection.len().unwrap(), 1);
    assert!(collection.contains(&42).unwrap());
}

#[rstest]
fn test_from_concrete_wraps_without_deferring() {
    let collection: DeferredVec<i32> = DeferredVec::from_concrete(vec![5, 6]);
    assert!(collection.is_materialized());
    assert_eq!(collection.to_vec().unwrap(), vec![5, 6]);
}

#[rstest]
fn test_from_conversion_is_from_concrete() {
    let collection: DeferredVec<i32> = vec![1, 2].into();
    assert!(collection.is_materialized());
}

#[rstest]
fn test_collect_buffers_and_defers_the_fold() {
    let collection: DeferredHashSet<i32> = [1, 1, 2].into_iter().collect();
    assert!(!collection.is_materialized());
    assert_eq!(collection.len().unwrap(), 2);
}

#[rstest]
fn test_range_covers_half_open_interval() {
    let range: DeferredVec<i32> = DeferredVec::range(2, 5);
    assert_eq!(range.to_vec().unwrap(), vec![2, 3, 4]);

    let empty: DeferredVec<i32> = DeferredVec::range(5, 5);
    assert!(empty.is_empty().unwrap());
}

#[rstest]
fn test_range_long_covers_half_open_interval() {
    let range: DeferredVec<i64> = DeferredVec::range_long(-1, 2);
    assert_eq!(range.to_vec().unwrap(), vec![-1, 0, 1]);
}

#[rstest]
fn test_iterate_applies_function_up_to_limit() {
    let powers: DeferredVec<i32> = DeferredVec::iterate(5, 1, |value| value * 3);
    assert_eq!(powers.to_vec().unwrap(), vec![1, 3, 9, 27, 81]);
}

#[rstest]
fn test_generate_invokes_supplier_up_to_limit() {
    let calls = Rc::new(Cell::new(0));
    let supplier_calls = Rc::clone(&calls);
    let generated: DeferredVec<usize> = DeferredVec::generate(3, move || {
        supplier_calls.set(supplier_calls.get() + 1);
        supplier_calls.get()
    });
    assert_eq!(calls.get(), 0);
    assert_eq!(generated.to_vec().unwrap(), vec![1, 2, 3]);
    assert_eq!(calls.get(), 3);
}

#[rstest]
fn test_unfold_stops_on_none() {
    let collection: DeferredVec<i32> =
        DeferredVec::unfold(1, |seed| (seed <= 6).then(|| (seed, seed + 1)));
    assert_eq!(collection.to_vec().unwrap(), vec![1, 2, 3, 4, 5, 6]);
}

#[rstest]
fn test_defer_postpones_the_supplier() {
    let invoked = Rc::new(Cell::new(false));
    let observer = Rc::clone(&invoked);
    let collection: DeferredVec<i32> = DeferredVec::defer(move || {
        observer.set(true);
        DeferredVec::of([1, 2])
    });
    assert!(!invoked.get());
    assert_eq!(collection.len().unwrap(), 2);
    assert!(invoked.get());
}

// =============================================================================
// Strategy Control
// =============================================================================

#[rstest]
fn test_default_evaluation_is_lazy() {
    let collection: DeferredVec<i32> = DeferredVec::of([1]);
    assert_eq!(collection.evaluation(), Evaluation::Lazy);
}

#[rstest]
fn test_eager_switch_forces_immediately() {
    let pulls = Rc::new(Cell::new(0));
    let collection: DeferredVec<i32> =
        DeferredVec::from_sequence(counted_source(&pulls, 4)).eager();
    assert_eq!(pulls.get(), 4);
    assert_eq!(collection.evaluation(), Evaluation::Eager);
    assert!(collection.is_materialized());
}

#[rstest]
fn test_lazy_switch_restores_deferral() {
    let pulls = Rc::new(Cell::new(0));
    let collection: DeferredVec<i32> = DeferredVec::from_sequence(counted_source(&pulls, 4))
        .eager()
        .lazy()
        .map(|value| value + 1);
    // The eager switch forced the source; the lazy derivation afterwards
    // composes without re-forcing.
    assert_eq!(pulls.get(), 4);
    assert!(!collection.is_materialized());
    assert_eq!(collection.len().unwrap(), 4);
}

#[rstest]
fn test_derived_collection_inherits_strategy() {
    let eager: DeferredVec<i32> = DeferredVec::of([1, 2]).eager();
    let derived: DeferredVec<i32> = eager.map(|value| value * 2);
    assert_eq!(derived.evaluation(), Evaluation::Eager);
    assert!(derived.is_materialized());
}

// =============================================================================
// Materialization
// =============================================================================

#[rstest]
fn test_force_pulls_the_sequence_exactly_once() {
    let pulls = Rc::new(Cell::new(0));
    let collection: DeferredVec<i32> = DeferredVec::from_sequence(counted_source(&pulls, 5));

    assert_eq!(pulls.get(), 0);
    collection.force().unwrap();
    assert_eq!(pulls.get(), 5);

    // Repeated forcing and querying reuse the memoized result.
    collection.force().unwrap();
    assert_eq!(collection.len().unwrap(), 5);
    assert_eq!(collection.to_vec().unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(pulls.get(), 5);
}

#[rstest]
fn test_queries_force_under_lazy_strategy() {
    let pulls = Rc::new(Cell::new(0));
    let collection: DeferredVec<i32> = DeferredVec::from_sequence(counted_source(&pulls, 3));
    assert!(collection.contains(&2).unwrap());
    assert_eq!(pulls.get(), 3);
}

#[rstest]
fn test_failed_sequence_pins_the_failure() {
    let collection: DeferredVec<i32> = Deferred::from_try_sequence(
        [Ok(1), Err(DeferredError::message("socket reset")), Ok(2)].into_iter(),
    );

    let first = collection.len().unwrap_err();
    assert!(format!("{first}").contains("socket reset"));

    // The failed state is terminal; the cause is re-raised, not retried.
    let second = collection.to_vec().unwrap_err();
    assert!(format!("{second}").contains("socket reset"));
}

#[rstest]
fn test_into_concrete_returns_the_materialized_collection() {
    let collection: DeferredHashSet<i32> = DeferredHashSet::of([1, 2, 2]);
    let concrete = collection.into_concrete().unwrap();
    assert_eq!(concrete.len(), 2);
}

#[rstest]
fn test_into_iterator_yields_fallible_items() {
    let collection: DeferredVec<i32> = DeferredVec::of([1, 2]);
    let items: Result<Vec<i32>, DeferredError> = collection.into_iter().collect();
    assert_eq!(items.unwrap(), vec![1, 2]);
}

#[rstest]
fn test_try_eq_forces_both_sides() {
    let left: DeferredVec<i32> = DeferredVec::of([1, 2]);
    let right: DeferredVec<i32> = DeferredVec::from_concrete(vec![1, 2]);
    assert!(left.try_eq(&right).unwrap());

    let different: DeferredVec<i32> = DeferredVec::of([9]);
    assert!(!left.try_eq(&different).unwrap());
}

#[rstest]
fn test_try_clone_is_independent() {
    let original: DeferredVec<i32> = DeferredVec::of([1, 2]);
    let clone = original.try_clone().unwrap();
    let extended = clone.plus(3);
    assert_eq!(original.len().unwrap(), 2);
    assert_eq!(extended.len().unwrap(), 3);
}

#[rstest]
fn test_debug_does_not_force() {
    let collection: DeferredVec<i32> = DeferredVec::of([1, 2]);
    let rendered = format!("{collection:?}");
    assert!(rendered.contains("sequence"));
    assert!(!collection.is_materialized());
}

#[rstest]
fn test_force_now_refuses_unresolved_promise() {
    let (collection, completer) = DeferredVec::<i32>::completable();
    assert!(matches!(
        collection.force_now(),
        Err(DeferredError::Unsupported { .. })
    ));

    completer.complete(vec![1, 2]);
    collection.force_now().unwrap();
    assert_eq!(collection.len_now().unwrap(), 2);
}
