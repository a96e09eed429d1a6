//! Unit tests for value-level reducers and deferred folds.

use deferra::collector::reducers;
use deferra::deferred::DeferredVec;
use rstest::rstest;
use std::collections::VecDeque;

#[rstest]
fn test_joining_separates_elements() {
    let joined = reducers::joining::<i32>(" -> ").reduce([1, 2, 3]);
    assert_eq!(joined, "1 -> 2 -> 3");
}

#[rstest]
fn test_counting_and_summing() {
    assert_eq!(reducers::counting::<i32>().reduce([5, 5, 5]), 3);
    assert_eq!(reducers::summing::<i32>().reduce([5, 5, 5]), 15);
    assert_eq!(reducers::summing::<i32>().reduce([]), 0);
}

#[rstest]
fn test_family_reducers_build_their_collections() {
    let set = reducers::to_hash_set::<i32>().reduce([1, 1, 2]);
    assert_eq!(set.len(), 2);

    let ordered = reducers::to_btree_set::<i32>().reduce([3, 1, 2]);
    let elements: Vec<i32> = ordered.into_iter().collect();
    assert_eq!(elements, vec![1, 2, 3]);

    let queue = reducers::to_vec_deque::<i32>().reduce([1, 2]);
    assert_eq!(queue, VecDeque::from([1, 2]));

    assert_eq!(reducers::to_vec::<i32>().reduce([1, 2]), vec![1, 2]);
}

#[rstest]
fn test_reducer_identity_and_merge() {
    let reducer = reducers::to_vec::<i32>();
    assert!(reducer.identity().is_empty());

    let merged = reducer.combine(reducer.reduce([1]), reducer.reduce([2, 3]));
    assert_eq!(merged, vec![1, 2, 3]);
}

#[rstest]
fn test_fold_with_reduces_a_deferred_collection() {
    let numbers: DeferredVec<i32> = DeferredVec::of([1, 2, 3, 4]);
    assert_eq!(numbers.fold_with(&reducers::summing()).unwrap(), 10);
    assert_eq!(numbers.fold_with(&reducers::counting()).unwrap(), 4);
    assert_eq!(
        numbers.fold_with(&reducers::joining(",")).unwrap(),
        "1,2,3,4"
    );
}
