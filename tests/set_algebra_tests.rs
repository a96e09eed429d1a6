//! Unit tests for set algebra over the set families.

use deferra::deferred::{DeferredBTreeSet, DeferredHashSet};
use rstest::rstest;

// =============================================================================
// Union / Intersection / Difference
// =============================================================================

#[rstest]
fn test_union_contains_elements_of_either_set() {
    let union: DeferredHashSet<i32> = DeferredHashSet::of([1, 2, 3]).union(DeferredHashSet::of([2, 3, 4]));
    assert_eq!(union.len().unwrap(), 4);
    for element in [1, 2, 3, 4] {
        assert!(union.contains(&element).unwrap());
    }
}

#[rstest]
fn test_intersection_contains_elements_of_both_sets() {
    let intersection: DeferredHashSet<i32> = DeferredHashSet::of([1, 2, 3]).intersection(DeferredHashSet::of([2, 3, 4]));
    assert_eq!(intersection.len().unwrap(), 2);
    assert!(intersection.contains(&2).unwrap());
    assert!(intersection.contains(&3).unwrap());
    assert!(!intersection.contains(&1).unwrap());
}

#[rstest]
fn test_difference_contains_elements_of_left_only() {
    let difference: DeferredHashSet<i32> = DeferredHashSet::of([1, 2, 3]).difference(DeferredHashSet::of([2, 3, 4]));
    assert_eq!(difference.len().unwrap(), 1);
    assert!(difference.contains(&1).unwrap());
}

#[rstest]
fn test_symmetric_difference_contains_exclusive_elements() {
    let symmetric: DeferredHashSet<i32> =
        DeferredHashSet::of([1, 2, 3]).symmetric_difference(DeferredHashSet::of([2, 3, 4]));
    assert_eq!(symmetric.len().unwrap(), 2);
    assert!(symmetric.contains(&1).unwrap());
    assert!(symmetric.contains(&4).unwrap());
}

#[rstest]
fn test_union_with_empty_set_is_identity() {
    let union: DeferredHashSet<i32> = DeferredHashSet::of([1, 2]).union(DeferredHashSet::empty());
    assert_eq!(union.len().unwrap(), 2);
}

#[rstest]
fn test_intersection_with_disjoint_set_is_empty() {
    let intersection: DeferredHashSet<i32> = DeferredHashSet::of([1, 2]).intersection(DeferredHashSet::of([3, 4]));
    assert!(intersection.is_empty().unwrap());
}

// =============================================================================
// Laziness and Ordering
// =============================================================================

#[rstest]
fn test_set_algebra_defers_materialization() {
    let union: DeferredHashSet<i32> = DeferredHashSet::of([1]).union(DeferredHashSet::of([2]));
    assert!(!union.is_materialized());
    assert_eq!(union.len().unwrap(), 2);
}

#[rstest]
fn test_set_algebra_on_derived_collections() {
    let left: DeferredHashSet<i32> = DeferredHashSet::from_sequence(0..10)
        .filter(|value| value % 2 == 0);
    let right: DeferredHashSet<i32> = DeferredHashSet::from_sequence(0..10)
        .filter(|value| value % 3 == 0);
    let intersection = left.intersection(right);
    // Multiples of six below ten: 0 and 6.
    assert_eq!(intersection.len().unwrap(), 2);
    assert!(intersection.contains(&6).unwrap());
}

#[rstest]
fn test_btree_set_algebra_keeps_sorted_order() {
    let union = DeferredBTreeSet::of([3, 1]).union(DeferredBTreeSet::of([2]));
    assert_eq!(union.to_vec().unwrap(), vec![1, 2, 3]);

    let difference = DeferredBTreeSet::of([5, 1, 3]).difference(DeferredBTreeSet::of([3]));
    assert_eq!(difference.to_vec().unwrap(), vec![1, 5]);
}

#[rstest]
fn test_eager_set_algebra_materializes_immediately() {
    let union: DeferredHashSet<i32> = DeferredHashSet::of([1, 2])
        .eager()
        .union(DeferredHashSet::of([3]));
    assert!(union.is_materialized());
    assert_eq!(union.len().unwrap(), 3);
}
