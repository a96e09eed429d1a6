//! Property-based tests for the deferred collection laws.

use deferra::collector::Collector;
use deferra::deferred::{DeferredHashSet, DeferredVec};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Round-Trip Law
// Description: Materializing a deferred collection preserves the multiset
// of elements for a duplicate-preserving family
// =============================================================================

proptest! {
    #[test]
    fn prop_vec_round_trip_preserves_multiset(
        elements in prop::collection::vec(any::<i32>(), 0..50)
    ) {
        let deferred: DeferredVec<i32> = DeferredVec::of(elements.clone());
        let mut observed = deferred.to_vec().unwrap();
        let mut expected = elements;
        observed.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(observed, expected);
    }
}

proptest! {
    #[test]
    fn prop_hash_set_round_trip_matches_std_fold(
        elements in prop::collection::vec(any::<i32>(), 0..50)
    ) {
        let deferred: DeferredHashSet<i32> = DeferredHashSet::of(elements.clone());
        let expected: HashSet<i32> = elements.into_iter().collect();
        prop_assert_eq!(deferred.into_concrete().unwrap(), expected);
    }
}

// =============================================================================
// Collector Laws
// Description: combine is associative with empty as identity
// =============================================================================

proptest! {
    #[test]
    fn prop_collector_combine_is_associative(
        first in prop::collection::vec(any::<i32>(), 0..20),
        second in prop::collection::vec(any::<i32>(), 0..20),
        third in prop::collection::vec(any::<i32>(), 0..20)
    ) {
        let left = first.clone().combine(second.clone()).combine(third.clone());
        let right = first.combine(second.combine(third));
        prop_assert_eq!(left, right);
    }
}

proptest! {
    #[test]
    fn prop_collector_empty_is_identity(
        elements in prop::collection::vec(any::<i32>(), 0..20)
    ) {
        let left = Vec::<i32>::empty().combine(elements.clone());
        let right = elements.clone().combine(Vec::<i32>::empty());
        prop_assert_eq!(&left, &elements);
        prop_assert_eq!(&right, &elements);
    }
}

// =============================================================================
// Set Algebra Laws
// Description: union/intersection/difference agree with the standard
// library's set operations
// =============================================================================

proptest! {
    #[test]
    fn prop_set_algebra_matches_std(
        left in prop::collection::hash_set(any::<i16>(), 0..30),
        right in prop::collection::hash_set(any::<i16>(), 0..30)
    ) {
        let union = DeferredHashSet::from_concrete(left.clone())
            .union(DeferredHashSet::from_concrete(right.clone()));
        let expected_union: HashSet<i16> = left.union(&right).copied().collect();
        prop_assert_eq!(union.into_concrete().unwrap(), expected_union);

        let intersection = DeferredHashSet::from_concrete(left.clone())
            .intersection(DeferredHashSet::from_concrete(right.clone()));
        let expected_intersection: HashSet<i16> =
            left.intersection(&right).copied().collect();
        prop_assert_eq!(intersection.into_concrete().unwrap(), expected_intersection);

        let difference = DeferredHashSet::from_concrete(left.clone())
            .difference(DeferredHashSet::from_concrete(right.clone()));
        let expected_difference: HashSet<i16> = left.difference(&right).copied().collect();
        prop_assert_eq!(difference.into_concrete().unwrap(), expected_difference);

        let symmetric = DeferredHashSet::from_concrete(left.clone())
            .symmetric_difference(DeferredHashSet::from_concrete(right.clone()));
        let expected_symmetric: HashSet<i16> =
            left.symmetric_difference(&right).copied().collect();
        prop_assert_eq!(symmetric.into_concrete().unwrap(), expected_symmetric);
    }
}

// =============================================================================
// Grouping Laws
// Description: groups concatenate back to the source and respect the
// requested size
// =============================================================================

proptest! {
    #[test]
    fn prop_grouped_concatenates_to_source(
        elements in prop::collection::vec(any::<i32>(), 0..40),
        size in 1usize..6
    ) {
        let groups: DeferredVec<Vec<i32>> = DeferredVec::of(elements.clone()).grouped(size);
        let groups = groups.to_vec().unwrap();

        let flattened: Vec<i32> = groups.iter().flatten().copied().collect();
        prop_assert_eq!(flattened, elements);

        if let Some((last, full)) = groups.split_last() {
            for group in full {
                prop_assert_eq!(group.len(), size);
            }
            prop_assert!(last.len() <= size);
            prop_assert!(!last.is_empty());
        }
    }
}

// =============================================================================
// Windowing Laws
// Description: the number of full windows follows the source length
// =============================================================================

proptest! {
    #[test]
    fn prop_sliding_window_count(
        elements in prop::collection::vec(any::<i32>(), 0..30),
        window in 1usize..5
    ) {
        let windows: DeferredVec<Vec<i32>> = DeferredVec::of(elements.clone()).sliding(window);
        let windows = windows.to_vec().unwrap();

        let expected = if elements.is_empty() {
            0
        } else if elements.len() < window {
            1
        } else {
            elements.len() - window + 1
        };
        prop_assert_eq!(windows.len(), expected);

        for pane in &windows {
            prop_assert!(pane.len() <= window);
        }
    }
}

// =============================================================================
// Distinct Law
// Description: distinct keeps exactly the first occurrence of each element
// =============================================================================

proptest! {
    #[test]
    fn prop_distinct_keeps_first_occurrences(
        elements in prop::collection::vec(0i32..10, 0..40)
    ) {
        let unique: DeferredVec<i32> = DeferredVec::of(elements.clone()).distinct();

        let mut seen = HashSet::new();
        let expected: Vec<i32> = elements
            .into_iter()
            .filter(|element| seen.insert(*element))
            .collect();
        prop_assert_eq!(unique.to_vec().unwrap(), expected);
    }
}
