use test_case::test_case;
use two_level_sketch::{SketchConfig, SketchError, TwoLevelSketch, WyHashFamily};

fn sketch_of(items: impl Iterator<Item = u64>, base: u64) -> TwoLevelSketch<u64> {
    let config = SketchConfig::new()
        .with_bitsketchsize(32)
        .with_sketchsets(512)
        .with_exact_tally(true);
    let mut sketch =
        TwoLevelSketch::with_config_and_family(config, WyHashFamily::with_base(base)).unwrap();
    items.for_each(|i| sketch.add(&i));
    sketch
}

/// A = [0, 1500), B = [1000, 2500): |A ∪ B| = 2500, |A ∩ B| = 500, |A \ B| = 1000
#[test_case(0)]
#[test_case(0x5eed)]
fn test_overlapping_streams(base: u64) {
    let mut a = sketch_of(0..1_500, base);
    let b = sketch_of(1_000..2_500, base);
    assert_eq!(a.exact_distinct_items(), Some(1_500));
    assert_eq!(b.exact_distinct_items(), Some(1_500));

    let union = a.estimate_union(&b).unwrap();
    assert!((1_250.0..=3_750.0).contains(&union), "union = {union}");
    assert_eq!(a.union_estimate(), Some(union));

    let intersection = a.estimate_intersection(&b).unwrap();
    assert!(
        (200.0..=1_000.0).contains(&intersection),
        "intersection = {intersection}"
    );

    let difference = a.estimate_set_diff(&b, None).unwrap();
    assert!(
        (400.0..=1_600.0).contains(&difference),
        "difference = {difference}"
    );
    assert_eq!(a.estimate_set_diff(&b, Some(union)), Ok(difference));
}

#[test]
fn test_duplicates_do_not_change_set_estimates() {
    let mut once = sketch_of(0..1_500, 7);
    let mut twice = sketch_of((0..1_500).chain(0..1_500), 7);
    let b = sketch_of(1_000..2_500, 7);
    assert_eq!(twice.exact_total_items(), Some(3_000));
    assert_eq!(once.cardinality(), twice.cardinality());

    assert_eq!(once.estimate_union(&b), twice.estimate_union(&b));
    assert_eq!(
        once.estimate_intersection(&b),
        twice.estimate_intersection(&b)
    );
    assert_eq!(
        once.estimate_set_diff(&b, None),
        twice.estimate_set_diff(&b, None)
    );
}

#[test]
fn test_merged_workers_match_single_stream() {
    let mut workers: Vec<TwoLevelSketch<u64>> = (0..4)
        .map(|w| sketch_of((0..2_000).filter(|i| i % 4 == w), 3))
        .collect();
    let mut whole = sketch_of(0..2_000, 3);

    let mut merged = workers.remove(0);
    for worker in &workers {
        merged.merge(worker).unwrap();
    }
    assert_eq!(merged.cardinality(), whole.cardinality());
    assert_eq!(merged.exact_distinct_items(), Some(2_000));

    let other = sketch_of(1_000..3_000, 3);
    assert_eq!(merged.estimate_union(&other), whole.estimate_union(&other));
    assert_eq!(
        merged.estimate_intersection(&other),
        whole.estimate_intersection(&other)
    );
}

#[test]
fn test_incompatible_parameters_are_rejected() {
    let mut a = sketch_of(0..100, 0);
    let b = TwoLevelSketch::<u64>::new(16, 512, 0.2, 1.05, None).unwrap();
    assert_eq!(
        a.estimate_union(&b),
        Err(SketchError::IncompatibleSketches {
            lhs_bits: 32,
            lhs_sets: 512,
            rhs_bits: 16,
            rhs_sets: 512,
        })
    );
}
