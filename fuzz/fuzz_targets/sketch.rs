#![no_main]

use libfuzzer_sys::fuzz_target;
use two_level_sketch::{SketchConfig, SketchError, TwoLevelSketch};
use wyhash::wyhash;

fn sketch() -> TwoLevelSketch<[u8]> {
    let config = SketchConfig::new()
        .with_bitsketchsize(16)
        .with_sketchsets(16)
        .with_exact_tally(true);
    TwoLevelSketch::with_config(config).unwrap()
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut sketch1 = sketch();
    for chunk in first_half.chunks(4) {
        sketch1.add(chunk);
        assert!(sketch1.cardinality() > 0.0);
    }

    let mut sketch2 = sketch();
    for chunk in second_half.chunks(4) {
        sketch2.add(chunk);
        assert!(sketch2.cardinality() > 0.0);
    }

    match sketch1.estimate_union(&sketch2) {
        Ok(union) => assert!(union >= 0.0),
        Err(err) => assert_eq!(err, SketchError::NoEstimate),
    }
    for estimate in [
        sketch1.estimate_intersection(&sketch2),
        sketch1.estimate_set_diff(&sketch2, None),
    ] {
        match estimate {
            Ok(value) => assert!(value >= 0.0),
            Err(err) => assert_eq!(err, SketchError::NoEstimate),
        }
    }

    let distinct = sketch1.exact_distinct_items().unwrap_or_default();
    sketch1.merge(&sketch2).unwrap();
    assert!(sketch1.exact_distinct_items().unwrap_or_default() >= distinct);
    assert!(sketch1.size_of() > 0);
});
