//! Estimate the number of distinct words of a text file.
//!
//! Usage: `cargo run --example wordcount -- <path> [bitsketchsize] [sketchsets]`

use std::error::Error;
use std::fs;

use two_level_sketch::{SketchConfig, TwoLevelSketch};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: wordcount <path> [bitsketchsize] [sketchsets]")?;
    let bitsketchsize = args.next().map(|v| v.parse()).transpose()?.unwrap_or(32);
    let sketchsets = args.next().map(|v| v.parse()).transpose()?.unwrap_or(256);

    let config = SketchConfig::new()
        .with_bitsketchsize(bitsketchsize)
        .with_sketchsets(sketchsets)
        .with_exact_tally(true);
    let mut sketch = TwoLevelSketch::<str>::with_config(config)?;

    let text = fs::read_to_string(&path)?;
    for word in text.split_whitespace() {
        sketch.add(word);
    }

    println!("total items = {}", sketch.exact_total_items().unwrap_or_default());
    println!("distinct items = {}", sketch.exact_distinct_items().unwrap_or_default());
    println!("estimate = {:.2}", sketch.cardinality());
    match sketch.relative_error() {
        Some(error) => println!("relative error = {:.4}", error),
        None => println!("relative error = n/a"),
    }
    println!("sketch = {:?}", sketch);
    Ok(())
}
