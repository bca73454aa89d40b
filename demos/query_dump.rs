//! Exercise the query and composition core without a window.
//!
//! Run with: cargo run --example query_dump
//!
//! Opens a synthetic file, applies the power query and prints a summary of
//! the resulting render plan.

use std::path::Path;

use genplot::{RenderItem, SyntheticFactory, Workbench, CONVOLUTION_QUERY};

fn main() {
    tracing_subscriber::fmt::init();

    let factory = SyntheticFactory;
    let mut wb = Workbench::new();
    wb.open_file(Path::new("run1.out.h5"), &factory)
        .expect("synthetic files always load");

    let added = wb
        .apply_query(CONVOLUTION_QUERY)
        .expect("built-in pattern is valid");
    println!("query {CONVOLUTION_QUERY:?} matched {added} records");

    wb.position = 0.8;
    let plan = wb.render().expect("synthetic backend does not fail");
    println!(
        "plan: xlabel={:?}, right axis={}, {} items",
        plan.xlabel,
        plan.has_right_axis,
        plan.items.len()
    );
    for item in &plan.items {
        match item {
            RenderItem::Line(line) => {
                println!("  line {:?} with {} points", line.label, line.points.len())
            }
            RenderItem::Image(image) => println!(
                "  image {:?} of {}x{} with extent {:?}",
                image.label,
                image.rows.len(),
                image.rows.first().map_or(0, Vec::len),
                image.extent
            ),
        }
    }
}
