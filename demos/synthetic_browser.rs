//! Browse two synthetic output files.
//!
//! Run with: cargo run --example synthetic_browser
//!
//! Opens the browser with two generated files preloaded. Double-click a
//! record to plot it, or use the Analysis menu to add correlation,
//! autocorrelation and Wigner rows.

use std::path::Path;

use genplot::{run_genplot_with_files, SyntheticFactory};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();
    run_genplot_with_files(
        "GenPlot synthetic demo",
        Box::new(SyntheticFactory),
        &[Path::new("run1.out.h5"), Path::new("run2.out.h5")],
    )
}
