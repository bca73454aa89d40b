//! GenPlot crate root: re-exports and module wiring.
//!
//! An interactive browser for hierarchically organized simulation output
//! files, built on egui/eframe:
//! - `source`: the file-backend contract and a synthetic reference backend
//! - `data`: field expressions, dataset rows, sessions and the pure
//!   render-plan composition
//! - `persistence`: JSON session state
//! - `panels`: browse tree, dataset table and plot widgets
//! - `app`: the standalone application and its run helpers

pub mod app;
pub mod data;
pub mod panels;
pub mod persistence;
pub mod source;

// Public re-exports for a compact external API
pub use app::{run_genplot, run_genplot_with_files, GenPlotApp};
pub use data::field::{FieldExpr, FieldParseError, ModeSet, PlotMode};
pub use data::render::{build_render_plan, AxisSide, RenderItem, RenderPlan};
pub use data::rows::{PlotRow, RowTable};
pub use data::session::{BrowseNode, FileSession, SessionSet};
pub use data::workbench::{Workbench, COHERENCE_QUERY, CONVOLUTION_QUERY};
pub use source::synthetic::{SyntheticFactory, SyntheticSource};
pub use source::{
    LineKind, OutputSource, PlotRecord, RecordKind, SourceEntry, SourceError, SourceFactory,
};
