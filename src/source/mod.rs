//! Output-file backend contract.
//!
//! The browser core never touches file formats directly. Everything it needs
//! from an open simulation output file goes through [`OutputSource`]:
//! record discovery, hierarchy enumeration for the browse tree, and the
//! per-record transform calls that produce a normalized [`PlotRecord`].
//!
//! A concrete backend is plugged in through [`SourceFactory`]; this crate
//! ships [`synthetic::SyntheticSource`] as a deterministic reference backend
//! used by the demos and the test suite.

pub mod synthetic;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

use crate::data::field::PlotMode;

/// Errors raised by a file backend. Expected "no data" conditions are not
/// errors; transform calls report those as `Ok(None)`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("failed to read record {field:?}: {reason}")]
    Read { field: String, reason: String },
}

/// How a curve should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineKind {
    #[default]
    Default,
    /// Piecewise-constant rendering, used for stepwise records such as
    /// lattice strength parameters.
    Steps,
}

/// Whether a record resolves to a curve or a 2-D map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Plot,
    Image,
}

/// The normalized result of resolving one record.
///
/// For `kind == Plot`, `x`/`y` hold the curve and `z` is `None`. For
/// `kind == Image`, `z` holds the map indexed as `z[i][j]` with
/// `z.len() == x.len()` and `z[0].len() == y.len()`; `x` and `y` then carry
/// the axis vectors that define the image extent.
#[derive(Debug, Clone)]
pub struct PlotRecord {
    pub xlabel: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Option<Vec<Vec<f64>>>,
    pub kind: RecordKind,
    pub line: LineKind,
}

impl PlotRecord {
    pub fn curve(xlabel: impl Into<String>, x: Vec<f64>, y: Vec<f64>, line: LineKind) -> Self {
        Self {
            xlabel: xlabel.into(),
            x,
            y,
            z: None,
            kind: RecordKind::Plot,
            line,
        }
    }

    pub fn image(xlabel: impl Into<String>, x: Vec<f64>, y: Vec<f64>, z: Vec<Vec<f64>>) -> Self {
        Self {
            xlabel: xlabel.into(),
            x,
            y,
            z: Some(z),
            kind: RecordKind::Image,
            line: LineKind::Default,
        }
    }
}

/// One child of a group in the record hierarchy.
///
/// `shape == None` marks a subgroup; datasets report their array shape so
/// the browse tree can show a record-size column.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub name: String,
    pub shape: Option<Vec<usize>>,
}

impl SourceEntry {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: None,
        }
    }

    pub fn dataset(name: impl Into<String>, shape: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            shape: Some(shape),
        }
    }

    pub fn is_dataset(&self) -> bool {
        self.shape.is_some()
    }
}

/// Contract of an open output file.
///
/// Transform calls return `Ok(None)` when the request names a record the
/// file does not (or no longer) contains; callers skip those silently.
/// `Err` is reserved for real backend failures.
pub trait OutputSource {
    /// Re-read all records in place, picking up changes on disk.
    fn reload(&mut self) -> Result<(), SourceError>;

    /// All record paths whose full path matches `pattern`.
    /// No match is an empty set, never an error.
    fn find_records(&self, pattern: &Regex) -> BTreeSet<String>;

    /// Immediate children of the group at `group` (`""` is the file root).
    fn entries(&self, group: &str) -> Vec<SourceEntry>;

    /// Plain extraction of a record, reduced according to `mode`.
    fn get_data(
        &self,
        field: &str,
        mode: PlotMode,
        position: f64,
    ) -> Result<Option<PlotRecord>, SourceError>;

    /// Cross-correlation of the given field with itself, of the given order.
    fn get_coherence(
        &self,
        field: &str,
        position: f64,
        order: u8,
    ) -> Result<Option<PlotRecord>, SourceError>;

    /// Autocorrelation-style convolution of the given field.
    fn get_convolution(&self, field: &str, position: f64)
        -> Result<Option<PlotRecord>, SourceError>;

    /// Joint time-frequency map. The field text arrives in its wrapped
    /// display form (`Wigner(...)`) and is interpreted by the backend.
    fn get_wigner(&self, field: &str, position: f64) -> Result<Option<PlotRecord>, SourceError>;
}

/// Opens output files. The GUI shell is generic over this so different
/// file formats can be plugged in without touching the core.
pub trait SourceFactory {
    fn load(&self, path: &Path) -> Result<Box<dyn OutputSource>, SourceError>;
}
