//! The postprocessing workbench: open files, dataset rows and the shared
//! position selector, plus the query and transform-menu operations that
//! tie them together.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::field::FieldExpr;
use crate::data::render::{build_render_plan, RenderPlan};
use crate::data::rows::RowTable;
use crate::data::session::{FileSession, SessionSet};
use crate::source::{SourceError, SourceFactory};

/// Query selecting the intensity record of every field harmonic
/// (`Field/intensity`, `Field2/intensity`, ... `Field9/intensity`).
pub const COHERENCE_QUERY: &str = r"Field([/]|[2-9][/])intensity";

/// Query selecting the power record of every field harmonic.
pub const CONVOLUTION_QUERY: &str = r"Field.*/power";

static COHERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(COHERENCE_QUERY).expect("built-in query pattern"));
static CONVOLUTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(CONVOLUTION_QUERY).expect("built-in query pattern"));

/// Top-level state of one postprocessing session.
#[derive(Default)]
pub struct Workbench {
    pub sessions: SessionSet,
    pub rows: RowTable,
    /// Shared slice selector in `[0, 1]`, applied identically to every row
    /// of a redraw pass.
    pub position: f64,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_file(
        &mut self,
        path: &Path,
        factory: &dyn SourceFactory,
    ) -> Result<&FileSession, SourceError> {
        self.sessions.open(path, factory)
    }

    pub fn close_file(&mut self, id: &str) -> bool {
        self.sessions.close(id)
    }

    pub fn reload_all(&mut self) -> Result<(), SourceError> {
        self.sessions.reload_all()
    }

    /// Replace the row table with one raw row per record matching
    /// `pattern` across all open files.
    ///
    /// When nothing matches anywhere the table is left untouched. Returns
    /// the number of rows added.
    pub fn apply_query(&mut self, pattern: &str) -> Result<usize, regex::Error> {
        let regex = Regex::new(pattern)?;
        let mut matches = Vec::new();
        for session in self.sessions.iter() {
            let found = session.source().find_records(&regex);
            if !found.is_empty() {
                matches.push((session.id().to_string(), session.name().to_string(), found));
            }
        }
        if matches.is_empty() {
            return Ok(0);
        }
        self.rows.clear();
        let mut added = 0;
        for (id, name, found) in matches {
            for field in found {
                self.rows.add(id.clone(), FieldExpr::Raw(format!("{name}/{field}")));
                added += 1;
            }
        }
        tracing::debug!(pattern, added, "query replaced dataset rows");
        Ok(added)
    }

    /// Append a raw row for a record picked in the browse tree. The stored
    /// field text carries the file display name as its first component,
    /// matching the paths produced by queries.
    pub fn add_record_row(&mut self, file_id: &str, record_path: &str) -> Option<usize> {
        let session = self.sessions.get(file_id)?;
        let field = FieldExpr::Raw(format!("{}/{}", session.name(), record_path));
        Some(self.rows.add(file_id.to_string(), field))
    }

    /// Append correlation rows of the given order for every intensity
    /// record of every open file. Returns the number of rows added.
    pub fn add_correlation_rows(&mut self, order: u8) -> usize {
        self.append_transform_rows(&COHERENCE_PATTERN, |inner| FieldExpr::Correlation {
            inner,
            order,
        })
    }

    /// Append convolution rows for every power record of every open file.
    pub fn add_convolution_rows(&mut self) -> usize {
        self.append_transform_rows(&CONVOLUTION_PATTERN, |inner| FieldExpr::Convolution { inner })
    }

    /// Append Wigner rows for every intensity record of every open file.
    pub fn add_wigner_rows(&mut self) -> usize {
        self.append_transform_rows(&COHERENCE_PATTERN, |inner| FieldExpr::Wigner { inner })
    }

    fn append_transform_rows(
        &mut self,
        pattern: &Regex,
        make: impl Fn(String) -> FieldExpr,
    ) -> usize {
        let mut pending = Vec::new();
        for session in self.sessions.iter() {
            for field in session.source().find_records(pattern) {
                let inner = format!("{}/{}", session.name(), field);
                pending.push((session.id().to_string(), make(inner)));
            }
        }
        let added = pending.len();
        for (id, field) in pending {
            self.rows.add(id, field);
        }
        added
    }

    /// Compose all enabled rows at the current position.
    pub fn render(&self) -> Result<RenderPlan, SourceError> {
        build_render_plan(&self.sessions, &self.rows, self.position)
    }
}
