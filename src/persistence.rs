//! Session persistence: save and load workbench state to/from JSON files.
//!
//! Serializable mirror types decouple the on-disk format from the live
//! state; field expressions are stored as their display strings and parsed
//! back on load.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::field::{FieldExpr, ModeSet, PlotMode};
use crate::data::workbench::Workbench;
use crate::source::SourceFactory;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Serializable version of one dataset row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowSerde {
    pub file: String,
    /// Field display text, e.g. `run.h5/Field/power` or
    /// `Correlation1(run.h5/Field/intensity)`.
    pub field: String,
    pub mode: PlotMode,
    pub modes: ModeSet,
    pub enabled: bool,
    pub right_axis: bool,
    pub log: bool,
    pub color: usize,
}

/// Serializable version of the whole workbench.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbenchStateSerde {
    pub files: Vec<String>,
    pub rows: Vec<RowSerde>,
    pub position: f64,
}

impl From<&Workbench> for WorkbenchStateSerde {
    fn from(wb: &Workbench) -> Self {
        Self {
            files: wb.sessions.iter().map(|s| s.id().to_string()).collect(),
            rows: wb
                .rows
                .iter()
                .map(|row| RowSerde {
                    file: row.file.clone(),
                    field: row.field.display(),
                    mode: row.mode,
                    modes: row.modes,
                    enabled: row.enabled,
                    right_axis: row.right_axis,
                    log: row.log,
                    color: row.color,
                })
                .collect(),
            position: wb.position,
        }
    }
}

impl WorkbenchStateSerde {
    /// Restore stored state into `wb`, reopening files through `factory`.
    ///
    /// Files that fail to open are skipped with a warning; their rows stay
    /// in the table and simply do not resolve. Rows with unparseable field
    /// text are dropped.
    pub fn apply_to(self, wb: &mut Workbench, factory: &dyn SourceFactory) {
        for file in &self.files {
            if let Err(e) = wb.sessions.open(Path::new(file), factory) {
                tracing::warn!(file = %file, error = %e, "could not reopen stored file");
            }
        }
        wb.rows.clear();
        for stored in self.rows {
            let field = match FieldExpr::parse(&stored.field) {
                Ok(field) => field,
                Err(e) => {
                    tracing::warn!(field = %stored.field, error = %e, "dropping stored row");
                    continue;
                }
            };
            let index = wb.rows.add(stored.file, field);
            if let Some(row) = wb.rows.get_mut(index) {
                row.mode = stored.mode;
                row.modes = stored.modes;
                row.enabled = stored.enabled;
                row.right_axis = stored.right_axis;
                row.log = stored.log;
                row.color = stored.color;
            }
        }
        wb.position = self.position;
    }
}

/// Write workbench state as pretty-printed JSON.
pub fn save_state(path: &Path, wb: &Workbench) -> Result<(), StateError> {
    let state = WorkbenchStateSerde::from(wb);
    let json = serde_json::to_string_pretty(&state)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "saved session state");
    Ok(())
}

/// Read workbench state from a JSON file.
pub fn load_state(path: &Path) -> Result<WorkbenchStateSerde, StateError> {
    let json = std::fs::read_to_string(path)?;
    let state = serde_json::from_str(&json)?;
    tracing::info!(path = %path.display(), "loaded session state");
    Ok(state)
}
