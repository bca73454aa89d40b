//! The dataset row table: the ordered list of plot requests.

use egui::Color32;

use crate::data::field::{FieldExpr, ModeSet, PlotMode};

/// Fixed ten-color palette. Rows cycle through it in creation order; the
/// names show up in the color selector of the dataset table.
pub const PALETTE: [(&str, Color32); 10] = [
    ("Blue", Color32::from_rgb(31, 119, 180)),
    ("Red", Color32::from_rgb(214, 39, 40)),
    ("Green", Color32::from_rgb(44, 160, 44)),
    ("Orange", Color32::from_rgb(255, 127, 14)),
    ("Purple", Color32::from_rgb(148, 103, 189)),
    ("Brown", Color32::from_rgb(140, 86, 75)),
    ("Pink", Color32::from_rgb(227, 119, 194)),
    ("Olive", Color32::from_rgb(188, 189, 34)),
    ("Grey", Color32::from_rgb(127, 127, 127)),
    ("Cyan", Color32::from_rgb(23, 190, 207)),
];

pub fn palette_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()].1
}

pub fn palette_name(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()].0
}

/// One row of the dataset table.
///
/// `file` is a back-reference to a session by identifier, not ownership;
/// when that file is closed the row stays in the table but stops resolving.
#[derive(Debug, Clone)]
pub struct PlotRow {
    pub file: String,
    pub field: FieldExpr,
    pub mode: PlotMode,
    pub modes: ModeSet,
    pub enabled: bool,
    pub right_axis: bool,
    pub log: bool,
    /// Index into [`PALETTE`].
    pub color: usize,
}

/// Ordered, user-editable collection of [`PlotRow`]s.
///
/// Row order is display order only; later rows are painted on top. None of
/// the mutators trigger recomputation, the caller decides when to redraw.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    rows: Vec<PlotRow>,
}

impl RowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row with default configuration: enabled, primary axis,
    /// linear scale, first mode of its option set, next palette color.
    pub fn add(&mut self, file: impl Into<String>, field: FieldExpr) -> usize {
        let modes = field.mode_set();
        let index = self.rows.len();
        self.rows.push(PlotRow {
            file: file.into(),
            field,
            mode: modes.default_mode(),
            modes,
            enabled: true,
            right_axis: false,
            log: false,
            color: index % PALETTE.len(),
        });
        index
    }

    /// Append a new row targeting the same file and field as `index`.
    /// Everything else is reset to defaults, not copied. Out-of-range
    /// indices are a no-op.
    pub fn duplicate(&mut self, index: usize) -> Option<usize> {
        let src = self.rows.get(index)?;
        let (file, field) = (src.file.clone(), src.field.clone());
        Some(self.add(file, field))
    }

    /// Delete the row at `index`, shifting later rows up.
    /// Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn toggle_enabled(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.enabled = !row.enabled;
        }
    }

    pub fn toggle_right_axis(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.right_axis = !row.right_axis;
        }
    }

    pub fn toggle_log(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.log = !row.log;
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.rows.iter().filter(|r| r.enabled).count()
    }

    pub fn get(&self, index: usize) -> Option<&PlotRow> {
        self.rows.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PlotRow> {
        self.rows.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlotRow> {
        self.rows.iter()
    }
}
