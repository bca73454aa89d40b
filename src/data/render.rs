//! Pure composition of the dataset table into a render plan.
//!
//! [`build_render_plan`] walks the enabled rows in display order, resolves
//! each against its file backend and accumulates the result into a
//! [`RenderPlan`]: an ordered list of draw items plus the shared axis
//! state. The plan carries no widget or texture handles, so the whole
//! composition step is testable without a UI.

use crate::data::field::{FieldExpr, PlotMode};
use crate::data::rows::RowTable;
use crate::data::session::SessionSet;
use crate::source::{LineKind, OutputSource, PlotRecord, RecordKind, SourceError};

/// Which y-axis a curve is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Primary,
    Secondary,
}

/// A curve to draw.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub label: String,
    pub points: Vec<[f64; 2]>,
    /// Palette index of the owning row.
    pub color: usize,
    pub axis: AxisSide,
    pub line: LineKind,
}

/// A 2-D map to draw, always on the primary axis.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub label: String,
    /// Map values with the vertical orientation already applied: row 0 is
    /// the top scanline.
    pub rows: Vec<Vec<f64>>,
    /// `[left, right, bottom, top]` in plot coordinates.
    pub extent: [f64; 4],
}

#[derive(Debug, Clone)]
pub enum RenderItem {
    Line(LineItem),
    Image(ImageItem),
}

/// Everything one redraw pass needs to hand to the drawing backend.
#[derive(Debug, Clone, Default)]
pub struct RenderPlan {
    /// Shared x-axis label; the first resolved row wins.
    pub xlabel: Option<String>,
    /// Whether the secondary y-axis should be visible at all.
    pub has_right_axis: bool,
    /// Log flags are a property of the axis, not of a single curve. One
    /// logged row log-scales every curve sharing that axis.
    pub log_primary: bool,
    pub log_secondary: bool,
    /// Draw items in display order; later items paint on top.
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    pub fn lines(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter_map(|item| match item {
            RenderItem::Line(line) => Some(line),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageItem> {
        self.items.iter().filter_map(|item| match item {
            RenderItem::Image(image) => Some(image),
            _ => None,
        })
    }
}

/// Resolve one field expression against a backend.
///
/// Correlation and convolution hand the backend the bare inner path; the
/// Wigner call passes the full wrapped display text through untouched.
pub fn resolve_field(
    source: &dyn OutputSource,
    field: &FieldExpr,
    mode: PlotMode,
    position: f64,
) -> Result<Option<PlotRecord>, SourceError> {
    match field {
        FieldExpr::Raw(path) => source.get_data(path, mode, position),
        FieldExpr::Correlation { inner, order } => source.get_coherence(inner, position, *order),
        FieldExpr::Convolution { inner } => source.get_convolution(inner, position),
        FieldExpr::Wigner { .. } => source.get_wigner(&field.display(), position),
    }
}

/// Compose all enabled rows into a [`RenderPlan`].
///
/// `position` is read once by the caller and applied identically to every
/// row. Rows whose file is no longer open and rows the backend has no data
/// for are skipped without a placeholder. Backend failures abort the whole
/// pass.
pub fn build_render_plan(
    sessions: &SessionSet,
    rows: &RowTable,
    position: f64,
) -> Result<RenderPlan, SourceError> {
    let mut plan = RenderPlan::default();

    for row in rows.iter().filter(|row| row.enabled) {
        let Some(session) = sessions.get(&row.file) else {
            continue;
        };
        let Some(record) = resolve_field(session.source(), &row.field, row.mode, position)? else {
            continue;
        };

        if plan.xlabel.is_none() {
            plan.xlabel = Some(record.xlabel.clone());
        }

        match record.kind {
            RecordKind::Plot => {
                let axis = if row.right_axis {
                    plan.has_right_axis = true;
                    AxisSide::Secondary
                } else {
                    AxisSide::Primary
                };
                if row.log {
                    match axis {
                        AxisSide::Primary => plan.log_primary = true,
                        AxisSide::Secondary => plan.log_secondary = true,
                    }
                }
                let points = record
                    .x
                    .iter()
                    .zip(record.y.iter())
                    .map(|(&x, &y)| [x, y])
                    .collect();
                plan.items.push(RenderItem::Line(LineItem {
                    label: row.field.display(),
                    points,
                    color: row.color,
                    axis,
                    line: record.line,
                }));
            }
            RecordKind::Image => {
                let Some(z) = record.z else {
                    continue;
                };
                let Some(extent) = image_extent(&record.x, &record.y) else {
                    continue;
                };
                // Flip vertically so row 0 of the stored map ends up at the
                // bottom of the plot (origin-at-top scanline order).
                let mut rows_top_first = z;
                rows_top_first.reverse();
                plan.items.push(RenderItem::Image(ImageItem {
                    label: row.field.display(),
                    rows: rows_top_first,
                    extent,
                }));
            }
        }
    }

    Ok(plan)
}

/// Bounding box of an image record: the horizontal span comes from the
/// record's `y` vector, the vertical span from `x`.
fn image_extent(x: &[f64], y: &[f64]) -> Option<[f64; 4]> {
    let (left, right) = min_max(y)?;
    let (bottom, top) = min_max(x)?;
    Some([left, right, bottom, top])
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    (lo <= hi).then_some((lo, hi))
}
