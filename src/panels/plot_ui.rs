//! Central plot: draws a [`RenderPlan`] with egui_plot.
//!
//! Log-scaled axes are emulated by mapping values through log10 and
//! formatting the tick labels back, the same way the scope handles its
//! y-log option. The secondary axis is emulated by rescaling its curves
//! into the primary value range and giving the right-hand axis a tick
//! formatter that inverts the mapping; egui_plot itself only knows a
//! single y scale.

use egui::{ColorImage, TextureHandle, TextureOptions};
use egui_plot::{AxisHints, HPlacement, Legend, Line, Plot, PlotImage, PlotPoint};

use crate::data::render::{AxisSide, ImageItem, LineItem, RenderItem, RenderPlan};
use crate::data::rows::palette_color;
use crate::source::LineKind;

/// Linear map between the secondary and primary value ranges.
#[derive(Clone, Copy)]
struct AxisMap {
    primary_lo: f64,
    secondary_lo: f64,
    scale: f64,
}

impl AxisMap {
    fn identity() -> Self {
        Self {
            primary_lo: 0.0,
            secondary_lo: 0.0,
            scale: 1.0,
        }
    }

    fn to_primary(&self, v: f64) -> f64 {
        self.primary_lo + (v - self.secondary_lo) * self.scale
    }

    fn to_secondary(&self, v: f64) -> f64 {
        self.secondary_lo + (v - self.primary_lo) / self.scale
    }
}

/// Holds the current plan plus the image textures uploaded for it.
#[derive(Default)]
pub struct PlotPanel {
    plan: Option<RenderPlan>,
    textures: Vec<TextureHandle>,
}

impl PlotPanel {
    /// Install a freshly composed plan, uploading one texture per image
    /// item. Called from the replot path, not every frame.
    pub fn set_plan(&mut self, ctx: &egui::Context, plan: RenderPlan) {
        self.textures = plan
            .images()
            .enumerate()
            .map(|(i, image)| {
                ctx.load_texture(
                    format!("genplot_image_{i}"),
                    colorize(image),
                    TextureOptions::NEAREST,
                )
            })
            .collect();
        self.plan = Some(plan);
    }

    pub fn clear(&mut self) {
        self.plan = None;
        self.textures.clear();
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(plan) = &self.plan else {
            ui.centered_and_justified(|ui| {
                ui.label("No datasets plotted");
            });
            return;
        };

        let map = secondary_map(plan);
        let log_primary = plan.log_primary;
        let log_secondary = plan.log_secondary;

        let mut plot = Plot::new("workbench_plot")
            .legend(Legend::default())
            .allow_scroll(false)
            .allow_boxed_zoom(true);
        if let Some(xlabel) = &plan.xlabel {
            plot = plot.x_axis_label(xlabel.clone());
        }

        if plan.has_right_axis {
            let left = AxisHints::new_y()
                .placement(HPlacement::Left)
                .formatter(move |mark, _range| format_tick(mark.value, log_primary));
            let right = AxisHints::new_y()
                .placement(HPlacement::Right)
                .formatter(move |mark, _range| {
                    format_tick(map.to_secondary(mark.value), log_secondary)
                });
            plot = plot.custom_y_axes(vec![left, right]);
        } else {
            plot = plot.y_axis_formatter(move |mark, _range| format_tick(mark.value, log_primary));
        }

        plot.show(ui, |plot_ui| {
            let mut texture = self.textures.iter();
            for item in &plan.items {
                match item {
                    RenderItem::Line(line) => draw_line(plot_ui, line, plan, map),
                    RenderItem::Image(image) => {
                        if let Some(tex) = texture.next() {
                            draw_image(plot_ui, image, tex);
                        }
                    }
                }
            }
        });
    }
}

fn draw_line(plot_ui: &mut egui_plot::PlotUi, item: &LineItem, plan: &RenderPlan, map: AxisMap) {
    let log = match item.axis {
        AxisSide::Primary => plan.log_primary,
        AxisSide::Secondary => plan.log_secondary,
    };
    let mut points: Vec<[f64; 2]> = item
        .points
        .iter()
        .map(|&[x, y]| {
            let y = if log {
                if y > 0.0 {
                    y.log10()
                } else {
                    f64::NAN
                }
            } else {
                y
            };
            let y = match item.axis {
                AxisSide::Primary => y,
                AxisSide::Secondary => map.to_primary(y),
            };
            [x, y]
        })
        .collect();
    if item.line == LineKind::Steps {
        points = staircase(&points);
    }
    plot_ui.line(Line::new(&item.label, points).color(palette_color(item.color)));
}

fn draw_image(plot_ui: &mut egui_plot::PlotUi, item: &ImageItem, texture: &TextureHandle) {
    let [left, right, bottom, top] = item.extent;
    let center = PlotPoint::new((left + right) / 2.0, (bottom + top) / 2.0);
    let size = [(right - left) as f32, (top - bottom) as f32];
    plot_ui.image(PlotImage::new(&item.label, texture, center, size));
}

/// Duplicate interior points so each segment is drawn piecewise constant.
fn staircase(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (i, &[x, y]) in points.iter().enumerate() {
        if i > 0 {
            out.push([x, points[i - 1][1]]);
        }
        out.push([x, y]);
    }
    out
}

/// Fit the secondary value range onto the primary one.
fn secondary_map(plan: &RenderPlan) -> AxisMap {
    if !plan.has_right_axis {
        return AxisMap::identity();
    }
    let primary = axis_range(plan, AxisSide::Primary, plan.log_primary);
    let secondary = axis_range(plan, AxisSide::Secondary, plan.log_secondary);
    match (primary, secondary) {
        (Some((p_lo, p_hi)), Some((s_lo, s_hi))) => {
            let p_span = (p_hi - p_lo).max(f64::EPSILON);
            let s_span = (s_hi - s_lo).max(f64::EPSILON);
            AxisMap {
                primary_lo: p_lo,
                secondary_lo: s_lo,
                scale: p_span / s_span,
            }
        }
        _ => AxisMap::identity(),
    }
}

fn axis_range(plan: &RenderPlan, axis: AxisSide, log: bool) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for line in plan.lines().filter(|line| line.axis == axis) {
        for &[_, y] in &line.points {
            let y = if log {
                if y > 0.0 {
                    y.log10()
                } else {
                    continue;
                }
            } else {
                y
            };
            lo = lo.min(y);
            hi = hi.max(y);
        }
    }
    if axis == AxisSide::Primary {
        for image in plan.images() {
            lo = lo.min(image.extent[2]);
            hi = hi.max(image.extent[3]);
        }
    }
    (lo <= hi).then_some((lo, hi))
}

fn format_tick(value: f64, log: bool) -> String {
    let shown = if log { 10f64.powf(value) } else { value };
    if shown != 0.0 && (shown.abs() >= 1.0e4 || shown.abs() < 1.0e-3) {
        format!("{shown:.1e}")
    } else {
        format!("{shown:.3}")
    }
}

/// Map an image item to pixels through the viridis gradient.
fn colorize(item: &ImageItem) -> ColorImage {
    let height = item.rows.len();
    let width = item.rows.first().map_or(0, Vec::len);
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for row in &item.rows {
        for &v in row {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    let span = (hi - lo).max(f64::EPSILON);
    let gradient = colorgrad::viridis();
    let mut rgba = Vec::with_capacity(width * height * 4);
    for row in &item.rows {
        for &v in row {
            let t = if v.is_finite() { (v - lo) / span } else { 0.0 };
            rgba.extend_from_slice(&gradient.at(t).to_rgba8());
        }
    }
    ColorImage::from_rgba_unmultiplied([width, height], &rgba)
}
