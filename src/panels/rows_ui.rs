//! Dataset table: one row per plot request.
//!
//! Columns mirror the classic postprocessor layout: Field (with its enable
//! checkbox), Mode, Right Axis, Log and Color. Clicking a field label
//! selects that row for the delete/duplicate actions. Every edit reports
//! back as "changed" so the caller can replot.

use egui_table::{CellInfo, Column, HeaderCellInfo, HeaderRow, Table, TableDelegate};

use crate::data::rows::{palette_name, RowTable, PALETTE};

#[derive(Default)]
pub struct RowsPanel {
    pub selected: Option<usize>,
}

const HEADERS: [&str; 5] = ["Field", "Mode", "Right Axis", "Log", "Color"];

struct RowsDelegate<'a> {
    rows: &'a mut RowTable,
    selected: Option<usize>,
    select_request: &'a mut Option<usize>,
    changed: &'a mut bool,
    col_w: [f32; 5],
}

impl TableDelegate for RowsDelegate<'_> {
    fn header_cell_ui(&mut self, ui: &mut egui::Ui, cell: &HeaderCellInfo) {
        let col = cell.col_range.start;
        let (rect, _resp) =
            ui.allocate_exact_size(egui::vec2(self.col_w[col], 20.0), egui::Sense::hover());
        ui.scope_builder(
            egui::UiBuilder::new()
                .max_rect(rect)
                .layout(egui::Layout::left_to_right(egui::Align::Center)),
            |inner| {
                inner.add_space(4.0);
                inner.strong(HEADERS[col]);
            },
        );
    }

    fn cell_ui(&mut self, ui: &mut egui::Ui, cell: &CellInfo) {
        let index = cell.row_nr as usize;
        let col = cell.col_nr;
        if index >= self.rows.len() {
            return;
        }
        let (rect, _resp) =
            ui.allocate_exact_size(egui::vec2(self.col_w[col], 22.0), egui::Sense::hover());
        ui.scope_builder(
            egui::UiBuilder::new()
                .max_rect(rect)
                .layout(egui::Layout::left_to_right(egui::Align::Center)),
            |inner| {
                let Some(row) = self.rows.get_mut(index) else {
                    return;
                };
                match col {
                    0 => {
                        if inner.checkbox(&mut row.enabled, "").changed() {
                            *self.changed = true;
                        }
                        let label = egui::Label::new(row.field.display())
                            .truncate()
                            .show_tooltip_when_elided(true)
                            .sense(egui::Sense::click());
                        let resp = if self.selected == Some(index) {
                            inner.add(label.selectable(false)).highlight()
                        } else {
                            inner.add(label)
                        };
                        if resp.clicked() {
                            *self.select_request = Some(index);
                        }
                    }
                    1 => {
                        egui::ComboBox::from_id_salt(("row_mode", index))
                            .selected_text(row.mode.label())
                            .width(self.col_w[col] - 8.0)
                            .show_ui(inner, |ui| {
                                for &mode in row.modes.options() {
                                    if ui
                                        .selectable_value(&mut row.mode, mode, mode.label())
                                        .changed()
                                    {
                                        *self.changed = true;
                                    }
                                }
                            });
                    }
                    2 => {
                        if inner.checkbox(&mut row.right_axis, "").changed() {
                            *self.changed = true;
                        }
                    }
                    3 => {
                        if inner.checkbox(&mut row.log, "").changed() {
                            *self.changed = true;
                        }
                    }
                    4 => {
                        egui::ComboBox::from_id_salt(("row_color", index))
                            .selected_text(palette_name(row.color))
                            .width(self.col_w[col] - 8.0)
                            .show_ui(inner, |ui| {
                                for (i, (name, _)) in PALETTE.iter().enumerate() {
                                    if ui.selectable_value(&mut row.color, i, *name).changed() {
                                        *self.changed = true;
                                    }
                                }
                            });
                    }
                    _ => {}
                }
            },
        );
    }
}

impl RowsPanel {
    /// Render the table. Returns whether any row configuration changed.
    pub fn show(&mut self, ui: &mut egui::Ui, rows: &mut RowTable) -> bool {
        if rows.is_empty() {
            ui.label("No datasets selected. Double-click a record in the browser or run a query.");
            self.selected = None;
            return false;
        }
        if let Some(sel) = self.selected {
            if sel >= rows.len() {
                self.selected = None;
            }
        }

        let avail_w = ui.available_width();
        let mut col_w = [160.0_f32, 110.0, 72.0, 40.0, 80.0];
        let fixed: f32 = col_w[1..].iter().sum();
        if avail_w > fixed + col_w[0] {
            col_w[0] = avail_w - fixed;
        }

        let mut changed = false;
        let mut select_request = None;
        let num_rows = rows.len() as u64;
        let mut delegate = RowsDelegate {
            rows,
            selected: self.selected,
            select_request: &mut select_request,
            changed: &mut changed,
            col_w,
        };
        Table::new()
            .id_salt("dataset_table")
            .num_rows(num_rows)
            .columns(col_w.iter().map(|&w| Column::new(w)).collect::<Vec<_>>())
            .headers(vec![HeaderRow::new(24.0)])
            .show(ui, &mut delegate);

        if let Some(index) = select_request {
            self.selected = if self.selected == Some(index) {
                None
            } else {
                Some(index)
            };
        }
        changed
    }
}
