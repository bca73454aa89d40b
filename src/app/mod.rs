//! The browser application: menu bar, file browser, dataset table and the
//! central plot, wired to a [`Workbench`].
//!
//! Everything runs synchronously on the UI thread. File loads block, and
//! any row or position edit invalidates the whole plot; the redraw cost is
//! proportional to the number of enabled rows, which stays small.

use std::path::Path;

use eframe::egui;

use crate::data::session::BrowseNode;
use crate::data::workbench::Workbench;
use crate::panels::{BrowseAction, BrowserPanel, PlotPanel, RowsPanel};
use crate::persistence;
use crate::source::SourceFactory;

pub struct GenPlotApp {
    workbench: Workbench,
    factory: Box<dyn SourceFactory>,
    tree: Vec<BrowseNode>,
    query: String,
    browser: BrowserPanel,
    rows_panel: RowsPanel,
    plot_panel: PlotPanel,
    needs_replot: bool,
    /// Backend failure to surface to the user; everything else degrades
    /// silently.
    last_error: Option<String>,
}

impl GenPlotApp {
    pub fn new(factory: Box<dyn SourceFactory>) -> Self {
        Self {
            workbench: Workbench::new(),
            factory,
            tree: Vec::new(),
            query: String::new(),
            browser: BrowserPanel::default(),
            rows_panel: RowsPanel::default(),
            plot_panel: PlotPanel::default(),
            needs_replot: false,
            last_error: None,
        }
    }

    fn refresh_tree(&mut self) {
        self.tree = self.workbench.sessions.browse_tree();
    }

    fn open_file_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("HDF5 output", &["h5", "out"])
            .pick_file()
        else {
            return;
        };
        match self.workbench.open_file(&path, self.factory.as_ref()) {
            Ok(_) => self.refresh_tree(),
            Err(e) => {
                tracing::error!(error = %e, "file load failed");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn close_selected(&mut self) {
        let Some(id) = self.browser.selected_file.take() else {
            return;
        };
        self.workbench.close_file(&id);
        self.refresh_tree();
    }

    fn reload_all(&mut self) {
        if let Err(e) = self.workbench.reload_all() {
            tracing::error!(error = %e, "reload failed");
            self.last_error = Some(e.to_string());
        }
        self.refresh_tree();
    }

    fn save_session_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("session.json")
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };
        if let Err(e) = persistence::save_state(&path, &self.workbench) {
            tracing::error!(error = %e, "failed to save session");
            self.last_error = Some(e.to_string());
        }
    }

    fn load_session_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file()
        else {
            return;
        };
        match persistence::load_state(&path) {
            Ok(state) => {
                state.apply_to(&mut self.workbench, self.factory.as_ref());
                self.refresh_tree();
                self.needs_replot = true;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load session");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn apply_query(&mut self) {
        match self.workbench.apply_query(&self.query) {
            Ok(added) if added > 0 => {
                self.rows_panel.selected = None;
                self.needs_replot = true;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(pattern = %self.query, error = %e, "invalid query pattern"),
        }
    }

    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("🗁 File", |ui| {
                    if ui.button("🗀 Open…").clicked() {
                        self.open_file_dialog();
                        ui.close();
                    }
                    if ui.button("✖ Close Selected").clicked() {
                        self.close_selected();
                        ui.close();
                    }
                    if ui.button("⟳ Reload All").clicked() {
                        self.reload_all();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("💾 Save Session…").clicked() {
                        self.save_session_dialog();
                        ui.close();
                    }
                    if ui.button("🗁 Load Session…").clicked() {
                        self.load_session_dialog();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("🗠 Datasets", |ui| {
                    if ui.button("Delete Row").clicked() {
                        if let Some(index) = self.rows_panel.selected.take() {
                            self.workbench.rows.remove(index);
                            self.needs_replot = true;
                        }
                        ui.close();
                    }
                    if ui.button("Duplicate Row").clicked() {
                        if let Some(index) = self.rows_panel.selected {
                            self.workbench.rows.duplicate(index);
                        }
                        ui.close();
                    }
                });
                ui.menu_button("∿ Analysis", |ui| {
                    if ui.button("Correlation 1st order").clicked() {
                        self.workbench.add_correlation_rows(1);
                        ui.close();
                    }
                    if ui.button("Correlation 2nd order").clicked() {
                        self.workbench.add_correlation_rows(2);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Autocorrelation").clicked() {
                        self.workbench.add_convolution_rows();
                        ui.close();
                    }
                    if ui.button("Wigner distribution").clicked() {
                        self.workbench.add_wigner_rows();
                        ui.close();
                    }
                });
            });
        });
    }

    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Plot command:");
                let resp = ui.add(
                    egui::TextEdit::singleline(&mut self.query)
                        .hint_text("record path pattern, e.g. Field.*/power")
                        .desired_width(280.0),
                );
                if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    self.apply_query();
                }
                ui.separator();
                ui.label("Position:");
                if ui
                    .add(
                        egui::DragValue::new(&mut self.workbench.position)
                            .range(0.0..=1.0)
                            .speed(0.01),
                    )
                    .changed()
                {
                    self.needs_replot = true;
                }
                ui.separator();
                if ui.button("Replot").clicked() {
                    self.needs_replot = true;
                }
            });
        });
    }

    fn replot(&mut self, ctx: &egui::Context) {
        match self.workbench.render() {
            Ok(plan) => self.plot_panel.set_plan(ctx, plan),
            Err(e) => {
                tracing::error!(error = %e, "replot failed");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn render_error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.last_error.clone() else {
            return;
        };
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.last_error = None;
                }
            });
    }
}

impl eframe::App for GenPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_menu_bar(ctx);
        self.render_controls(ctx);

        egui::SidePanel::left("browser_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.strong("Files and Datasets");
                ui.separator();
                if let Some(BrowseAction::AddRecord { file, path }) =
                    self.browser.show(ui, &self.tree)
                {
                    self.workbench.add_record_row(&file, &path);
                    self.needs_replot = true;
                }
            });

        egui::TopBottomPanel::bottom("dataset_panel")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| {
                if self.rows_panel.show(ui, &mut self.workbench.rows) {
                    self.needs_replot = true;
                }
            });

        if self.needs_replot {
            self.needs_replot = false;
            self.replot(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot_panel.show(ui);
        });

        self.render_error_window(ctx);
    }
}

/// Launch the browser in a native window. Blocks until the window closes.
pub fn run_genplot(title: &str, factory: Box<dyn SourceFactory>) -> eframe::Result<()> {
    run_genplot_with_files(title, factory, &[])
}

/// Launch the browser with a set of files opened before the first frame.
pub fn run_genplot_with_files(
    title: &str,
    factory: Box<dyn SourceFactory>,
    files: &[&Path],
) -> eframe::Result<()> {
    let mut options = eframe::NativeOptions::default();
    options.viewport = egui::ViewportBuilder::default().with_inner_size([1400.0, 900.0]);
    let mut app = GenPlotApp::new(factory);
    for path in files {
        if let Err(e) = app.workbench.open_file(path, app.factory.as_ref()) {
            tracing::error!(file = %path.display(), error = %e, "could not open file");
        }
    }
    app.refresh_tree();
    eframe::run_native(title, options, Box::new(|_cc| Ok(Box::new(app))))
}
