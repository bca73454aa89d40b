//! File and record browser: a tree of open files, their groups and
//! datasets with a record-size column.

use crate::data::session::BrowseNode;

/// What the user did in the browser this frame.
pub enum BrowseAction {
    /// A dataset was double-clicked and should become a new plot row.
    AddRecord { file: String, path: String },
}

#[derive(Default)]
pub struct BrowserPanel {
    /// File whose subtree was last clicked; target of Close Selected.
    pub selected_file: Option<String>,
}

impl BrowserPanel {
    pub fn show(&mut self, ui: &mut egui::Ui, tree: &[BrowseNode]) -> Option<BrowseAction> {
        if tree.is_empty() {
            ui.label("No files loaded");
            return None;
        }
        let mut action = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for node in tree {
                    let selected = self.selected_file.as_deref() == Some(node.file.as_str());
                    let header = egui::CollapsingHeader::new(egui::RichText::new(&node.label).strong())
                        .id_salt(&node.file)
                        .default_open(true);
                    let resp = header.show(ui, |ui| {
                        for child in &node.children {
                            self.show_node(ui, child, &mut action);
                        }
                    });
                    if resp.header_response.clicked() {
                        self.selected_file = Some(node.file.clone());
                    }
                    if selected {
                        resp.header_response.highlight();
                    }
                }
            });
        action
    }

    fn show_node(&mut self, ui: &mut egui::Ui, node: &BrowseNode, action: &mut Option<BrowseAction>) {
        if let Some(shape) = &node.shape {
            let text = format!("{}  {}", node.label, shape_text(shape));
            let resp = ui.add(egui::Label::new(text).sense(egui::Sense::click()));
            if resp.clicked() {
                self.selected_file = Some(node.file.clone());
            }
            if resp.double_clicked() {
                *action = Some(BrowseAction::AddRecord {
                    file: node.file.clone(),
                    path: node.path.clone(),
                });
            }
        } else {
            let resp = egui::CollapsingHeader::new(&node.label)
                .id_salt((&node.file, &node.path))
                .show(ui, |ui| {
                    for child in &node.children {
                        self.show_node(ui, child, action);
                    }
                });
            if resp.header_response.clicked() {
                self.selected_file = Some(node.file.clone());
            }
        }
    }
}

fn shape_text(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("({})", dims.join(", "))
}
