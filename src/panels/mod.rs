pub mod browser_ui;
pub mod plot_ui;
pub mod rows_ui;

pub use browser_ui::{BrowseAction, BrowserPanel};
pub use plot_ui::PlotPanel;
pub use rows_ui::RowsPanel;
