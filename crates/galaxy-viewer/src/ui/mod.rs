pub mod creation;
pub mod labels;
pub mod node_info;
pub mod panel;
pub mod shortcuts;
pub mod toolbar;

pub use creation::creation_panel;
pub use labels::node_labels;
pub use node_info::node_info;
pub use panel::ui_panel;
pub use shortcuts::handle_shortcuts;
pub use toolbar::toolbar;

pub const PANEL_W: f32 = 280.0;
pub const EDGE_PADDING: f32 = 12.0;
