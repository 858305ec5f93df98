pub mod camera;
pub mod edges;
pub mod grid;
pub mod lines;
pub mod nodes;
pub mod picking;

pub use camera::{camera_input, drive_camera, setup_scene, track_zoom, CameraMode, CameraRig};
pub use edges::{animate_markers, draw_edge_preview, draw_edges, rebuild_edges, EdgeCurves};
pub use grid::{draw_grid, note_pointer_activity, GridFade};
pub use lines::{configure_line_widths, register_line_groups};
pub use nodes::{animate_nodes, spawn_nodes};
pub use picking::{pointer_interaction, PointerTracker};
