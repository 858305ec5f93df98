use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};

use crate::app::ActiveConfig;
use crate::graph::GalaxyState;
use crate::render::{CameraMode, CameraRig};
use crate::ui::PANEL_W;
use crate::util::config;

fn save_visual_settings(st: &GalaxyState, active: &mut ActiveConfig) {
    let cfg = &mut active.0;
    cfg.node_scale = st.ui.node_scale;
    cfg.edge_opacity = st.ui.edge_opacity;
    cfg.show_labels = st.ui.show_labels;
    match config::save(cfg) {
        Ok(()) => tracing::info!("viewer settings saved"),
        Err(err) => tracing::warn!("could not save viewer settings: {err:#}"),
    }
}

pub fn ui_panel(
    mut contexts: EguiContexts,
    mut st: ResMut<GalaxyState>,
    rig: Res<CameraRig>,
    mut active: ResMut<ActiveConfig>,
) {
    if !st.ui.show_controls {
        return;
    }
    egui::SidePanel::left("controls")
        .exact_width(PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Knowledge Galaxy");
            ui.label(format!("nodes: {}", st.model.nodes().len()));
            ui.label(format!("edges: {}", st.model.edges().len()));
            ui.separator();

            ui.heading("Navigation");
            match rig.mode() {
                CameraMode::Orbit => {
                    ui.label("Left-drag: rotate");
                    ui.label("Right-drag: pan");
                    ui.label("Scroll: zoom");
                }
                CameraMode::FirstPerson => {
                    ui.label("W/A/S/D: move");
                    ui.label("Space / Ctrl: up / down");
                    ui.label("Shift: boost");
                    ui.label("Right-drag: look around");
                }
            }
            ui.label("Tab: switch camera mode");

            ui.add_space(8.0);
            ui.heading("Interaction");
            ui.label("Click a node: select / deselect");
            ui.label("Shift+click: add to multi-selection");
            ui.label("Shift+drag from a node: draw an edge");
            ui.label("Click empty space while drawing: new node");
            ui.label("Esc: cancel / clear selection");

            ui.add_space(8.0);
            ui.separator();
            ui.heading("Visual Settings");

            let mut scale = st.ui.node_scale;
            ui.add(egui::Slider::new(&mut scale, 0.5..=2.0).step_by(0.1).text("node size"));
            st.set_node_scale(scale);

            ui.add(
                egui::Slider::new(&mut st.ui.edge_opacity, 0.1..=1.0)
                    .step_by(0.1)
                    .text("edge opacity"),
            );
            ui.checkbox(&mut st.ui.show_labels, "Show labels");

            ui.add_space(8.0);
            if ui.button("Save settings").clicked() {
                save_visual_settings(&st, &mut active);
            }
        });
}
