use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use galaxy_core::Node;

use crate::graph::{GalaxyState, InfoTab};

fn overview(ui: &mut egui::Ui, node: &Node) {
    if node.content.trim().is_empty() {
        ui.weak("No content");
    } else {
        egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
            ui.label(&node.content);
        });
    }
}

fn connections(ui: &mut egui::Ui, node: &Node) {
    if node.connections.is_empty() {
        ui.weak("No connections");
        return;
    }
    for conn in &node.connections {
        ui.horizontal(|ui| {
            ui.label(if conn.label.is_empty() { "(unnamed)" } else { conn.label.as_str() });
            ui.weak(conn.kind.tag());
            if let Some(rel) = conn.relation {
                ui.weak(rel.tag());
            }
        });
    }
}

fn metadata(ui: &mut egui::Ui, node: &Node) {
    egui::Grid::new("node_metadata").num_columns(2).show(ui, |ui| {
        ui.label("Created");
        ui.label(node.created.as_deref().unwrap_or("-"));
        ui.end_row();
        ui.label("Modified");
        ui.label(node.modified.as_deref().unwrap_or("-"));
        ui.end_row();
        ui.label("Importance");
        ui.label(format!("{:.2}", node.importance));
        ui.end_row();
        ui.label("Depth");
        ui.label(format!("{:.2}", node.depth));
        ui.end_row();
        ui.label("Citations");
        ui.label(node.citations.len().to_string());
        ui.end_row();
    });
}

/// Detail card for the primary selection.
pub fn node_info(mut contexts: EguiContexts, mut st: ResMut<GalaxyState>) {
    let Some(id) = st.interaction.primary() else {
        return;
    };
    let Some(node) = st.model.node(id).cloned() else {
        return;
    };

    let mut tab = st.ui.info_tab;
    let mut close = false;
    egui::TopBottomPanel::bottom("node_info")
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                ui.heading(node.display_label());
                ui.weak(node.kind.tag());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    close = ui.button("Close").clicked();
                });
            });
            ui.horizontal(|ui| {
                ui.selectable_value(&mut tab, InfoTab::Overview, "Overview");
                ui.selectable_value(&mut tab, InfoTab::Connections, "Connections");
                ui.selectable_value(&mut tab, InfoTab::Metadata, "Metadata");
            });
            ui.separator();
            match tab {
                InfoTab::Overview => overview(ui, &node),
                InfoTab::Connections => connections(ui, &node),
                InfoTab::Metadata => metadata(ui, &node),
            }
        });

    st.ui.info_tab = tab;
    if close {
        st.click_node(id);
    }
}
