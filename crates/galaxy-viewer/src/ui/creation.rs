use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};
use galaxy_core::NodeKind;

use crate::graph::GalaxyState;

/// Modal type picker shown while a new node is being placed.
pub fn creation_panel(mut contexts: EguiContexts, mut st: ResMut<GalaxyState>) {
    let Some(request) = st.interaction.placement() else {
        return;
    };

    let mut chosen: Option<NodeKind> = None;
    let mut cancel = false;
    egui::Window::new("Create Node")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(contexts.ctx_mut(), |ui| {
            let p = request.position;
            ui.weak(format!("at ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
            ui.add_space(4.0);
            egui::Grid::new("node_kinds").num_columns(2).show(ui, |ui| {
                for (i, kind) in NodeKind::CREATABLE.iter().enumerate() {
                    if ui.button(kind.display_name()).clicked() {
                        chosen = Some(*kind);
                    }
                    if i % 2 == 1 {
                        ui.end_row();
                    }
                }
            });
            ui.add_space(4.0);
            cancel = ui.button("Cancel").clicked();
        });

    if let Some(kind) = chosen {
        st.choose_kind(kind);
    } else if cancel {
        st.cancel();
    }
}
