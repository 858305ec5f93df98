use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GalaxyState;
use crate::render::camera::MainCamera;
use crate::render::nodes::NodeVisual;

/// Screen-space name tags just above each drawn node.
pub fn node_labels(
    mut contexts: EguiContexts,
    st: Res<GalaxyState>,
    cam_q: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    nodes: Query<(&NodeVisual, &GlobalTransform)>,
) {
    if !st.ui.show_labels {
        return;
    }
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    let ctx = contexts.ctx_mut();

    for (visual, tf) in nodes.iter() {
        let Some(node) = st.model.node(visual.id) else {
            continue;
        };
        let anchor = tf.translation() + Vec3::Y * visual.radius;
        let Some(screen) = camera.world_to_viewport(cam_tf, anchor) else {
            continue;
        };
        egui::Area::new(egui::Id::new(("node_label", visual.id.0)))
            .order(egui::Order::Background)
            .interactable(false)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .fixed_pos(egui::pos2(screen.x, screen.y))
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(egui::Color32::from_black_alpha(180))
                    .rounding(4.0)
                    .inner_margin(egui::Margin::symmetric(6.0, 2.0))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(node.display_label())
                                .color(egui::Color32::WHITE)
                                .small(),
                        );
                    });
            });
    }
}
