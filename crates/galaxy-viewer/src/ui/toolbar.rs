use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};

use crate::app::input::NavKeys;
use crate::graph::{GalaxyState, InteractionState};
use crate::render::{CameraMode, CameraRig};
use crate::ui::EDGE_PADDING;

const MULTI_HINT: &str = "Shift+click more nodes to combine them";

fn status_line(state: InteractionState, multi_selecting: bool) -> Option<&'static str> {
    match state {
        InteractionState::CreatingEdge => Some("Drawing edge: click a node, or empty space for a new one"),
        InteractionState::PlacingNewNode => Some("Choose a type for the new node"),
        InteractionState::MultiSelecting => Some(MULTI_HINT),
        InteractionState::Idle | InteractionState::NodeSelected => multi_selecting.then_some(MULTI_HINT),
    }
}

pub fn toolbar(
    mut contexts: EguiContexts,
    mut st: ResMut<GalaxyState>,
    mut rig: ResMut<CameraRig>,
    mut keys: ResMut<NavKeys>,
) {
    let ctx = contexts.ctx_mut();
    egui::Area::new(egui::Id::new("toolbar"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-EDGE_PADDING, EDGE_PADDING))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    let first_person = rig.mode() == CameraMode::FirstPerson;
                    let label = if first_person { "Orbit view" } else { "First person" };
                    if ui.button(label).clicked() {
                        rig.toggle_mode(&mut keys);
                    }

                    let mut depth = st.preview_depth();
                    if ui.checkbox(&mut depth, "Preview depth").changed() {
                        st.set_preview_depth(depth);
                    }

                    let controls = if st.ui.show_controls { "Hide controls" } else { "Show controls" };
                    if ui.button(controls).clicked() {
                        st.ui.show_controls = !st.ui.show_controls;
                    }
                });

                if st.interaction.can_synthesize() {
                    let n = st.interaction.multi_selected().len();
                    if ui.button(format!("Ignite Synthesis ({n})")).clicked() {
                        st.synthesize();
                    }
                }
                if let Some(line) = status_line(st.state(), st.interaction.is_multi_selecting()) {
                    ui.label(line);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_hint_shows_with_a_primary_selection() {
        assert_eq!(status_line(InteractionState::NodeSelected, true), Some(MULTI_HINT));
        assert_eq!(status_line(InteractionState::NodeSelected, false), None);
        assert_eq!(status_line(InteractionState::Idle, false), None);
        assert_ne!(status_line(InteractionState::CreatingEdge, true), Some(MULTI_HINT));
    }
}
