use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};

use crate::app::input::NavKeys;
use crate::graph::GalaxyState;
use crate::render::CameraRig;

pub fn handle_shortcuts(
    mut contexts: EguiContexts,
    mut st: ResMut<GalaxyState>,
    mut rig: ResMut<CameraRig>,
    mut keys: ResMut<NavKeys>,
) {
    let ctx = contexts.ctx_mut();
    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        st.escape();
    }

    if ctx.wants_keyboard_input() {
        return;
    }

    if ctx.input(|i| i.key_pressed(egui::Key::Tab)) {
        rig.toggle_mode(&mut keys);
    }
}
