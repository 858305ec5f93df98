use bevy::prelude::*;

/// Gizmo line widths are per config group, so each width gets its own group.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct ThinLines;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct MediumLines;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct ThickLines;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct GridLines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineWidth {
    Thin,
    Medium,
    Thick,
}

impl LineWidth {
    pub fn pixels(self) -> f32 {
        match self {
            LineWidth::Thin => 2.0,
            LineWidth::Medium => 2.5,
            LineWidth::Thick => 3.0,
        }
    }
}

pub fn register_line_groups(app: &mut App) {
    app.init_gizmo_group::<ThinLines>()
        .init_gizmo_group::<MediumLines>()
        .init_gizmo_group::<ThickLines>()
        .init_gizmo_group::<GridLines>();
}

pub fn configure_line_widths(mut store: ResMut<GizmoConfigStore>) {
    store.config_mut::<ThinLines>().0.line_width = LineWidth::Thin.pixels();
    store.config_mut::<MediumLines>().0.line_width = LineWidth::Medium.pixels();
    store.config_mut::<ThickLines>().0.line_width = LineWidth::Thick.pixels();
    store.config_mut::<GridLines>().0.line_width = 1.0;
}
