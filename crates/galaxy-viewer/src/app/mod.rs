use bevy::prelude::*;
use bevy_egui::EguiSet;
use std::time::Duration;

use crate::app::input::NavKeys;
use crate::graph::model::{self, GraphModel};
use crate::graph::GalaxyState;
use crate::render::{self, CameraRig, EdgeCurves, GridFade, PointerTracker};
use crate::util::config::{self, ViewerConfig};
use crate::util::prefs::{FilePrefStore, MemoryPrefStore, PrefStore};

pub mod input;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
enum GalaxySet {
    Input,
    Ui,
    Pointer,
    Camera,
    Scene,
}

/// Settings as loaded at startup; the control panel writes its sliders back here.
#[derive(Resource)]
pub struct ActiveConfig(pub ViewerConfig);

pub struct GalaxyViewerPlugin;

fn open_prefs() -> Box<dyn PrefStore> {
    match FilePrefStore::open_default() {
        Some(store) => Box::new(store),
        None => {
            tracing::warn!("no data directory; preferences will not be saved");
            Box::new(MemoryPrefStore::default())
        }
    }
}

fn build_state(cfg: &ViewerConfig) -> GalaxyState {
    let nodes = model::load_or_sample(cfg.dataset_path.as_deref());
    let graph = GraphModel::new(nodes, cfg.relation_policy);
    tracing::info!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        "graph ready"
    );
    GalaxyState::new(graph, cfg, open_prefs())
}

impl Plugin for GalaxyViewerPlugin {
    fn build(&self, app: &mut App) {
        let cfg = config::load_or_default();
        render::register_line_groups(app);

        app.insert_resource(build_state(&cfg))
            .insert_resource(CameraRig::from_config(&cfg))
            .insert_resource(GridFade::new(Duration::from_millis(cfg.grid_idle_ms)))
            .insert_resource(ActiveConfig(cfg))
            .init_resource::<NavKeys>()
            .init_resource::<PointerTracker>()
            .init_resource::<EdgeCurves>()
            .configure_sets(
                Update,
                (
                    GalaxySet::Input,
                    GalaxySet::Ui,
                    GalaxySet::Pointer,
                    GalaxySet::Camera,
                    GalaxySet::Scene,
                )
                    .chain(),
            )
            .add_systems(Startup, (render::setup_scene, render::configure_line_widths))
            .add_systems(
                PreUpdate,
                input::shield_egui_from_nav_keys
                    .after(EguiSet::ProcessInput)
                    .before(EguiSet::BeginFrame),
            )
            .add_systems(
                Update,
                (input::track_nav_keys, render::note_pointer_activity).in_set(GalaxySet::Input),
            )
            .add_systems(
                Update,
                (
                    crate::ui::handle_shortcuts,
                    crate::ui::toolbar,
                    crate::ui::ui_panel,
                    crate::ui::node_info,
                    crate::ui::creation_panel,
                    crate::ui::node_labels,
                )
                    .chain()
                    .in_set(GalaxySet::Ui),
            )
            .add_systems(Update, render::pointer_interaction.in_set(GalaxySet::Pointer))
            .add_systems(
                Update,
                (render::camera_input, render::drive_camera, render::track_zoom)
                    .chain()
                    .in_set(GalaxySet::Camera),
            )
            .add_systems(
                Update,
                (
                    render::spawn_nodes,
                    render::animate_nodes,
                    render::rebuild_edges,
                    render::draw_edges,
                    render::animate_markers,
                    render::draw_edge_preview,
                    render::draw_grid,
                )
                    .chain()
                    .in_set(GalaxySet::Scene),
            );
    }
}
