use bevy::prelude::{Resource, Vec3};
use galaxy_core::{NodeId, NodeKind};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::graph::interaction::{Interaction, InteractionState, Outcome};
use crate::graph::model::GraphModel;
use crate::util::config::ViewerConfig;
use crate::util::prefs::{self, PrefStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfoTab {
    #[default]
    Overview,
    Connections,
    Metadata,
}

pub struct UiState {
    pub hovered: Option<NodeId>,
    pub info_tab: InfoTab,
    pub show_controls: bool,
    pub node_scale: f32,
    pub edge_opacity: f32,
    pub show_labels: bool,
}

impl UiState {
    fn from_config(cfg: &ViewerConfig) -> Self {
        Self {
            hovered: None,
            info_tab: InfoTab::Overview,
            show_controls: true,
            node_scale: cfg.node_scale,
            edge_opacity: cfg.edge_opacity,
            show_labels: cfg.show_labels,
        }
    }
}

/// Everything the scene renders from. Only this resource mutates the graph or
/// the selection; visuals read it.
#[derive(Resource)]
pub struct GalaxyState {
    pub model: GraphModel,
    pub interaction: Interaction,
    pub ui: UiState,
    pub zoom: f32,
    preview_depth: bool,
    prefs: Box<dyn PrefStore>,
    /// Set when node entities have to be respawned.
    pub needs_redraw: AtomicBool,
}

impl GalaxyState {
    pub fn new(model: GraphModel, cfg: &ViewerConfig, prefs: Box<dyn PrefStore>) -> Self {
        let preview_depth = prefs::load_preview_depth(prefs.as_ref());
        Self {
            model,
            interaction: Interaction::new(cfg.self_loops),
            ui: UiState::from_config(cfg),
            zoom: 1.0,
            preview_depth,
            prefs,
            needs_redraw: AtomicBool::new(true),
        }
    }

    pub fn preview_depth(&self) -> bool {
        self.preview_depth
    }

    pub fn set_preview_depth(&mut self, enabled: bool) {
        if enabled == self.preview_depth {
            return;
        }
        self.preview_depth = enabled;
        prefs::store_preview_depth(self.prefs.as_mut(), enabled);
        tracing::debug!(enabled, "depth preview toggled");
    }

    pub fn mark_dirty(&self) {
        self.needs_redraw.store(true, Ordering::Relaxed);
    }

    pub fn take_dirty(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Relaxed)
    }

    pub fn set_node_scale(&mut self, scale: f32) {
        if (self.ui.node_scale - scale).abs() > f32::EPSILON {
            self.ui.node_scale = scale;
            self.mark_dirty();
        }
    }

    fn record(&mut self, outcome: Outcome) -> Outcome {
        match &outcome {
            Outcome::Ignored => {}
            Outcome::EdgeRejected { source, target } => {
                tracing::debug!(?source, ?target, "self-loop rejected");
            }
            Outcome::NodeCreated(id) => {
                tracing::info!(?id, nodes = self.model.nodes().len(), "node created");
                self.mark_dirty();
            }
            Outcome::EdgeCreated { source, target } => {
                tracing::info!(?source, ?target, edges = self.model.edges().len(), "edge created");
            }
            other => {
                tracing::debug!(outcome = ?other, state = ?self.interaction.state(), "interaction");
            }
        }
        outcome
    }

    pub fn state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn click_node(&mut self, id: NodeId) -> Outcome {
        let out = self.interaction.click_node(id, &mut self.model);
        self.record(out)
    }

    pub fn shift_click_node(&mut self, id: NodeId) -> Outcome {
        let out = self.interaction.shift_click_node(id);
        self.record(out)
    }

    pub fn start_edge(&mut self, source: NodeId) -> Outcome {
        let out = self.interaction.start_edge(source, &self.model);
        self.record(out)
    }

    pub fn update_edge_end(&mut self, end: Vec3) {
        self.interaction.update_edge_end(end);
    }

    pub fn click_background(&mut self, point: Vec3) -> Outcome {
        let out = self.interaction.click_background(point);
        self.record(out)
    }

    pub fn choose_kind(&mut self, kind: NodeKind) -> Outcome {
        let out = self.interaction.choose_kind(kind, &mut self.model);
        self.record(out)
    }

    pub fn cancel(&mut self) -> Outcome {
        let out = self.interaction.cancel();
        self.record(out)
    }

    pub fn clear_selection(&mut self) -> Outcome {
        let out = self.interaction.clear_selection();
        self.record(out)
    }

    pub fn synthesize(&mut self) -> Outcome {
        let out = self.interaction.synthesize(&mut self.model);
        self.record(out)
    }

    /// Esc: back out of creation first, then drop the selection.
    pub fn escape(&mut self) -> Outcome {
        match self.cancel() {
            Outcome::Ignored => self.clear_selection(),
            out => out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::sample_nodes;
    use crate::util::config::RelationPolicy;
    use crate::util::prefs::{FilePrefStore, MemoryPrefStore};
    use tempfile::tempdir;

    fn state_with(prefs: Box<dyn PrefStore>) -> GalaxyState {
        let model = GraphModel::new(sample_nodes().expect("sample"), RelationPolicy::Random);
        GalaxyState::new(model, &ViewerConfig::default(), prefs)
    }

    #[test]
    fn preview_depth_persists_false_across_restart() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("prefs.toml");

        let mut st = state_with(Box::new(FilePrefStore::open(&path)));
        assert!(st.preview_depth());
        st.set_preview_depth(false);

        let reloaded = state_with(Box::new(FilePrefStore::open(&path)));
        assert!(!reloaded.preview_depth());
    }

    #[test]
    fn node_creation_marks_redraw() {
        let mut st = state_with(Box::new(MemoryPrefStore::default()));
        assert!(st.take_dirty());
        assert!(!st.take_dirty());

        st.start_edge(NodeId(1));
        st.click_background(Vec3::new(0.0, 5.0, -50.0));
        assert!(matches!(st.choose_kind(NodeKind::Myth), Outcome::NodeCreated(_)));
        assert!(st.take_dirty());
    }

    #[test]
    fn escape_cancels_before_clearing_selection() {
        let mut st = state_with(Box::new(MemoryPrefStore::default()));
        st.click_node(NodeId(2));
        st.start_edge(NodeId(1));

        assert_eq!(st.escape(), Outcome::Cancelled);
        assert_eq!(st.interaction.primary(), Some(NodeId(2)));
        assert_eq!(st.escape(), Outcome::SelectionCleared);
        assert_eq!(st.state(), InteractionState::Idle);
    }
}
