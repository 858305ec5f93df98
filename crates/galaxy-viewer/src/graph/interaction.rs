//! Selection, multi-selection and the edge/node creation workflow.
//!
//! Pointer systems translate raw input into the calls below; everything that
//! changes the graph goes through [`GraphModel`].

use bevy::prelude::Vec3;
use galaxy_core::{Connection, NodeId, NodeKind};
use std::collections::HashSet;

use crate::graph::model::{GraphModel, NewNode};
use crate::util::config::SelfLoopPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    NodeSelected,
    MultiSelecting,
    CreatingEdge,
    PlacingNewNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSession {
    pub source: NodeId,
    pub end: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeCreationRequest {
    pub position: Vec3,
}

/// What a gesture ended up doing, mostly for logging and redraw decisions.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored,
    Selected(NodeId),
    Deselected,
    MultiToggled { id: NodeId, member: bool },
    SelectionCleared,
    EdgeStarted(NodeId),
    EdgeCreated { source: NodeId, target: NodeId },
    EdgeRejected { source: NodeId, target: NodeId },
    PlacementOpened(Vec3),
    NodeCreated(NodeId),
    Cancelled,
}

#[derive(Debug, Default)]
pub struct Interaction {
    primary: Option<NodeId>,
    multi: HashSet<NodeId>,
    edge: Option<EdgeSession>,
    placing: Option<NodeCreationRequest>,
    self_loops: SelfLoopPolicy,
}

impl Interaction {
    pub fn new(self_loops: SelfLoopPolicy) -> Self {
        Self {
            self_loops,
            ..Self::default()
        }
    }

    pub fn state(&self) -> InteractionState {
        if self.placing.is_some() {
            InteractionState::PlacingNewNode
        } else if self.edge.is_some() {
            InteractionState::CreatingEdge
        } else if self.primary.is_some() {
            InteractionState::NodeSelected
        } else if !self.multi.is_empty() {
            InteractionState::MultiSelecting
        } else {
            InteractionState::Idle
        }
    }

    /// Multi-selection runs alongside the other states; `state` only reports
    /// it when nothing else is going on.
    pub fn is_multi_selecting(&self) -> bool {
        !self.multi.is_empty()
    }

    pub fn primary(&self) -> Option<NodeId> {
        self.primary
    }

    pub fn is_multi_selected(&self, id: NodeId) -> bool {
        self.multi.contains(&id)
    }

    pub fn multi_selected(&self) -> &HashSet<NodeId> {
        &self.multi
    }

    pub fn edge_session(&self) -> Option<&EdgeSession> {
        self.edge.as_ref()
    }

    pub fn placement(&self) -> Option<NodeCreationRequest> {
        self.placing
    }

    /// Plain click on a node: completes a pending edge, else toggles selection.
    pub fn click_node(&mut self, id: NodeId, model: &mut GraphModel) -> Outcome {
        if self.placing.is_some() {
            return Outcome::Ignored;
        }
        if let Some(session) = self.edge.take() {
            let source = session.source;
            if source == id && self.self_loops == SelfLoopPolicy::Reject {
                return Outcome::EdgeRejected { source, target: id };
            }
            model.connect(source, id, None);
            return Outcome::EdgeCreated { source, target: id };
        }
        if self.primary == Some(id) {
            self.primary = None;
            Outcome::Deselected
        } else {
            self.primary = Some(id);
            Outcome::Selected(id)
        }
    }

    /// Shift-click: membership toggle, independent of the primary selection.
    pub fn shift_click_node(&mut self, id: NodeId) -> Outcome {
        if self.placing.is_some() {
            return Outcome::Ignored;
        }
        let member = if self.multi.remove(&id) {
            false
        } else {
            self.multi.insert(id);
            true
        };
        Outcome::MultiToggled { id, member }
    }

    /// Shift-drag off a node. The pending endpoint starts on the source itself.
    pub fn start_edge(&mut self, source: NodeId, model: &GraphModel) -> Outcome {
        if self.placing.is_some() {
            return Outcome::Ignored;
        }
        let end = model.strict_position(source).unwrap_or(Vec3::ZERO);
        self.edge = Some(EdgeSession { source, end });
        Outcome::EdgeStarted(source)
    }

    pub fn update_edge_end(&mut self, end: Vec3) {
        if let Some(session) = self.edge.as_mut() {
            session.end = end;
        }
    }

    /// Click that hit no node. `point` is where it landed in the world.
    pub fn click_background(&mut self, point: Vec3) -> Outcome {
        if self.placing.is_some() {
            return Outcome::Ignored;
        }
        if self.edge.is_some() {
            self.placing = Some(NodeCreationRequest { position: point });
            return Outcome::PlacementOpened(point);
        }
        self.primary = None;
        self.multi.clear();
        Outcome::SelectionCleared
    }

    /// Resolves a pending placement. When an edge was being drawn the new node
    /// becomes its target.
    pub fn choose_kind(&mut self, kind: NodeKind, model: &mut GraphModel) -> Outcome {
        let Some(request) = self.placing.take() else {
            return Outcome::Ignored;
        };
        let id = model.add_node(NewNode::of_kind(kind, request.position));
        if let Some(session) = self.edge.take() {
            model.connect(session.source, id, None);
        }
        Outcome::NodeCreated(id)
    }

    /// Closes the placement panel and drops any edge in progress.
    pub fn cancel(&mut self) -> Outcome {
        if self.placing.take().is_some() | self.edge.take().is_some() {
            Outcome::Cancelled
        } else {
            Outcome::Ignored
        }
    }

    pub fn clear_selection(&mut self) -> Outcome {
        self.primary = None;
        self.multi.clear();
        Outcome::SelectionCleared
    }

    pub fn can_synthesize(&self) -> bool {
        self.multi.len() >= 2
    }

    /// Combines the multi-selection into one SYNTHESIS node linked to each member.
    pub fn synthesize(&mut self, model: &mut GraphModel) -> Outcome {
        if !self.can_synthesize() {
            return Outcome::Ignored;
        }
        let mut members: Vec<NodeId> = self.multi.drain().collect();
        members.sort();

        let position = model.centroid(&members).unwrap_or(Vec3::ZERO) + Vec3::Y * 2.0;
        let labels: Vec<&str> = members
            .iter()
            .filter_map(|id| model.node(*id).map(|n| n.display_label()))
            .collect();
        let connections = members
            .iter()
            .filter_map(|id| model.node(*id))
            .map(|n| Connection {
                target: n.id,
                label: n.label.clone(),
                kind: n.kind,
                relation: None,
            })
            .collect();

        let new = NewNode {
            label: format!("Synthesis: {}", labels.join(" + ")),
            kind: NodeKind::Synthesis,
            position,
            size: 1.3,
            importance: 1.0,
            connections,
        };
        Outcome::NodeCreated(model.add_node(new))
    }
}
