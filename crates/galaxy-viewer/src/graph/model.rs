use anyhow::Context;
use bevy::prelude::Vec3;
use galaxy_core::{Connection, Edge, EdgeId, Node, NodeId, NodeKind, RelationKind};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::util::config::RelationPolicy;
use crate::util::ids::next_node_id;

const SAMPLE_GRAPH: &str = include_str!("../../assets/sample_graph.json");

pub fn sample_nodes() -> anyhow::Result<Vec<Node>> {
    serde_json::from_str(SAMPLE_GRAPH).context("built-in sample graph is not valid")
}

pub fn load_nodes(path: &Path) -> anyhow::Result<Vec<Node>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse dataset {}", path.display()))
}

/// Loads `path` when given, falling back to the built-in sample on any error.
pub fn load_or_sample(path: Option<&Path>) -> Vec<Node> {
    if let Some(path) = path {
        match load_nodes(path) {
            Ok(nodes) => {
                tracing::info!(path = %path.display(), nodes = nodes.len(), "loaded dataset");
                return nodes;
            }
            Err(err) => tracing::warn!("{err:#}; using the sample dataset"),
        }
    }
    sample_nodes().unwrap_or_else(|err| {
        tracing::error!("{err:#}");
        Vec::new()
    })
}

/// Attributes of a node about to be created; everything else is defaulted.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub label: String,
    pub kind: NodeKind,
    pub position: Vec3,
    pub size: f32,
    pub importance: f32,
    pub connections: Vec<Connection>,
}

impl NewNode {
    pub fn of_kind(kind: NodeKind, position: Vec3) -> Self {
        Self {
            label: format!("New {}", kind.display_name()),
            kind,
            position,
            size: 1.0,
            importance: 0.5,
            connections: Vec::new(),
        }
    }
}

/// Node list plus the edge list derived from it. Every node mutation re-derives.
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    policy: RelationPolicy,
    revision: u64,
}

impl GraphModel {
    pub fn new(nodes: Vec<Node>, policy: RelationPolicy) -> Self {
        let edges = derive_edges(&nodes, &[], policy);
        Self {
            nodes,
            edges,
            policy,
            revision: 0,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Bumped on every mutation so render caches know when to rebuild.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn rederive(&mut self) {
        self.edges = derive_edges(&self.nodes, &self.edges, self.policy);
        self.revision += 1;
    }

    pub fn add_node(&mut self, new: NewNode) -> NodeId {
        let id = next_node_id(&self.nodes);
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let mut node = Node::new(id, new.label, new.kind, new.position.to_array());
        node.size = new.size;
        node.importance = new.importance;
        node.created = Some(today.clone());
        node.modified = Some(today);
        node.connections = new.connections;
        self.nodes.push(node);
        self.rederive();
        id
    }

    /// Records `source -> target` as a connection on the source node. Returns
    /// false when the source is unknown or the pair is already connected.
    pub fn connect(&mut self, source: NodeId, target: NodeId, relation: Option<RelationKind>) -> bool {
        let (label, kind) = match self.node(target) {
            Some(t) => (t.label.clone(), t.kind),
            None => (String::new(), NodeKind::Custom),
        };
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == source) else {
            return false;
        };
        if node.connections.iter().any(|c| c.target == target) {
            return false;
        }
        node.connections.push(Connection {
            target,
            label,
            kind,
            relation,
        });
        node.modified = Some(chrono::Local::now().format("%Y-%m-%d").to_string());
        self.rederive();
        true
    }

    /// Stored (not animated) position, for edges and picking targets.
    pub fn strict_position(&self, id: NodeId) -> Option<Vec3> {
        self.node(id)?.strict_position().map(Vec3::from_array)
    }

    pub fn centroid(&self, ids: &[NodeId]) -> Option<Vec3> {
        let points: Vec<Vec3> = ids
            .iter()
            .filter_map(|id| self.node(*id)?.render_position().map(Vec3::from_array))
            .collect();
        if points.is_empty() {
            return None;
        }
        Some(points.iter().copied().sum::<Vec3>() / points.len() as f32)
    }

    /// Edges whose endpoints both resolve to nodes with valid positions.
    pub fn renderable_edges(&self) -> impl Iterator<Item = (&Edge, Vec3, Vec3)> + '_ {
        let positions: HashMap<NodeId, Vec3> = self
            .nodes
            .iter()
            .filter_map(|n| Some((n.id, Vec3::from_array(n.strict_position()?))))
            .collect();
        self.edges.iter().filter_map(move |e| {
            let a = *positions.get(&e.source)?;
            let b = *positions.get(&e.target)?;
            Some((e, a, b))
        })
    }
}

/// Builds the edge list from per-node connection lists. A pair that already
/// exists in either direction is skipped. Pairs seen in `previous` keep their
/// relation and weight so re-deriving doesn't reshuffle random assignments.
pub fn derive_edges(nodes: &[Node], previous: &[Edge], policy: RelationPolicy) -> Vec<Edge> {
    let known: HashMap<(NodeId, NodeId), &Edge> =
        previous.iter().map(|e| ((e.source, e.target), e)).collect();
    let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
    let mut edges = Vec::new();
    let mut rng = rand::thread_rng();

    for node in nodes {
        for conn in &node.connections {
            let pair = (node.id, conn.target);
            if seen.contains(&(conn.target, node.id)) || !seen.insert(pair) {
                continue;
            }
            let prior = known.get(&pair);
            let kind = conn
                .relation
                .or_else(|| prior.and_then(|e| e.kind))
                .unwrap_or_else(|| match policy {
                    RelationPolicy::Random => {
                        RelationKind::ALL[rng.gen_range(0..RelationKind::ALL.len())]
                    }
                    RelationPolicy::Fixed { kind } => kind,
                });
            let weight = prior.map(|e| e.weight).unwrap_or_else(|| match policy {
                RelationPolicy::Random => rng.gen_range(0.5..1.0),
                RelationPolicy::Fixed { .. } => 1.0,
            });
            edges.push(Edge {
                id: EdgeId(edges.len() as u64 + 1),
                source: node.id,
                target: conn.target,
                kind: Some(kind),
                weight,
            });
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(target: u64) -> Connection {
        Connection {
            target: NodeId(target),
            label: String::new(),
            kind: NodeKind::Concept,
            relation: None,
        }
    }

    fn node(id: u64, pos: [f32; 3], targets: &[u64]) -> Node {
        let mut n = Node::new(NodeId(id), format!("n{id}"), NodeKind::Concept, pos);
        n.connections = targets.iter().map(|t| conn(*t)).collect();
        n
    }

    const FIXED: RelationPolicy = RelationPolicy::Fixed {
        kind: RelationKind::Is,
    };

    #[test]
    fn reverse_connection_does_not_duplicate_edge() {
        let nodes = vec![node(1, [0.0, 0.0, 0.0], &[2]), node(2, [5.0, 1.0, 3.0], &[1])];
        let edges = derive_edges(&nodes, &[], FIXED);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, NodeId(1));
        assert_eq!(edges[0].target, NodeId(2));
    }

    #[test]
    fn sample_graph_has_no_mirrored_pairs() {
        let nodes = sample_nodes().expect("sample graph");
        assert_eq!(nodes.len(), 10);
        let model = GraphModel::new(nodes, RelationPolicy::Random);

        let pairs: HashSet<_> = model.edges().iter().map(|e| (e.source, e.target)).collect();
        for (u, v) in &pairs {
            assert!(!pairs.contains(&(*v, *u)), "both {u:?}->{v:?} and reverse present");
        }
        assert_eq!(pairs.len(), model.edges().len());
        for e in model.edges() {
            assert!((0.5..1.0).contains(&e.weight));
            assert!(e.kind.is_some());
        }
    }

    #[test]
    fn dataset_file_and_fallback() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("graph.json");
        std::fs::write(&good, r#"[{ "id": 1, "label": "Only", "type": "AXIOM", "position": [0, 0, 0] }]"#)
            .expect("write");
        assert_eq!(load_or_sample(Some(&good)).len(), 1);

        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "{ not json").expect("write");
        assert_eq!(load_or_sample(Some(&bad)).len(), 10);
        assert_eq!(load_or_sample(None).len(), 10);
    }

    #[test]
    fn rederiving_keeps_relation_assignments() {
        let nodes = sample_nodes().expect("sample graph");
        let first = derive_edges(&nodes, &[], RelationPolicy::Random);
        let second = derive_edges(&nodes, &first, RelationPolicy::Random);
        assert_eq!(first, second);
    }

    #[test]
    fn authored_relation_wins_over_policy() {
        let mut a = node(1, [0.0; 3], &[]);
        a.connections.push(Connection {
            relation: Some(RelationKind::Seeks),
            ..conn(2)
        });
        let edges = derive_edges(&[a, node(2, [1.0; 3], &[])], &[], FIXED);
        assert_eq!(edges[0].kind, Some(RelationKind::Seeks));
        assert_eq!(edges[0].weight, 1.0);
    }

    #[test]
    fn edges_with_bad_endpoints_are_not_renderable() {
        let mut broken = node(3, [0.0; 3], &[]);
        broken.position = Some(vec![1.0, f32::NAN, 2.0]);
        let nodes = vec![node(1, [0.0; 3], &[2, 3, 99]), node(2, [4.0, 0.0, 0.0], &[]), broken];
        let model = GraphModel::new(nodes, FIXED);

        assert_eq!(model.edges().len(), 3);
        let render: Vec<_> = model.renderable_edges().map(|(e, _, _)| e.target).collect();
        assert_eq!(render, vec![NodeId(2)]);
        let again: Vec<_> = model.renderable_edges().map(|(e, _, _)| e.target).collect();
        assert_eq!(render, again);
    }

    #[test]
    fn connect_appends_once_and_rederives() {
        let mut model = GraphModel::new(vec![node(1, [0.0; 3], &[]), node(2, [1.0; 3], &[])], FIXED);
        assert!(model.edges().is_empty());

        let before = model.revision();
        assert!(model.connect(NodeId(1), NodeId(2), None));
        assert!(model.revision() > before);
        assert!(!model.connect(NodeId(1), NodeId(2), None));
        assert!(!model.connect(NodeId(42), NodeId(2), None));

        assert_eq!(model.edges().len(), 1);
        let conn = &model.node(NodeId(1)).expect("node").connections[0];
        assert_eq!(conn.label, "n2");
    }

    #[test]
    fn add_node_assigns_next_id_and_defaults() {
        let mut model = GraphModel::new(vec![node(4, [0.0; 3], &[])], FIXED);
        let id = model.add_node(NewNode::of_kind(NodeKind::Axiom, Vec3::new(1.0, 2.0, 3.0)));

        assert_eq!(id, NodeId(5));
        let created = model.node(id).expect("created node");
        assert_eq!(created.label, "New Axiom");
        assert_eq!(created.size, 1.0);
        assert_eq!(created.depth, 0.0);
        assert_eq!(created.render_position(), Some([1.0, 2.0, 3.0]));
        assert!(created.created.is_some());
    }

    #[test]
    fn centroid_skips_unplaced_nodes() {
        let mut lost = node(3, [0.0; 3], &[]);
        lost.position = None;
        let model = GraphModel::new(
            vec![node(1, [0.0; 3], &[]), node(2, [4.0, 2.0, 0.0], &[]), lost],
            FIXED,
        );
        let c = model
            .centroid(&[NodeId(1), NodeId(2), NodeId(3)])
            .expect("centroid");
        assert_eq!(c, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(model.centroid(&[NodeId(3)]), None);
    }
}
