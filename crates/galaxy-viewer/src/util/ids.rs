use galaxy_core::{Node, NodeId};

/// Per-node phase for the floating animation, so nodes don't bob in lockstep.
pub fn float_phase(id: NodeId) -> f32 {
    id.0 as f32 * 0.3
}

pub fn next_node_id(nodes: &[Node]) -> NodeId {
    NodeId(nodes.iter().map(|n| n.id.0).max().map_or(1, |max| max + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_core::NodeKind;

    #[test]
    fn next_id_follows_max() {
        assert_eq!(next_node_id(&[]), NodeId(1));
        let nodes = vec![
            Node::new(NodeId(3), "a", NodeKind::Concept, [0.0; 3]),
            Node::new(NodeId(9), "b", NodeKind::Concept, [0.0; 3]),
        ];
        assert_eq!(next_node_id(&nodes), NodeId(10));
    }

    #[test]
    fn neighbours_get_distinct_phases() {
        assert_ne!(float_phase(NodeId(1)), float_phase(NodeId(2)));
    }
}
