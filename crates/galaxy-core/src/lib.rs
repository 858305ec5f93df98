use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

/// Semantic type of a node. Unrecognized tags in data files land on `Custom`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Concept,
    Thinker,
    Axiom,
    Synthesis,
    Archetype,
    Symbol,
    Myth,
    #[default]
    #[serde(other)]
    Custom,
}

impl NodeKind {
    /// Types offered by the node creation panel, in display order.
    pub const CREATABLE: [NodeKind; 7] = [
        NodeKind::Concept,
        NodeKind::Thinker,
        NodeKind::Axiom,
        NodeKind::Synthesis,
        NodeKind::Archetype,
        NodeKind::Symbol,
        NodeKind::Custom,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            NodeKind::Concept => "Concept",
            NodeKind::Thinker => "Thinker",
            NodeKind::Axiom => "Axiom",
            NodeKind::Synthesis => "Synthesis",
            NodeKind::Archetype => "Archetype",
            NodeKind::Symbol => "Symbol",
            NodeKind::Myth => "Myth",
            NodeKind::Custom => "Custom",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Concept => "CONCEPT",
            NodeKind::Thinker => "THINKER",
            NodeKind::Axiom => "AXIOM",
            NodeKind::Synthesis => "SYNTHESIS",
            NodeKind::Archetype => "ARCHETYPE",
            NodeKind::Symbol => "SYMBOL",
            NodeKind::Myth => "MYTH",
            NodeKind::Custom => "CUSTOM",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    Is,
    Has,
    DependsOn,
    ContrastsWith,
    ConflictsWith,
    Implies,
    EmergesFrom,
    TransformsInto,
    AlignsWith,
    Symbolizes,
    ContainsTensionWithin,
    Seeks,
}

impl RelationKind {
    pub const ALL: [RelationKind; 12] = [
        RelationKind::Is,
        RelationKind::Has,
        RelationKind::DependsOn,
        RelationKind::ContrastsWith,
        RelationKind::ConflictsWith,
        RelationKind::Implies,
        RelationKind::EmergesFrom,
        RelationKind::TransformsInto,
        RelationKind::AlignsWith,
        RelationKind::Symbolizes,
        RelationKind::ContainsTensionWithin,
        RelationKind::Seeks,
    ];

    /// Relations that read in one direction get animated markers.
    pub fn is_directed(self) -> bool {
        matches!(
            self,
            RelationKind::DependsOn
                | RelationKind::Implies
                | RelationKind::EmergesFrom
                | RelationKind::TransformsInto
                | RelationKind::Seeks
        )
    }

    pub fn tag(self) -> &'static str {
        match self {
            RelationKind::Is => "IS",
            RelationKind::Has => "HAS",
            RelationKind::DependsOn => "DEPENDS_ON",
            RelationKind::ContrastsWith => "CONTRASTS_WITH",
            RelationKind::ConflictsWith => "CONFLICTS_WITH",
            RelationKind::Implies => "IMPLIES",
            RelationKind::EmergesFrom => "EMERGES_FROM",
            RelationKind::TransformsInto => "TRANSFORMS_INTO",
            RelationKind::AlignsWith => "ALIGNS_WITH",
            RelationKind::Symbolizes => "SYMBOLIZES",
            RelationKind::ContainsTensionWithin => "CONTAINS_TENSION_WITHIN",
            RelationKind::Seeks => "SEEKS",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub id: u64,
    pub text: String,
}

/// Lightweight reference from one node to another; edges are derived from these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    #[serde(rename = "id")]
    pub target: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Authored relation; when absent the store assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationKind>,
}

fn default_size() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, deserialize_with = "lenient_position")]
    pub position: Option<Vec<f32>>,
    #[serde(default)]
    pub depth: f32,
    #[serde(default = "default_size")]
    pub size: f32,
    #[serde(default)]
    pub importance: f32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<String>, kind: NodeKind, position: [f32; 3]) -> Self {
        Self {
            id,
            label: label.into(),
            kind,
            position: Some(position.to_vec()),
            depth: 0.0,
            size: 1.0,
            importance: 0.0,
            content: String::new(),
            created: None,
            modified: None,
            citations: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Position used to place the node: missing or short positions are
    /// rejected, non-finite components are zeroed.
    pub fn render_position(&self) -> Option<[f32; 3]> {
        let p = self.position.as_deref()?;
        if p.len() < 3 {
            return None;
        }
        let fix = |v: f32| if v.is_finite() { v } else { 0.0 };
        Some([fix(p[0]), fix(p[1]), fix(p[2])])
    }

    /// Position used for edge endpoints: any non-finite component rejects it.
    pub fn strict_position(&self) -> Option<[f32; 3]> {
        let p = self.position.as_deref()?;
        if p.len() < 3 || p[..3].iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some([p[0], p[1], p[2]])
    }

    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            "Unnamed Node"
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "semantic_type", default)]
    pub kind: Option<RelationKind>,
    pub weight: f32,
}

// Anything that isn't an array becomes `None`; non-numeric entries become NaN
// so the render-time guards decide what to do with them.
fn lenient_position<'de, D>(de: D) -> Result<Option<Vec<f32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    let Some(serde_json::Value::Array(items)) = value else {
        return Ok(None);
    };
    Ok(Some(
        items
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32).unwrap_or(f32::NAN))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_parses_with_defaults_and_unknown_type() {
        let json = r#"{ "id": 7, "label": "Odd", "type": "WHATEVER", "position": [1, 2, 3] }"#;
        let node: Node = serde_json::from_str(json).expect("parse node");
        assert_eq!(node.kind, NodeKind::Custom);
        assert_eq!(node.size, 1.0);
        assert!(node.connections.is_empty());
        assert_eq!(node.render_position(), Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn malformed_positions_are_tolerated_at_parse_time() {
        let not_array: Node =
            serde_json::from_str(r#"{ "id": 1, "position": "here" }"#).expect("parse");
        assert_eq!(not_array.position, None);
        assert_eq!(not_array.render_position(), None);

        let short: Node = serde_json::from_str(r#"{ "id": 2, "position": [1, 2] }"#).expect("parse");
        assert_eq!(short.render_position(), None);

        let with_null: Node =
            serde_json::from_str(r#"{ "id": 3, "position": [1, null, 3] }"#).expect("parse");
        assert_eq!(with_null.render_position(), Some([1.0, 0.0, 3.0]));
        assert_eq!(with_null.strict_position(), None);
    }

    #[test]
    fn connection_uses_source_field_names() {
        let json = r#"{ "id": 4, "label": "Utilitarianism", "type": "CONCEPT" }"#;
        let conn: Connection = serde_json::from_str(json).expect("parse connection");
        assert_eq!(conn.target, NodeId(4));
        assert_eq!(conn.kind, NodeKind::Concept);
        assert_eq!(conn.relation, None);
    }

    #[test]
    fn directed_relations() {
        let directed: Vec<_> = RelationKind::ALL.iter().filter(|k| k.is_directed()).collect();
        assert_eq!(directed.len(), 5);
        assert!(RelationKind::Seeks.is_directed());
        assert!(!RelationKind::Has.is_directed());
    }

    #[test]
    fn display_label_falls_back() {
        let node = Node::new(NodeId(1), "  ", NodeKind::Axiom, [0.0, 0.0, 0.0]);
        assert_eq!(node.display_label(), "Unnamed Node");
    }
}
