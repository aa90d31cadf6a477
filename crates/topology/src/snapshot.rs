use serde::{Deserialize, Serialize};

use crate::model::ServiceNodeData;

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One node as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub position: Position,
    pub data: ServiceNodeData,
}

/// A directed link between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// The `{nodes, edges}` payload returned for one application at fetch
/// time. A value type: once absorbed into the live store it is
/// discarded, never referenced again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, NodeStatus};

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let snapshot = GraphSnapshot {
            nodes: vec![GraphNode {
                id: "1-node-1".to_string(),
                position: Position::new(250.0, 100.0),
                data: ServiceNodeData {
                    id: "1-node-1".to_string(),
                    name: "API Gateway".to_string(),
                    node_type: NodeKind::Service,
                    status: NodeStatus::Healthy,
                    description: None,
                    slider_value: 50,
                },
            }],
            edges: vec![GraphEdge {
                id: "1-edge-1".to_string(),
                source: "1-node-1".to_string(),
                target: "1-node-1".to_string(),
            }],
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GraphSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
