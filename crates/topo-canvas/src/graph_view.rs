use crate::node_shapes::ServiceNodeShape;
use eframe::egui;
use egui_graphs::{
    DefaultEdgeShape, DisplayEdge, DisplayNode, Graph, GraphView, Layout, LayoutState,
};
use petgraph::Directed;
use petgraph::graph::DefaultIx;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use topology::{GraphSnapshot, ServiceNodeData};

/// Edge payload: the wire-visible edge id. Endpoints live in the graph
/// structure itself.
#[derive(Debug, Clone)]
pub struct TopoEdge {
    pub id: String,
}

// ------------------------------------------------------------------
// Type aliases for the display graph and its view
// ------------------------------------------------------------------

pub type TopoGraphDisplay =
    Graph<ServiceNodeData, TopoEdge, Directed, DefaultIx, ServiceNodeShape, DefaultEdgeShape>;

pub type TopoGraphView<'a> = GraphView<
    'a,
    ServiceNodeData,
    TopoEdge,
    Directed,
    DefaultIx,
    ServiceNodeShape,
    DefaultEdgeShape,
    LayoutStatePinned,
    LayoutPinned,
>;

/// Build a display graph from a fetched snapshot: payloads, labels and
/// the snapshot's explicit positions. Edges naming an id that is not in
/// the node set are skipped rather than rejected.
pub fn setup_graph_display(snapshot: &GraphSnapshot) -> TopoGraphDisplay {
    let mut stable: StableGraph<ServiceNodeData, TopoEdge> = StableGraph::default();
    let mut index_by_id: HashMap<&str, NodeIndex> = HashMap::new();

    for node in &snapshot.nodes {
        let idx = stable.add_node(node.data.clone());
        index_by_id.insert(node.id.as_str(), idx);
    }
    for edge in &snapshot.edges {
        if let (Some(&source), Some(&target)) = (
            index_by_id.get(edge.source.as_str()),
            index_by_id.get(edge.target.as_str()),
        ) {
            stable.add_edge(source, target, TopoEdge {
                id: edge.id.clone(),
            });
        }
    }

    let mut graph = TopoGraphDisplay::from(&stable);
    for node in &snapshot.nodes {
        if let Some(&idx) = index_by_id.get(node.id.as_str())
            && let Some(display_node) = graph.node_mut(idx)
        {
            display_node.set_label(node.data.name.clone());
            display_node.set_location(egui::Pos2::new(node.position.x, node.position.y));
        }
    }
    // Edge labels stay empty; the id is bookkeeping, not decoration.
    let edge_indices: Vec<_> = graph.edges_iter().map(|(idx, _)| idx).collect();
    for edge_idx in edge_indices {
        if let Some(edge) = graph.edge_mut(edge_idx) {
            edge.set_label(String::new());
        }
    }
    graph
}

// ------------------------------------------------------------------
// Pinned layout
// ------------------------------------------------------------------

/// Layout state for [`LayoutPinned`]. Nothing to remember between
/// frames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutStatePinned;

impl LayoutState for LayoutStatePinned {}

/// Node positions are owned by the store — fetched, dragged or spawned.
/// The layout pass leaves every location untouched.
#[derive(Debug, Clone, Default)]
pub struct LayoutPinned {
    state: LayoutStatePinned,
}

impl Layout<LayoutStatePinned> for LayoutPinned {
    fn from_state(state: LayoutStatePinned) -> impl Layout<LayoutStatePinned> {
        Self { state }
    }

    fn next<N, E, Ty, Ix, Dn, De>(&mut self, _g: &mut Graph<N, E, Ty, Ix, Dn, De>, _ui: &egui::Ui)
    where
        N: Clone,
        E: Clone,
        Ty: petgraph::EdgeType,
        Ix: petgraph::stable_graph::IndexType,
        Dn: DisplayNode<N, E, Ty, Ix>,
        De: DisplayEdge<N, E, Ty, Ix, Dn>,
    {
    }

    fn state(&self) -> LayoutStatePinned {
        self.state.clone()
    }
}
