use crate::graph_view::{TopoEdge, TopoGraphDisplay, setup_graph_display};
use eframe::egui;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use rand::Rng;
use std::collections::HashMap;
use topology::{GraphSnapshot, NodeKind, NodePatch, Position, ServiceNodeData};

// Spawn region for freshly added nodes, so they land apart from the
// fetched layout without stacking exactly on top of each other.
const SPAWN_X: std::ops::Range<f32> = 100.0..400.0;
const SPAWN_Y: std::ops::Range<f32> = 100.0..300.0;

/// The canonical in-memory node/edge collection for the selected
/// application, addressed by wire-level string ids.
///
/// Every operation is total: an id that is no longer present makes the
/// call a no-op, never an error. Deletion races between the canvas and
/// the inspector are expected and benign.
pub struct GraphStore {
    graph: TopoGraphDisplay,
    index_by_id: HashMap<String, NodeIndex>,
    next_node_serial: u64,
    next_edge_serial: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            graph: setup_graph_display(&GraphSnapshot::default()),
            index_by_id: HashMap::new(),
            next_node_serial: 0,
            next_edge_serial: 0,
        }
    }

    /// Replace the whole collection with a fetched snapshot. The
    /// snapshot is absorbed by value; it keeps no tie to the store
    /// afterwards. A previously selected node id that does not exist in
    /// the new contents will simply resolve to nothing on lookup.
    pub fn load(&mut self, snapshot: &GraphSnapshot) {
        self.graph = setup_graph_display(snapshot);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index_by_id = self
            .graph
            .nodes_iter()
            .map(|(idx, node)| (node.payload().id.clone(), idx))
            .collect();
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a node of the given kind with spawn defaults and a random
    /// position inside the spawn region. Returns the generated id,
    /// which is guaranteed distinct from every id currently present.
    pub fn add_node(&mut self, kind: NodeKind, app_id: &str) -> String {
        let id = self.next_node_id(app_id);
        let data = ServiceNodeData::spawned(id.clone(), kind);
        let label = data.name.clone();

        let idx = self.graph.add_node(data);
        if let Some(node) = self.graph.node_mut(idx) {
            node.set_label(label);
            let mut rng = rand::rng();
            node.set_location(egui::Pos2::new(
                rng.random_range(SPAWN_X),
                rng.random_range(SPAWN_Y),
            ));
        }
        self.index_by_id.insert(id.clone(), idx);
        id
    }

    /// Remove a node. Every edge whose source or target is the node
    /// goes with it in the same operation, so no dangling edge can be
    /// observed afterwards.
    pub fn delete_node(&mut self, id: &str) {
        if let Some(idx) = self.index_by_id.remove(id) {
            self.graph.remove_node(idx);
        }
    }

    /// Wire a directed edge between two existing node ids. Self-loops,
    /// duplicates and cycles are all accepted; if either endpoint is
    /// missing nothing happens.
    pub fn connect(&mut self, source: &str, target: &str) -> Option<String> {
        let source_idx = *self.index_by_id.get(source)?;
        let target_idx = *self.index_by_id.get(target)?;
        let id = self.next_edge_id();
        self.graph.add_edge_with_label(
            source_idx,
            target_idx,
            TopoEdge { id: id.clone() },
            String::new(),
        );
        Some(id)
    }

    /// Reposition one node in place. No bounds checking.
    pub fn move_node(&mut self, id: &str, position: Position) {
        if let Some(&idx) = self.index_by_id.get(id)
            && let Some(node) = self.graph.node_mut(idx)
        {
            node.set_location(egui::Pos2::new(position.x, position.y));
        }
    }

    /// Shallow-merge edited fields into one node's record. This is the
    /// sole write path used by the inspector; the store itself does not
    /// range-check incoming values.
    pub fn update_node_data(&mut self, id: &str, patch: NodePatch) {
        if let Some(&idx) = self.index_by_id.get(id)
            && let Some(node) = self.graph.node_mut(idx)
        {
            node.payload_mut().apply(patch);
            let label = node.payload().name.clone();
            node.set_label(label);
        }
    }

    /// Recompute every node's highlight flag from the selected id. The
    /// id is the single source of truth; the flags are a projection of
    /// it, so at most one node ends up highlighted and none when the id
    /// is absent or unmatched.
    pub fn sync_selection(&mut self, selected: Option<&str>) {
        let indices: Vec<NodeIndex> = self.graph.nodes_iter().map(|(idx, _)| idx).collect();
        for idx in indices {
            if let Some(node) = self.graph.node_mut(idx) {
                let highlighted = selected.is_some_and(|id| node.payload().id == id);
                node.set_selected(highlighted);
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn graph(&self) -> &TopoGraphDisplay {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut TopoGraphDisplay {
        &mut self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Resolve a node id to its record; a stale id yields `None`.
    pub fn data(&self, id: &str) -> Option<&ServiceNodeData> {
        let idx = *self.index_by_id.get(id)?;
        self.graph.node(idx).map(|node| node.payload())
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        let idx = *self.index_by_id.get(id)?;
        self.graph
            .node(idx)
            .map(|node| Position::new(node.location().x, node.location().y))
    }

    pub fn node_id(&self, idx: NodeIndex) -> Option<String> {
        self.graph.node(idx).map(|node| node.payload().id.clone())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.graph
            .nodes_iter()
            .map(|(_, node)| node.payload().id.clone())
            .collect()
    }

    /// Every edge as a `(source id, target id)` pair.
    pub fn edge_endpoints(&self) -> Vec<(String, String)> {
        self.graph
            .g()
            .edge_references()
            .filter_map(|edge_ref| {
                let source = self.node_id(edge_ref.source())?;
                let target = self.node_id(edge_ref.target())?;
                Some((source, target))
            })
            .collect()
    }

    pub fn highlighted_ids(&self) -> Vec<String> {
        self.graph
            .nodes_iter()
            .filter(|(_, node)| node.selected())
            .map(|(_, node)| node.payload().id.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Id generation
    // ------------------------------------------------------------------

    fn next_node_id(&mut self, app_id: &str) -> String {
        loop {
            self.next_node_serial += 1;
            let id = format!("{app_id}-node-{}", self.next_node_serial);
            if !self.index_by_id.contains_key(&id) {
                return id;
            }
        }
    }

    fn next_edge_id(&mut self) -> String {
        loop {
            self.next_edge_serial += 1;
            let id = format!("edge-{}", self.next_edge_serial);
            let taken = self
                .graph
                .edges_iter()
                .any(|(_, edge)| edge.payload().id == id);
            if !taken {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topology::{GraphEdge, GraphNode, NodeStatus};

    fn node(id: &str, kind: NodeKind) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            position: Position::new(250.0, 100.0),
            data: ServiceNodeData {
                id: id.to_string(),
                name: format!("node {id}"),
                node_type: kind,
                status: NodeStatus::Healthy,
                description: None,
                slider_value: 50,
            },
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    /// Two nodes joined by one edge, the smallest interesting graph.
    fn two_node_store() -> GraphStore {
        let mut store = GraphStore::new();
        store.load(&GraphSnapshot {
            nodes: vec![
                node("a1-node-1", NodeKind::Service),
                node("a1-node-2", NodeKind::Database),
            ],
            edges: vec![edge("a1-edge-1", "a1-node-1", "a1-node-2")],
        });
        store
    }

    #[test]
    fn test_load_replaces_previous_contents() {
        let mut store = two_node_store();
        store.load(&GraphSnapshot {
            nodes: vec![node("b1-node-1", NodeKind::Service)],
            edges: vec![],
        });

        assert_eq!(store.node_ids(), vec!["b1-node-1".to_string()]);
        assert_eq!(store.edge_count(), 0);
        // The old ids now resolve to nothing.
        assert!(store.data("a1-node-1").is_none());
    }

    #[test]
    fn test_load_skips_edges_with_unknown_endpoints() {
        let mut store = GraphStore::new();
        store.load(&GraphSnapshot {
            nodes: vec![node("a1-node-1", NodeKind::Service)],
            edges: vec![edge("a1-edge-1", "a1-node-1", "a1-node-99")],
        });
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_delete_removes_incident_edges() {
        let mut store = two_node_store();
        store.delete_node("a1-node-1");

        assert_eq!(store.node_count(), 1);
        assert_eq!(store.edge_count(), 0);
        let remaining = store.node_ids();
        for (source, target) in store.edge_endpoints() {
            assert!(remaining.contains(&source));
            assert!(remaining.contains(&target));
        }
    }

    #[test]
    fn test_delete_missing_id_is_a_noop() {
        let mut store = two_node_store();
        store.delete_node("a1-node-99");

        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn test_no_dangling_edges_after_mixed_mutations() {
        let mut store = two_node_store();
        let added = store.add_node(NodeKind::Service, "a1");
        store.connect("a1-node-2", &added);
        store.connect(&added, "a1-node-1");
        store.delete_node("a1-node-2");
        store.connect(&added, &added);
        store.delete_node("a1-node-1");

        let remaining = store.node_ids();
        for (source, target) in store.edge_endpoints() {
            assert!(remaining.contains(&source), "dangling source {source}");
            assert!(remaining.contains(&target), "dangling target {target}");
        }
    }

    #[test]
    fn test_generated_ids_never_collide() {
        let mut store = GraphStore::new();
        // Seed ids that the serial generator would otherwise produce.
        store.load(&GraphSnapshot {
            nodes: vec![
                node("a1-node-1", NodeKind::Service),
                node("a1-node-2", NodeKind::Service),
                node("a1-node-3", NodeKind::Service),
            ],
            edges: vec![],
        });

        for _ in 0..5 {
            store.add_node(NodeKind::Database, "a1");
        }
        let mut ids = store.node_ids();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
        assert_eq!(before, 8);
    }

    #[test]
    fn test_add_node_spawns_inside_region() {
        let mut store = GraphStore::new();
        for _ in 0..20 {
            let id = store.add_node(NodeKind::Service, "a1");
            let pos = store.position(&id).unwrap();
            assert!((100.0..400.0).contains(&pos.x), "x out of region: {}", pos.x);
            assert!((100.0..300.0).contains(&pos.y), "y out of region: {}", pos.y);
        }
    }

    #[test]
    fn test_connect_accepts_self_loop_once() {
        let mut store = two_node_store();
        let id = store.connect("a1-node-1", "a1-node-1");

        assert!(id.is_some());
        assert_eq!(store.edge_count(), 2);
        assert_eq!(
            store
                .edge_endpoints()
                .iter()
                .filter(|(s, t)| s == "a1-node-1" && t == "a1-node-1")
                .count(),
            1
        );
    }

    #[test]
    fn test_connect_accepts_duplicate_edges() {
        let mut store = two_node_store();
        store.connect("a1-node-1", "a1-node-2");
        assert_eq!(store.edge_count(), 2);
    }

    #[test]
    fn test_connect_with_missing_endpoint_is_a_noop() {
        let mut store = two_node_store();
        assert!(store.connect("a1-node-1", "a1-node-99").is_none());
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn test_move_node_updates_position() {
        let mut store = two_node_store();
        store.move_node("a1-node-1", Position::new(42.0, 7.0));
        let pos = store.position("a1-node-1").unwrap();
        assert_eq!((pos.x, pos.y), (42.0, 7.0));
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let mut store = two_node_store();
        store.update_node_data(
            "a1-node-1",
            NodePatch::default().with_description("edge of the world"),
        );

        let data = store.data("a1-node-1").unwrap();
        assert_eq!(data.description.as_deref(), Some("edge of the world"));
        assert_eq!(data.name, "node a1-node-1");
        assert_eq!(data.slider_value, 50);
    }

    #[test]
    fn test_update_missing_id_is_a_noop() {
        let mut store = two_node_store();
        store.update_node_data("a1-node-99", NodePatch::default().with_slider_value(10));
        assert_eq!(store.data("a1-node-1").unwrap().slider_value, 50);
        assert_eq!(store.data("a1-node-2").unwrap().slider_value, 50);
    }

    // The store deliberately accepts values the inspector would refuse:
    // range checking is an editing-surface concern, and this boundary
    // is part of the store's contract.
    #[test]
    fn test_store_accepts_out_of_range_slider_value() {
        let mut store = two_node_store();
        store.update_node_data("a1-node-1", NodePatch::default().with_slider_value(150));
        assert_eq!(store.data("a1-node-1").unwrap().slider_value, 150);
    }

    #[test]
    fn test_selection_projection_is_exclusive() {
        let mut store = two_node_store();

        store.sync_selection(Some("a1-node-1"));
        assert_eq!(store.highlighted_ids(), vec!["a1-node-1".to_string()]);

        store.sync_selection(Some("a1-node-2"));
        assert_eq!(store.highlighted_ids(), vec!["a1-node-2".to_string()]);

        store.sync_selection(None);
        assert!(store.highlighted_ids().is_empty());
    }

    #[test]
    fn test_selection_projection_with_stale_id_highlights_nothing() {
        let mut store = two_node_store();
        store.sync_selection(Some("a1-node-1"));
        store.load(&GraphSnapshot {
            nodes: vec![node("b1-node-1", NodeKind::Service)],
            edges: vec![],
        });
        store.sync_selection(Some("a1-node-1"));
        assert!(store.highlighted_ids().is_empty());
    }
}
