use crate::effects::Effect;
use crate::session::{InspectorTab, Session};
use crate::store::GraphStore;
use topology::{NodeKind, NodePatch, Position};

/// Actions dispatched by the UI to mutate the editor state.
#[derive(Debug, Clone)]
pub enum Action {
    // Canvas Graph Actions
    /// Create a node of the given kind with spawn defaults
    AddNode { kind: NodeKind },
    /// Remove a node together with every edge touching it
    DeleteNode { node_id: String },
    /// Wire a directed edge between two existing nodes
    Connect {
        source_id: String,
        target_id: String,
    },
    /// Reposition one node
    MoveNode { node_id: String, position: Position },
    /// Merge edited fields into one node's record
    UpdateNodeData { node_id: String, patch: NodePatch },

    // Selection & Panel Actions
    /// Make an application the active one and request its graph
    SelectApp { app_id: String },
    /// Change (or clear) the selected node
    SelectNode { node_id: Option<String> },
    /// Flip side panel visibility
    TogglePanel,
    /// Switch between the Config and Runtime inspector tabs
    SetInspectorTab { tab: InspectorTab },

    // Fetch Lifecycle Actions
    /// Re-issue the application list request after a failure
    RetryApps,
    /// Re-issue the graph request for the active application
    RetryGraph,
}

/// Apply a single action. Graph mutations go through the store; pure
/// UI state lands in the session; anything that needs the network is
/// returned as a deferred effect.
pub fn update(store: &mut GraphStore, session: &mut Session, action: Action) -> Vec<Effect> {
    match action {
        // Canvas Graph Actions
        Action::AddNode { kind } => {
            let app_id = session
                .selected_app_id
                .clone()
                .unwrap_or_else(|| "local".to_string());
            let node_id = store.add_node(kind, &app_id);
            // A fresh node is immediately selected and inspected.
            session.select_node(Some(node_id));
            session.set_panel_open(true);
            vec![]
        }
        Action::DeleteNode { node_id } => {
            store.delete_node(&node_id);
            if session.selected_node_id.as_deref() == Some(node_id.as_str()) {
                session.select_node(None);
            }
            vec![]
        }
        Action::Connect {
            source_id,
            target_id,
        } => {
            store.connect(&source_id, &target_id);
            vec![]
        }
        Action::MoveNode { node_id, position } => {
            store.move_node(&node_id, position);
            vec![]
        }
        Action::UpdateNodeData { node_id, patch } => {
            store.update_node_data(&node_id, patch);
            vec![]
        }

        // Selection & Panel Actions
        Action::SelectApp { app_id } => {
            if session.selected_app_id.as_deref() == Some(app_id.as_str()) {
                return vec![];
            }
            session.select_app(Some(app_id.clone()));
            vec![Effect::FetchGraph { app_id }]
        }
        Action::SelectNode { node_id } => {
            let opened = node_id.is_some();
            session.select_node(node_id);
            if opened {
                session.set_panel_open(true);
            }
            vec![]
        }
        Action::TogglePanel => {
            session.toggle_panel();
            vec![]
        }
        Action::SetInspectorTab { tab } => {
            session.set_inspector_tab(tab);
            vec![]
        }

        // Fetch Lifecycle Actions
        Action::RetryApps => vec![Effect::FetchApps],
        Action::RetryGraph => match session.selected_app_id.clone() {
            Some(app_id) => vec![Effect::FetchGraph { app_id }],
            None => vec![],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topology::{GraphNode, GraphSnapshot, NodeStatus, ServiceNodeData};

    fn store_with_node(id: &str) -> GraphStore {
        let mut store = GraphStore::new();
        store.load(&GraphSnapshot {
            nodes: vec![GraphNode {
                id: id.to_string(),
                position: Position::new(0.0, 0.0),
                data: ServiceNodeData {
                    id: id.to_string(),
                    name: "API Gateway".to_string(),
                    node_type: NodeKind::Service,
                    status: NodeStatus::Healthy,
                    description: None,
                    slider_value: 50,
                },
            }],
            edges: vec![],
        });
        store
    }

    #[test]
    fn test_add_node_selects_it_and_opens_the_panel() {
        let mut store = GraphStore::new();
        let mut session = Session::new();
        session.select_app(Some("1".to_string()));
        session.set_panel_open(false);

        let effects = update(&mut store, &mut session, Action::AddNode {
            kind: NodeKind::Database,
        });

        assert!(effects.is_empty());
        assert_eq!(store.node_count(), 1);
        let selected = session.selected_node_id.clone().unwrap();
        assert!(selected.starts_with("1-node-"));
        assert!(session.panel_open);
        assert_eq!(store.data(&selected).unwrap().name, "New Database");
    }

    #[test]
    fn test_delete_clears_selection_only_for_the_deleted_node() {
        let mut store = store_with_node("1-node-1");
        let mut session = Session::new();

        session.select_node(Some("1-node-1".to_string()));
        update(&mut store, &mut session, Action::DeleteNode {
            node_id: "1-node-1".to_string(),
        });
        assert!(session.selected_node_id.is_none());

        let mut store = store_with_node("1-node-1");
        session.select_node(Some("1-node-1".to_string()));
        update(&mut store, &mut session, Action::DeleteNode {
            node_id: "1-node-2".to_string(),
        });
        assert_eq!(session.selected_node_id.as_deref(), Some("1-node-1"));
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_move_node_goes_through_the_store() {
        let mut store = store_with_node("1-node-1");
        let mut session = Session::new();

        update(&mut store, &mut session, Action::MoveNode {
            node_id: "1-node-1".to_string(),
            position: Position::new(640.0, -12.5),
        });

        let pos = store.position("1-node-1").unwrap();
        assert_eq!((pos.x, pos.y), (640.0, -12.5));
    }

    #[test]
    fn test_select_app_requests_its_graph() {
        let mut store = GraphStore::new();
        let mut session = Session::new();

        let effects = update(&mut store, &mut session, Action::SelectApp {
            app_id: "2".to_string(),
        });

        assert_eq!(session.selected_app_id.as_deref(), Some("2"));
        assert!(matches!(
            effects.as_slice(),
            [Effect::FetchGraph { app_id }] if app_id == "2"
        ));
    }

    #[test]
    fn test_reselecting_the_same_app_does_not_refetch() {
        let mut store = GraphStore::new();
        let mut session = Session::new();
        session.select_app(Some("2".to_string()));

        let effects = update(&mut store, &mut session, Action::SelectApp {
            app_id: "2".to_string(),
        });
        assert!(effects.is_empty());
    }

    #[test]
    fn test_selecting_a_node_opens_the_panel_but_clearing_does_not_close_it() {
        let mut store = store_with_node("1-node-1");
        let mut session = Session::new();
        session.set_panel_open(false);

        update(&mut store, &mut session, Action::SelectNode {
            node_id: Some("1-node-1".to_string()),
        });
        assert!(session.panel_open);

        update(&mut store, &mut session, Action::SelectNode { node_id: None });
        assert!(session.selected_node_id.is_none());
        assert!(session.panel_open);
    }

    #[test]
    fn test_inspector_tab_survives_node_switches() {
        let mut store = store_with_node("1-node-1");
        let mut session = Session::new();

        update(&mut store, &mut session, Action::SetInspectorTab {
            tab: InspectorTab::Runtime,
        });
        update(&mut store, &mut session, Action::SelectNode {
            node_id: Some("1-node-1".to_string()),
        });
        assert_eq!(session.inspector_tab, InspectorTab::Runtime);
    }

    #[test]
    fn test_retry_graph_without_an_app_is_inert() {
        let mut store = GraphStore::new();
        let mut session = Session::new();
        assert!(update(&mut store, &mut session, Action::RetryGraph).is_empty());
    }
}
