//! Process-wide selection state: which application, which node, which
//! inspector tab, and whether the side panel is showing. Owns only
//! identifiers — resolving an id to an entity is always an explicit
//! query against the graph store, and a stale id simply resolves to
//! nothing.

/// Which inspector tab is active. Session-level state: switching nodes
/// does not reset it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorTab {
    Config,
    Runtime,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub selected_app_id: Option<String>,
    pub selected_node_id: Option<String>,
    pub panel_open: bool,
    pub inspector_tab: InspectorTab,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            selected_app_id: None,
            selected_node_id: None,
            panel_open: true,
            inspector_tab: InspectorTab::Config,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_app(&mut self, app_id: Option<String>) {
        self.selected_app_id = app_id;
    }

    pub fn select_node(&mut self, node_id: Option<String>) {
        self.selected_node_id = node_id;
    }

    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    pub fn set_inspector_tab(&mut self, tab: InspectorTab) {
        self.inspector_tab = tab;
    }
}
