use serde::{Deserialize, Serialize};

//##########################################################
// Applications
//##########################################################

/// A browsable application, as reported by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

//##########################################################
// Node records
//##########################################################

/// What an infrastructure node is. Fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Service,
    Database,
}

impl NodeKind {
    /// Display name given to freshly created nodes of this kind.
    pub fn default_name(self) -> &'static str {
        match self {
            NodeKind::Service => "New Service",
            NodeKind::Database => "New Database",
        }
    }
}

/// Reported health of a node. Informational only; the editor never
/// changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Healthy,
    Degraded,
    Down,
}

/// The editable record attached to every node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceNodeData {
    /// Mirrors the owning node's id.
    pub id: String,
    pub name: String,
    pub node_type: NodeKind,
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub slider_value: u8,
}

impl ServiceNodeData {
    /// Record for a freshly spawned node: healthy, undescribed, value 50.
    pub fn spawned(id: String, kind: NodeKind) -> Self {
        Self {
            id,
            name: kind.default_name().to_owned(),
            node_type: kind,
            status: NodeStatus::Healthy,
            description: None,
            slider_value: 50,
        }
    }

    /// Shallow-merge a partial edit: present fields overwrite, absent
    /// fields keep their prior value. Range checking happens in the
    /// editing surface, not here.
    pub fn apply(&mut self, patch: NodePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(slider_value) = patch.slider_value {
            self.slider_value = slider_value;
        }
    }
}

/// A partial update to a [`ServiceNodeData`] record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<NodeStatus>,
    pub slider_value: Option<u8>,
}

impl NodePatch {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_slider_value(mut self, value: u8) -> Self {
        self.slider_value = Some(value);
        self
    }
}
