pub mod model;
pub mod snapshot;
pub mod wire;

pub use model::{Application, NodeKind, NodePatch, NodeStatus, ServiceNodeData};
pub use snapshot::{GraphEdge, GraphNode, GraphSnapshot, Position};
pub use wire::{Envelope, FetchError};
