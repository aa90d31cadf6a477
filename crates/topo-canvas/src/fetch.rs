//! Read-only transport to the topology backend, plus the frame-polled
//! bookkeeping for requests that are still in flight.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use topology::{
    Application, Envelope, FetchError, GraphEdge, GraphNode, GraphSnapshot, NodeKind, NodeStatus,
    Position, ServiceNodeData, wire,
};

/// The two read operations this editor consumes. Nothing is ever
/// written upstream; all edits stay local.
pub trait DataSource: Send + Sync {
    fn list_applications(&self) -> Result<Vec<Application>, FetchError>;
    fn fetch_graph(&self, app_id: &str) -> Result<GraphSnapshot, FetchError>;
}

// ------------------------------------------------------------------
// Bundled mock source
// ------------------------------------------------------------------

/// In-process stand-in for the backend. Every response is serialized
/// into the `{code, data, error}` envelope and decoded again, so the
/// app exercises the same path a live transport would.
pub struct MockDataSource {
    latency: Option<Duration>,
    failure: Option<String>,
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDataSource {
    pub fn new() -> Self {
        Self {
            latency: None,
            failure: None,
        }
    }

    /// Simulate network latency on every request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every request fail with the given message, for exercising
    /// the error surfaces.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    fn respond<T>(&self, envelope: Envelope<T>) -> Result<T, FetchError>
    where
        T: Serialize + DeserializeOwned,
    {
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let body =
            serde_json::to_string(&envelope).map_err(|e| FetchError::Malformed(e.to_string()))?;
        wire::decode(&body)
    }
}

impl DataSource for MockDataSource {
    fn list_applications(&self) -> Result<Vec<Application>, FetchError> {
        let envelope = match &self.failure {
            Some(message) => Envelope::fail(message.clone()),
            None => Envelope::ok(sample_applications()),
        };
        self.respond(envelope)
    }

    fn fetch_graph(&self, app_id: &str) -> Result<GraphSnapshot, FetchError> {
        let envelope = match &self.failure {
            Some(message) => Envelope::fail(message.clone()),
            None => Envelope::ok(sample_graph(app_id)),
        };
        self.respond(envelope)
    }
}

fn app(id: &str, name: &str, icon: &str) -> Application {
    Application {
        id: id.to_string(),
        name: name.to_string(),
        icon: Some(icon.to_string()),
    }
}

pub fn sample_applications() -> Vec<Application> {
    vec![
        app("1", "supertokens-golang", "lightbulb"),
        app("2", "supertokens-java", "gear"),
        app("3", "supertokens-python", "rocket"),
        app("4", "supertokens-ruby", "box"),
        app("5", "supertokens-go", "star"),
    ]
}

/// Starter graph for an application: a gateway service fanning out to
/// two databases in varying states of repair.
pub fn sample_graph(app_id: &str) -> GraphSnapshot {
    let node = |n: u32,
                position: Position,
                name: &str,
                kind: NodeKind,
                status: NodeStatus,
                description: &str,
                slider_value: u8| {
        let id = format!("{app_id}-node-{n}");
        GraphNode {
            id: id.clone(),
            position,
            data: ServiceNodeData {
                id,
                name: name.to_string(),
                node_type: kind,
                status,
                description: Some(description.to_string()),
                slider_value,
            },
        }
    };

    let nodes = vec![
        node(
            1,
            Position::new(250.0, 100.0),
            "API Gateway",
            NodeKind::Service,
            NodeStatus::Healthy,
            "Main API gateway service",
            50,
        ),
        node(
            2,
            Position::new(100.0, 300.0),
            "PostgreSQL",
            NodeKind::Database,
            NodeStatus::Degraded,
            "Primary PostgreSQL database",
            30,
        ),
        node(
            3,
            Position::new(400.0, 300.0),
            "Redis",
            NodeKind::Database,
            NodeStatus::Down,
            "Redis cache layer",
            75,
        ),
    ];

    let edges = vec![
        GraphEdge {
            id: format!("{app_id}-edge-1"),
            source: format!("{app_id}-node-1"),
            target: format!("{app_id}-node-2"),
        },
        GraphEdge {
            id: format!("{app_id}-edge-2"),
            source: format!("{app_id}-node-1"),
            target: format!("{app_id}-node-3"),
        },
    ];

    GraphSnapshot { nodes, edges }
}

// ------------------------------------------------------------------
// In-flight requests
// ------------------------------------------------------------------

type Slot<T> = Arc<Mutex<Option<Result<T, FetchError>>>>;

/// One in-flight request, tagged with the key it was issued for. The
/// result sits in a shared slot until the frame loop takes it; whoever
/// takes it decides — by comparing the tag — whether the response is
/// still wanted or has been superseded.
pub struct PendingFetch<T> {
    key: String,
    slot: Slot<T>,
}

impl<T: Send + 'static> PendingFetch<T> {
    /// Run `job` off the UI thread and expose its result for polling.
    pub fn spawn(
        key: impl Into<String>,
        job: impl FnOnce() -> Result<T, FetchError> + Send + 'static,
    ) -> Self {
        let slot: Slot<T> = Arc::new(Mutex::new(None));
        let out = Arc::clone(&slot);
        spawn_worker(move || {
            *out.lock().unwrap() = Some(job());
        });
        Self {
            key: key.into(),
            slot,
        }
    }

    /// A request that has already completed with the given result.
    pub fn ready(key: impl Into<String>, result: Result<T, FetchError>) -> Self {
        Self {
            key: key.into(),
            slot: Arc::new(Mutex::new(Some(result))),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Take the result if the request has finished; `None` while it is
    /// still running.
    pub fn try_take(&self) -> Option<Result<T, FetchError>> {
        self.slot.try_lock().ok().and_then(|mut slot| slot.take())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_worker(job: impl FnOnce() + Send + 'static) {
    std::thread::spawn(job);
}

// The bundled source completes in-process, so on the web the job can
// simply run to completion before the frame continues.
#[cfg(target_arch = "wasm32")]
fn spawn_worker(job: impl FnOnce() + Send + 'static) {
    job();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_lists_five_applications() {
        let apps = MockDataSource::new().list_applications().unwrap();
        assert_eq!(apps.len(), 5);
        assert_eq!(apps[0].name, "supertokens-golang");
    }

    #[test]
    fn test_mock_graph_ids_are_scoped_to_the_app() {
        let snapshot = MockDataSource::new().fetch_graph("7").unwrap();
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.edges.len(), 2);
        assert!(snapshot.nodes.iter().all(|n| n.id.starts_with("7-node-")));
        assert!(snapshot.edges.iter().all(|e| e.id.starts_with("7-edge-")));
    }

    #[test]
    fn test_failing_mock_surfaces_its_message() {
        let source = MockDataSource::new().failing("Simulated server error");
        assert_eq!(
            source.list_applications(),
            Err(FetchError::Upstream("Simulated server error".to_string()))
        );
        assert_eq!(
            source.fetch_graph("1"),
            Err(FetchError::Upstream("Simulated server error".to_string()))
        );
    }

    #[test]
    fn test_ready_fetch_yields_exactly_once() {
        let pending = PendingFetch::ready("1", Ok(sample_graph("1")));
        assert_eq!(pending.key(), "1");
        assert!(pending.try_take().is_some());
        assert!(pending.try_take().is_none());
    }

    #[test]
    fn test_spawned_fetch_completes() {
        let pending = PendingFetch::spawn("1", || MockDataSource::new().fetch_graph("1"));
        let mut result = None;
        for _ in 0..200 {
            if let Some(taken) = pending.try_take() {
                result = Some(taken);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        let snapshot = result.expect("fetch never completed").unwrap();
        assert_eq!(snapshot.nodes.len(), 3);
    }
}
