pub mod actions;
pub mod app;
pub mod effects;
pub mod fetch;
pub mod graph_view;
pub mod inspector;
pub mod native;
pub mod node_shapes;
pub mod session;
pub mod state;
pub mod store;
pub mod web;

use std::sync::Arc;
use std::time::Duration;

/// Build the application instance shared by the native and web entry
/// points. The bundled data source stands in for the backend and
/// answers with a little artificial latency so the loading states are
/// visible.
pub fn create_app(_cc: &eframe::CreationContext<'_>) -> app::CanvasApp {
    let data_source = fetch::MockDataSource::new().with_latency(Duration::from_millis(500));
    app::CanvasApp::new(Arc::new(data_source))
}
