use crate::state::State;

/// Deferred effects that must run outside the reducer: everything that
/// kicks off a network request.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Request the application catalog
    FetchApps,
    /// Request the graph for one application
    FetchGraph { app_id: String },
}

/// Execute a single effect against the state.
pub fn run(state: &mut State, effect: Effect) {
    match effect {
        Effect::FetchApps => state.begin_apps_fetch(),
        Effect::FetchGraph { app_id } => state.begin_graph_fetch(app_id),
    }
}
