use crate::actions::{self, Action};
use crate::effects::{self, Effect};
use crate::fetch::{DataSource, PendingFetch};
use crate::session::Session;
use crate::store::GraphStore;
use std::sync::Arc;
use topology::{Application, FetchError, GraphSnapshot};

/// Everything the frame loop owns: the graph store, the session, the
/// application catalog, the queues of pending actions and effects, and
/// the bookkeeping for requests still in flight.
pub struct State {
    pub store: GraphStore,
    pub session: Session,
    /// Application catalog as last fetched. Empty until the first
    /// listing succeeds.
    pub apps: Vec<Application>,
    pub apps_error: Option<FetchError>,
    pub graph_error: Option<FetchError>,
    /// Bumped every time a fetched snapshot replaces the store, so the
    /// canvas knows to re-frame around the new graph.
    pub graph_generation: u64,
    data_source: Arc<dyn DataSource>,
    pending_apps: Option<PendingFetch<Vec<Application>>>,
    /// In-flight graph requests, each tagged with the application id it
    /// was issued for. A result whose tag no longer matches the
    /// selected application is dropped on arrival.
    pending_graphs: Vec<PendingFetch<GraphSnapshot>>,
    action_queue: Vec<Action>,
    effect_queue: Vec<Effect>,
}

impl State {
    pub fn new(data_source: Arc<dyn DataSource>) -> Self {
        Self {
            store: GraphStore::new(),
            session: Session::new(),
            apps: Vec::new(),
            apps_error: None,
            graph_error: None,
            graph_generation: 0,
            data_source,
            pending_apps: None,
            pending_graphs: Vec::new(),
            action_queue: Vec::new(),
            // The catalog request goes out on the first effect flush.
            effect_queue: vec![Effect::FetchApps],
        }
    }

    /// Dispatch an action to be processed on the next flush.
    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push(action);
    }

    /// Flush the action queue and apply all pending actions. Selection
    /// highlighting is a projection of the selected id, so it is
    /// recomputed after every batch.
    pub fn flush_actions(&mut self) {
        let queued = std::mem::take(&mut self.action_queue);
        for action in queued {
            let mut effects = actions::update(&mut self.store, &mut self.session, action);
            self.effect_queue.append(&mut effects);
        }
        self.store
            .sync_selection(self.session.selected_node_id.as_deref());
    }

    /// Flush the effect queue and execute all pending effects.
    pub fn flush_effects(&mut self) {
        let queued = std::mem::take(&mut self.effect_queue);
        for effect in queued {
            effects::run(self, effect);
        }
    }

    pub(crate) fn begin_apps_fetch(&mut self) {
        self.apps_error = None;
        let source = Arc::clone(&self.data_source);
        self.pending_apps = Some(PendingFetch::spawn("apps", move || {
            source.list_applications()
        }));
    }

    pub(crate) fn begin_graph_fetch(&mut self, app_id: String) {
        self.graph_error = None;
        let source = Arc::clone(&self.data_source);
        let request_id = app_id.clone();
        self.pending_graphs.push(PendingFetch::spawn(app_id, move || {
            source.fetch_graph(&request_id)
        }));
    }

    /// Commit any finished fetches. A graph result whose application id
    /// is no longer the selected one was superseded while in flight and
    /// is discarded without touching the store.
    pub fn poll_fetches(&mut self) {
        if let Some(pending) = &self.pending_apps
            && let Some(result) = pending.try_take()
        {
            self.pending_apps = None;
            match result {
                Ok(apps) => {
                    self.apps = apps;
                    self.auto_select_first_app();
                }
                Err(err) => self.apps_error = Some(err),
            }
        }

        let mut still_running = Vec::new();
        for pending in std::mem::take(&mut self.pending_graphs) {
            let Some(result) = pending.try_take() else {
                still_running.push(pending);
                continue;
            };
            if self.session.selected_app_id.as_deref() != Some(pending.key()) {
                continue;
            }
            match result {
                Ok(snapshot) => {
                    self.store.load(&snapshot);
                    self.store
                        .sync_selection(self.session.selected_node_id.as_deref());
                    self.graph_error = None;
                    self.graph_generation += 1;
                }
                Err(err) => self.graph_error = Some(err),
            }
        }
        self.pending_graphs = still_running;
    }

    // Runs on every empty-to-nonempty transition of the catalog, which
    // can only happen while nothing is selected yet.
    fn auto_select_first_app(&mut self) {
        if self.session.selected_app_id.is_none()
            && let Some(first) = self.apps.first()
        {
            self.dispatch(Action::SelectApp {
                app_id: first.id.clone(),
            });
        }
    }

    pub fn apps_loading(&self) -> bool {
        self.pending_apps.is_some()
    }

    /// True while the selected application's graph request is
    /// outstanding. Requests for other applications do not count; their
    /// results will be dropped anyway.
    pub fn graph_loading(&self) -> bool {
        self.session
            .selected_app_id
            .as_deref()
            .is_some_and(|id| self.pending_graphs.iter().any(|p| p.key() == id))
    }
}
