use crate::actions::Action;
use crate::fetch::DataSource;
use crate::graph_view::TopoGraphView;
use crate::inspector::Inspector;
use crate::state::State;
use eframe::egui;
use egui_graphs::{SettingsInteraction, SettingsNavigation, SettingsStyle};
use petgraph::stable_graph::NodeIndex;
use std::sync::Arc;
use topology::NodeKind;

// UI Constants
const DRAG_THRESHOLD: f32 = 2.0;
const EDGE_PREVIEW_STROKE_WIDTH: f32 = 2.0;
const EDGE_PREVIEW_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 100, 255);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const FIT_PADDING: f32 = 0.2;

/// The editor shell: canvas in the center, application list / node
/// inspector in a toggleable side panel.
pub struct CanvasApp {
    state: State,
    inspector: Inspector,
    /// Source node and press position of an in-progress connect drag.
    connect_from: Option<(NodeIndex, egui::Pos2)>,
    connect_started: bool,
    /// One-shot: re-frame the canvas around the graph on the next pass.
    fit_requested: bool,
    /// Last store generation the canvas was framed for.
    fit_generation: u64,
}

impl CanvasApp {
    pub fn new(data_source: Arc<dyn DataSource>) -> Self {
        Self {
            state: State::new(data_source),
            inspector: Inspector::new(),
            connect_from: None,
            connect_started: false,
            fit_requested: true,
            fit_generation: 0,
        }
    }
}

impl eframe::App for CanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_fetches();
        self.state.flush_actions();
        self.state.flush_effects();

        // A freshly committed snapshot gets framed once.
        if self.state.graph_generation != self.fit_generation {
            self.fit_generation = self.state.graph_generation;
            self.fit_requested = true;
        }

        self.handle_keyboard(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Topology Canvas");
                if let Some(name) = self.selected_app_name() {
                    ui.separator();
                    ui.label(name);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Panel (P)").clicked() {
                        self.state.dispatch(Action::TogglePanel);
                    }
                });
            });
        });

        if self.state.session.panel_open {
            self.show_side_panel(ctx);
        }
        self.show_canvas(ctx);

        // Apply this frame's UI dispatches before the next paint.
        self.state.flush_actions();
        self.state.flush_effects();

        if self.state.apps_loading() || self.state.graph_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}

impl CanvasApp {
    fn selected_app_name(&self) -> Option<String> {
        let selected = self.state.session.selected_app_id.as_deref()?;
        self.state
            .apps
            .iter()
            .find(|app| app.id == selected)
            .map(|app| app.name.clone())
    }

    // Keyboard intents, suppressed while any widget holds focus so
    // typing into the inspector never deletes nodes.
    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.memory(|m| m.focused().is_some()) {
            return;
        }

        let (delete, fit, panel) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::F),
                i.key_pressed(egui::Key::P),
            )
        });

        if delete
            && let Some(node_id) = self.state.session.selected_node_id.clone()
        {
            // The reducer clears the selection along with the node.
            self.state.dispatch(Action::DeleteNode { node_id });
        }
        if fit {
            self.fit_requested = true;
        }
        if panel {
            self.state.dispatch(Action::TogglePanel);
        }
    }

    // ------------------------------------------------------------------
    // Side panel: node inspector when a node is selected, otherwise the
    // application list.
    // ------------------------------------------------------------------

    fn show_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("side_panel")
            .default_width(300.0)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| {
                let selected = self
                    .state
                    .session
                    .selected_node_id
                    .as_deref()
                    .and_then(|id| self.state.store.data(id))
                    .cloned();

                match selected {
                    Some(data) => {
                        let actions =
                            self.inspector
                                .show(ui, Some(&data), &self.state.session);
                        for action in actions {
                            self.state.dispatch(action);
                        }
                    }
                    None => self.show_app_selector(ui),
                }
            });
    }

    fn show_app_selector(&mut self, ui: &mut egui::Ui) {
        ui.heading("Applications");
        ui.separator();

        if self.state.apps_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading apps...");
            });
            return;
        }

        if let Some(error) = self.state.apps_error.clone() {
            ui.colored_label(ERROR_COLOR, "Error loading apps");
            ui.label(error.to_string());
            if ui.button("Retry").clicked() {
                self.state.dispatch(Action::RetryApps);
            }
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            let apps = self.state.apps.clone();
            for app in apps {
                let is_selected =
                    self.state.session.selected_app_id.as_deref() == Some(app.id.as_str());
                let label = format!("{} {}", icon_glyph(app.icon.as_deref()), app.name);
                if ui.selectable_label(is_selected, label).clicked() {
                    self.state.dispatch(Action::SelectApp { app_id: app.id });
                }
            }
        });
    }

    // ------------------------------------------------------------------
    // Canvas: one of loading / error / no app / live graph.
    // ------------------------------------------------------------------

    fn show_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| {
                if self.state.graph_loading() {
                    ui.centered_and_justified(|ui| {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Loading graph...");
                        });
                    });
                    return;
                }

                if let Some(error) = self.state.graph_error.clone() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() * 0.4);
                        ui.colored_label(ERROR_COLOR, "Error loading graph");
                        ui.label(error.to_string());
                        if ui.button("Retry").clicked() {
                            self.state.dispatch(Action::RetryGraph);
                        }
                    });
                    return;
                }

                if self.state.session.selected_app_id.is_none() {
                    ui.centered_and_justified(|ui| {
                        ui.label("Select an app to view its graph");
                    });
                    return;
                }

                self.show_graph(ui);
            });
    }

    fn show_graph(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("➕ Service").clicked() {
                self.state.dispatch(Action::AddNode {
                    kind: NodeKind::Service,
                });
            }
            if ui.button("➕ Database").clicked() {
                self.state.dispatch(Action::AddNode {
                    kind: NodeKind::Database,
                });
            }
        });
        ui.separator();

        // Holding Ctrl switches the canvas from move/select to connect.
        let connect_mode = ui.input(|i| i.modifiers.ctrl);

        let available_height = ui.available_height() - 24.0;
        ui.allocate_ui_with_layout(
            egui::Vec2::new(ui.available_width(), available_height),
            egui::Layout::top_down(egui::Align::Center),
            |ui| {
                let settings_interaction = SettingsInteraction::new()
                    .with_dragging_enabled(!connect_mode)
                    .with_node_clicking_enabled(true);
                let settings_navigation = SettingsNavigation::new()
                    .with_zoom_and_pan_enabled(true)
                    .with_fit_to_screen_enabled(self.fit_requested)
                    .with_fit_to_screen_padding(FIT_PADDING);
                let settings_style = SettingsStyle::new().with_labels_always(true);

                let response = ui.add(
                    &mut TopoGraphView::new(self.state.store.graph_mut())
                        .with_interactions(&settings_interaction)
                        .with_navigations(&settings_navigation)
                        .with_styles(&settings_style),
                );
                self.fit_requested = false;

                let pointer = ui.input(|i| i.pointer.clone());
                if connect_mode {
                    if let Some((from, to)) = self.handle_connect_gesture(&pointer) {
                        ui.painter().line_segment(
                            [from, to],
                            egui::Stroke::new(EDGE_PREVIEW_STROKE_WIDTH, EDGE_PREVIEW_COLOR),
                        );
                    }
                } else {
                    self.connect_from = None;
                    self.connect_started = false;
                    if response.hovered() && pointer.primary_clicked() {
                        // A node click selects it; empty canvas clears
                        // the selection.
                        let node_id = self
                            .state
                            .store
                            .graph()
                            .hovered_node()
                            .and_then(|idx| self.state.store.node_id(idx));
                        self.state.dispatch(Action::SelectNode { node_id });
                    }
                }
            },
        );

        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            ui.label("F fit view · P toggle panel · Del delete node · Ctrl-drag connect");
            ui.separator();
        });
    }

    // Drag-to-connect workflow: press on the source node, drag past the
    // threshold, release over the target. Releasing over the source
    // itself wires a self-loop; the store takes whatever it is handed.
    // Returns preview line coordinates while the drag is live.
    fn handle_connect_gesture(
        &mut self,
        pointer: &egui::PointerState,
    ) -> Option<(egui::Pos2, egui::Pos2)> {
        if pointer.primary_pressed()
            && let Some(hovered) = self.state.store.graph().hovered_node()
            && let Some(press_pos) = pointer.interact_pos()
        {
            self.connect_from = Some((hovered, press_pos));
            self.connect_started = false;
        }

        if pointer.primary_down()
            && self.connect_from.is_some()
            && pointer.delta().length() > DRAG_THRESHOLD
        {
            self.connect_started = true;
        }

        let preview = if self.connect_started {
            self.connect_from
                .and_then(|(_, from)| pointer.hover_pos().map(|to| (from, to)))
        } else {
            None
        };

        if pointer.primary_released() {
            if let Some((source_idx, _)) = self.connect_from
                && self.connect_started
                && let Some(target_idx) = self.state.store.graph().hovered_node()
                && let (Some(source_id), Some(target_id)) = (
                    self.state.store.node_id(source_idx),
                    self.state.store.node_id(target_idx),
                )
            {
                self.state.dispatch(Action::Connect {
                    source_id,
                    target_id,
                });
            }
            self.connect_from = None;
            self.connect_started = false;
        }

        preview
    }
}

fn icon_glyph(icon: Option<&str>) -> &'static str {
    match icon {
        Some("lightbulb") => "💡",
        Some("gear") => "⚙",
        Some("rocket") => "🚀",
        Some("star") => "⭐",
        _ => "📦",
    }
}
