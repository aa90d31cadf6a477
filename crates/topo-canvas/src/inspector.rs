use crate::actions::Action;
use crate::node_shapes::status_style;
use crate::session::{InspectorTab, Session};
use eframe::egui;
use topology::{NodeKind, NodePatch, ServiceNodeData};

/// How long the over-100 warning stays visible before clearing itself.
pub const WARNING_SECS: f64 = 3.0;

/// Transient, two-way-bound form state for the selected node.
///
/// The store is the source of truth; these fields are working copies
/// that are overwritten from it exactly once per selection change,
/// never while the same node stays selected — that distinction is what
/// keeps an in-progress edit from being stomped by a re-render.
pub struct Inspector {
    bound_node_id: Option<String>,
    name: String,
    description: String,
    /// Canonical numeric value, always in 0..=100.
    slider_value: u8,
    /// Provisional text buffer for the numeric field. Only commits to
    /// `slider_value` (and the store) after passing validation.
    input_value: String,
    warning_until: Option<f64>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            bound_node_id: None,
            name: String::new(),
            description: String::new(),
            slider_value: 50,
            input_value: "50".to_string(),
            warning_until: None,
        }
    }

    /// Refresh the working copies when the selection moved to a
    /// different node; leave them alone otherwise.
    pub fn rebind(&mut self, selected: Option<&ServiceNodeData>) {
        match selected {
            Some(data) => {
                if self.bound_node_id.as_deref() != Some(data.id.as_str()) {
                    self.bound_node_id = Some(data.id.clone());
                    self.name = data.name.clone();
                    self.description = data.description.clone().unwrap_or_default();
                    self.slider_value = data.slider_value;
                    self.input_value = data.slider_value.to_string();
                    self.warning_until = None;
                }
            }
            None => self.bound_node_id = None,
        }
    }

    pub fn set_name(&mut self, name: String) -> NodePatch {
        self.name = name.clone();
        NodePatch::default().with_name(name)
    }

    pub fn set_description(&mut self, description: String) -> NodePatch {
        self.description = description.clone();
        NodePatch::default().with_description(description)
    }

    /// Slider moved: both controls and the store follow immediately.
    pub fn set_from_slider(&mut self, value: u8) -> NodePatch {
        self.slider_value = value;
        self.input_value = value.to_string();
        NodePatch::default().with_slider_value(value)
    }

    /// Raw text typed into the numeric field. Returns a patch only when
    /// the text passes validation:
    /// - empty text is kept (the user is clearing before retyping) but
    ///   touches neither `slider_value` nor the store;
    /// - non-numeric or negative text is dropped without updating the
    ///   displayed text;
    /// - values over 100 raise the transient warning and are dropped;
    /// - values in 0..=100 update everything and clear the warning.
    pub fn set_from_text(&mut self, raw: &str, now: f64) -> Option<NodePatch> {
        self.warning_until = None;

        if raw.is_empty() {
            self.input_value.clear();
            return None;
        }

        let Ok(value) = raw.parse::<i64>() else {
            return None;
        };
        if value < 0 {
            return None;
        }
        if value > 100 {
            self.warning_until = Some(now + WARNING_SECS);
            return None;
        }

        self.input_value = raw.to_string();
        self.slider_value = value as u8;
        Some(NodePatch::default().with_slider_value(self.slider_value))
    }

    /// The text field lost focus: an emptied field snaps back to the
    /// canonical value. The store was never touched by the clearing.
    pub fn handle_blur(&mut self) {
        if self.input_value.is_empty() {
            self.input_value = self.slider_value.to_string();
        }
    }

    pub fn warning_active(&self, now: f64) -> bool {
        self.warning_until.is_some_and(|until| now < until)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render the inspector for the given node record (`None` renders
    /// the placeholder). Returns the actions the edits produced.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        selected: Option<&ServiceNodeData>,
        session: &Session,
    ) -> Vec<Action> {
        self.rebind(selected);

        let Some(data) = selected else {
            ui.centered_and_justified(|ui| {
                ui.label("Select a node to inspect");
            });
            return Vec::new();
        };

        let node_id = data.id.clone();
        let now = ui.input(|i| i.time);
        let mut actions = Vec::new();

        // Header: node kind plus the read-only status badge.
        let kind_label = match data.node_type {
            NodeKind::Service => "Service Node",
            NodeKind::Database => "Database Node",
        };
        let badge = status_style(data.status);
        ui.horizontal(|ui| {
            ui.heading(kind_label);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(badge.color, format!("{} {}", badge.glyph, badge.label));
            });
        });
        ui.separator();

        let mut tab = session.inspector_tab;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut tab, InspectorTab::Config, "Config");
            ui.selectable_value(&mut tab, InspectorTab::Runtime, "Runtime");
        });
        if tab != session.inspector_tab {
            actions.push(Action::SetInspectorTab { tab });
        }
        ui.separator();

        match tab {
            InspectorTab::Config => self.show_config_tab(ui, &node_id, &mut actions),
            InspectorTab::Runtime => self.show_runtime_tab(ui, &node_id, now, &mut actions),
        }

        actions
    }

    fn show_config_tab(&mut self, ui: &mut egui::Ui, node_id: &str, actions: &mut Vec<Action>) {
        ui.label("Node Name");
        let mut name = self.name.clone();
        if ui.text_edit_singleline(&mut name).changed() {
            actions.push(Action::UpdateNodeData {
                node_id: node_id.to_string(),
                patch: self.set_name(name),
            });
        }

        ui.add_space(8.0);
        ui.label("Description");
        let mut description = self.description.clone();
        if ui
            .add(
                egui::TextEdit::multiline(&mut description)
                    .desired_rows(4)
                    .hint_text("Enter description..."),
            )
            .changed()
        {
            actions.push(Action::UpdateNodeData {
                node_id: node_id.to_string(),
                patch: self.set_description(description),
            });
        }
    }

    fn show_runtime_tab(
        &mut self,
        ui: &mut egui::Ui,
        node_id: &str,
        now: f64,
        actions: &mut Vec<Action>,
    ) {
        ui.label(format!("Value: {}", self.slider_value));

        let mut slider_value = self.slider_value;
        if ui
            .add(egui::Slider::new(&mut slider_value, 0..=100))
            .changed()
        {
            actions.push(Action::UpdateNodeData {
                node_id: node_id.to_string(),
                patch: self.set_from_slider(slider_value),
            });
        }

        // The text edit works on a scratch copy; rejected input never
        // reaches `input_value`, so the displayed text stays put.
        let mut text = self.input_value.clone();
        let response = ui.text_edit_singleline(&mut text);
        if response.changed()
            && let Some(patch) = self.set_from_text(&text, now)
        {
            actions.push(Action::UpdateNodeData {
                node_id: node_id.to_string(),
                patch,
            });
        }
        if response.lost_focus() {
            self.handle_blur();
        }

        if self.warning_active(now) {
            ui.colored_label(
                egui::Color32::from_rgb(239, 68, 68),
                "⚠ Value more than 100 not allowed",
            );
            // Keep repainting so the warning disappears on schedule.
            ui.ctx()
                .request_repaint_after(std::time::Duration::from_millis(250));
        }

        self.show_load_gauge(ui);
        ui.add_space(4.0);
        ui.small("Slider and input are synced. Changes persist to node data.");
    }

    fn show_load_gauge(&self, ui: &mut egui::Ui) {
        let fraction = f32::from(self.slider_value) / 100.0;
        let ramp = colorous::RED_YELLOW_GREEN.eval_continuous(1.0 - f64::from(fraction));
        let color = egui::Color32::from_rgb(ramp.r, ramp.g, ramp.b);

        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), 6.0),
            egui::Sense::hover(),
        );
        let painter = ui.painter();
        painter.rect_filled(rect, 3.0, ui.visuals().extreme_bg_color);
        let mut fill = rect;
        fill.set_right(rect.left() + rect.width() * fraction);
        painter.rect_filled(fill, 3.0, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topology::{NodeStatus, ServiceNodeData};

    fn node_data(id: &str, slider_value: u8) -> ServiceNodeData {
        ServiceNodeData {
            id: id.to_string(),
            name: "API Gateway".to_string(),
            node_type: NodeKind::Service,
            status: NodeStatus::Healthy,
            description: Some("Main API gateway service".to_string()),
            slider_value,
        }
    }

    fn bound_inspector() -> Inspector {
        let mut inspector = Inspector::new();
        inspector.rebind(Some(&node_data("a1-node-1", 50)));
        inspector
    }

    #[test]
    fn test_rebind_copies_fields_on_selection_change() {
        let inspector = bound_inspector();
        assert_eq!(inspector.name, "API Gateway");
        assert_eq!(inspector.description, "Main API gateway service");
        assert_eq!(inspector.slider_value, 50);
        assert_eq!(inspector.input_value, "50");
    }

    #[test]
    fn test_rebind_keeps_in_progress_edits_for_the_same_node() {
        let mut inspector = bound_inspector();
        inspector.set_from_text("7", 0.0);

        // The same node arriving again (a re-render) must not clobber
        // the user's edit in progress.
        inspector.rebind(Some(&node_data("a1-node-1", 50)));
        assert_eq!(inspector.input_value, "7");
        assert_eq!(inspector.slider_value, 7);

        // A different node does reset everything.
        inspector.rebind(Some(&node_data("a1-node-2", 30)));
        assert_eq!(inspector.slider_value, 30);
        assert_eq!(inspector.input_value, "30");
    }

    #[test]
    fn test_deselect_then_reselect_rebinds_fresh() {
        let mut inspector = bound_inspector();
        inspector.set_from_text("7", 0.0);
        inspector.rebind(None);
        inspector.rebind(Some(&node_data("a1-node-1", 50)));
        assert_eq!(inspector.slider_value, 50);
        assert_eq!(inspector.input_value, "50");
    }

    #[test]
    fn test_value_over_100_is_rejected_with_a_transient_warning() {
        let mut inspector = bound_inspector();
        let patch = inspector.set_from_text("150", 10.0);

        assert!(patch.is_none());
        assert_eq!(inspector.slider_value, 50);
        assert_eq!(inspector.input_value, "50");
        assert!(inspector.warning_active(10.0));
        assert!(inspector.warning_active(10.0 + WARNING_SECS - 0.1));
        // Clears itself after three seconds.
        assert!(!inspector.warning_active(10.0 + WARNING_SECS + 0.1));
    }

    #[test]
    fn test_non_numeric_and_negative_text_are_dropped_silently() {
        let mut inspector = bound_inspector();
        for raw in ["abc", "-5", "12.5"] {
            let patch = inspector.set_from_text(raw, 0.0);
            assert!(patch.is_none(), "{raw:?} should be rejected");
            assert_eq!(inspector.input_value, "50");
            assert!(!inspector.warning_active(0.0), "{raw:?} should not warn");
        }
    }

    #[test]
    fn test_empty_text_is_transient_and_blur_restores_it() {
        let mut inspector = bound_inspector();
        assert!(inspector.set_from_text("", 0.0).is_none());
        assert_eq!(inspector.input_value, "");
        assert_eq!(inspector.slider_value, 50);

        inspector.handle_blur();
        assert_eq!(inspector.input_value, "50");
    }

    #[test]
    fn test_blur_with_text_present_changes_nothing() {
        let mut inspector = bound_inspector();
        inspector.set_from_text("75", 0.0);
        inspector.handle_blur();
        assert_eq!(inspector.input_value, "75");
    }

    #[test]
    fn test_valid_text_commits_and_clears_the_warning() {
        let mut inspector = bound_inspector();
        inspector.set_from_text("150", 0.0);
        assert!(inspector.warning_active(0.0));

        let patch = inspector.set_from_text("75", 1.0);
        assert_eq!(patch, Some(NodePatch::default().with_slider_value(75)));
        assert_eq!(inspector.slider_value, 75);
        assert_eq!(inspector.input_value, "75");
        assert!(!inspector.warning_active(1.0));
    }

    #[test]
    fn test_slider_and_text_stay_in_sync() {
        let mut inspector = bound_inspector();
        let patch = inspector.set_from_slider(82);
        assert_eq!(patch, NodePatch::default().with_slider_value(82));
        assert_eq!(inspector.input_value, "82");

        inspector.set_from_text("13", 0.0);
        assert_eq!(inspector.slider_value, 13);
        assert_eq!(inspector.input_value, "13");
    }
}
