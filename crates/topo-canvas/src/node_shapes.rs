use eframe::egui::{
    self, Color32, FontFamily, FontId, Pos2, Shape, Stroke, StrokeKind, Vec2,
    epaint::{CircleShape, TextShape},
};
use egui_graphs::{DisplayNode, DrawContext, NodeProps};
use once_cell::sync::Lazy;
use petgraph::{EdgeType, stable_graph::IndexType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use topology::{NodeKind, NodeStatus, ServiceNodeData};

const NODE_RADIUS: f32 = 10.0;
const LABEL_GAP: f32 = 4.0;
const LABEL_FONT: f32 = 12.0;

/// Badge styling for a node status, shared by the canvas dot and the
/// inspector header.
pub struct StatusStyle {
    pub label: &'static str,
    pub glyph: &'static str,
    pub color: Color32,
}

static STATUS_STYLES: Lazy<HashMap<NodeStatus, StatusStyle>> = Lazy::new(|| {
    HashMap::from([
        (NodeStatus::Healthy, StatusStyle {
            label: "Healthy",
            glyph: "✔",
            color: Color32::from_rgb(34, 197, 94),
        }),
        (NodeStatus::Degraded, StatusStyle {
            label: "Degraded",
            glyph: "⚠",
            color: Color32::from_rgb(245, 158, 11),
        }),
        (NodeStatus::Down, StatusStyle {
            label: "Down",
            glyph: "✖",
            color: Color32::from_rgb(239, 68, 68),
        }),
    ])
});

pub fn status_style(status: NodeStatus) -> &'static StatusStyle {
    &STATUS_STYLES[&status]
}

fn kind_fill(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Service => Color32::from_rgb(5, 46, 22),
        NodeKind::Database => Color32::from_rgb(23, 37, 84),
    }
}

fn kind_accent(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Service => Color32::from_rgb(34, 197, 94),
        NodeKind::Database => Color32::from_rgb(59, 130, 246),
    }
}

/// Canvas shape for one infrastructure node: services render as discs,
/// databases as rounded boxes, both with a status dot on the shoulder
/// and the node name underneath.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceNodeShape {
    pos: Pos2,
    selected: bool,
    dragged: bool,
    hovered: bool,
    color: Option<Color32>,
    label_text: String,
    kind: NodeKind,
    status: NodeStatus,
}

impl From<NodeProps<ServiceNodeData>> for ServiceNodeShape {
    fn from(props: NodeProps<ServiceNodeData>) -> Self {
        Self {
            pos: props.location(),
            selected: props.selected,
            dragged: props.dragged,
            hovered: props.hovered,
            color: props.color(),
            label_text: props.label.clone(),
            kind: props.payload.node_type,
            status: props.payload.status,
        }
    }
}

impl<E: Clone, Ty: EdgeType, Ix: IndexType> DisplayNode<ServiceNodeData, E, Ty, Ix>
    for ServiceNodeShape
{
    fn closest_boundary_point(&self, dir: Vec2) -> Pos2 {
        self.pos + dir.normalized() * NODE_RADIUS
    }

    fn shapes(&mut self, ctx: &DrawContext) -> Vec<Shape> {
        let mut res = Vec::with_capacity(3);
        let center_screen = ctx.meta.canvas_to_screen_pos(self.pos);
        let radius_screen = ctx.meta.canvas_to_screen_size(NODE_RADIUS);
        let fill = self.color.unwrap_or_else(|| kind_fill(self.kind));
        let stroke = self.effective_stroke();

        match self.kind {
            NodeKind::Service => {
                res.push(
                    CircleShape {
                        center: center_screen,
                        radius: radius_screen,
                        fill,
                        stroke,
                    }
                    .into(),
                );
            }
            NodeKind::Database => {
                let rect = egui::Rect::from_center_size(
                    center_screen,
                    Vec2::splat(radius_screen * 2.0),
                );
                res.push(Shape::rect_filled(rect, radius_screen * 0.3, fill));
                res.push(Shape::rect_stroke(
                    rect,
                    radius_screen * 0.3,
                    stroke,
                    StrokeKind::Inside,
                ));
            }
        }

        // Status dot on the upper-right shoulder.
        let dot_center = center_screen + Vec2::new(radius_screen, -radius_screen) * 0.8;
        res.push(
            CircleShape {
                center: dot_center,
                radius: radius_screen * 0.35,
                fill: status_style(self.status).color,
                stroke: Stroke::new(1.0, Color32::from_rgb(30, 30, 30)),
            }
            .into(),
        );

        let label_color = self.label_color(ctx);
        let galley = self.label_galley(ctx, label_color);
        let label_pos = Pos2::new(
            center_screen.x - galley.size().x / 2.0,
            center_screen.y + radius_screen + ctx.meta.canvas_to_screen_size(LABEL_GAP),
        );
        res.push(TextShape::new(label_pos, galley, label_color).into());
        res
    }

    fn update(&mut self, state: &NodeProps<ServiceNodeData>) {
        self.pos = state.location();
        self.selected = state.selected;
        self.dragged = state.dragged;
        self.hovered = state.hovered;
        self.color = state.color();
        self.label_text = state.label.clone();
        self.kind = state.payload.node_type;
        self.status = state.payload.status;
    }

    fn is_inside(&self, pos: Pos2) -> bool {
        match self.kind {
            NodeKind::Service => (pos - self.pos).length() <= NODE_RADIUS,
            NodeKind::Database => {
                egui::Rect::from_center_size(self.pos, Vec2::splat(NODE_RADIUS * 2.0))
                    .contains(pos)
            }
        }
    }
}

impl ServiceNodeShape {
    fn effective_stroke(&self) -> Stroke {
        if self.selected {
            Stroke::new(4.0, Color32::from_rgb(200, 60, 70))
        } else if self.hovered || self.dragged {
            Stroke::new(3.0, kind_accent(self.kind))
        } else {
            Stroke::new(2.0, kind_accent(self.kind))
        }
    }

    fn label_color(&self, ctx: &DrawContext) -> Color32 {
        let visuals = if self.selected || self.dragged || self.hovered {
            ctx.ctx.style().visuals.widgets.active
        } else {
            ctx.ctx.style().visuals.widgets.inactive
        };
        visuals.fg_stroke.color
    }

    fn label_galley(&self, ctx: &DrawContext, color: Color32) -> std::sync::Arc<egui::Galley> {
        ctx.ctx.fonts_mut(|f| {
            f.layout_no_wrap(
                self.label_text.clone(),
                FontId::new(LABEL_FONT, FontFamily::Monospace),
                color,
            )
        })
    }
}
