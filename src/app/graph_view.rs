use std::time::Instant;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};

use crate::graph::Role;
use crate::util::format_score;

use super::InteractomeApp;
use super::render_utils::{
    circle_visible, distance_to_segment, draw_background, edge_color, edge_stroke_width,
    fit_view, role_color, screen_to_world, world_to_screen,
};

const NODE_RADIUS: f32 = 14.0;
const CENTER_RADIUS: f32 = 18.0;
const FIT_MARGIN: f32 = 48.0;
const EDGE_HOVER_DISTANCE: f32 = 5.0;

impl InteractomeApp {
    fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let viewport = &mut self.viewport;
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, viewport.pan, viewport.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        viewport.zoom = (viewport.zoom * zoom_factor).clamp(0.05, 6.0);
        viewport.pan = pointer - rect.center() - (world_before * viewport.zoom);
    }

    fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.viewport.pan += response.drag_delta();
        }
    }

    fn fit_if_needed(&mut self, rect: Rect, now: Instant) {
        let resized = self.viewport.track_canvas(now, rect.size());
        let state = self.controller.state();
        let revision = state.revision();
        if !resized && self.viewport.fitted_revision == Some(revision) {
            return;
        }

        if let Some((pan, zoom)) = fit_view(rect.size(), state.positions().values().copied(), FIT_MARGIN)
        {
            self.viewport.pan = pan;
            self.viewport.zoom = zoom;
        }
        self.viewport.fitted_revision = Some(revision);
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.fit_if_needed(rect, Instant::now());
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let pan = self.viewport.pan;
        let zoom = self.viewport.zoom;
        draw_background(&painter, rect, pan, zoom);

        let state = self.controller.state();
        let Some(snapshot) = state.snapshot() else {
            return;
        };
        let positions = state.positions();

        let screen_positions = snapshot
            .nodes()
            .iter()
            .map(|node| {
                positions
                    .get(&node.id)
                    .map(|world| world_to_screen(rect, pan, zoom, *world))
            })
            .collect::<Vec<Option<Pos2>>>();
        let radius_scale = zoom.powf(0.4).clamp(0.5, 1.6);
        let radius_of = |role: Role| match role {
            Role::Center => CENTER_RADIUS * radius_scale,
            Role::Peer => NODE_RADIUS * radius_scale,
        };

        let pointer = ui.input(|input| input.pointer.hover_pos()).filter(|pos| rect.contains(*pos));
        let hovered_node = pointer.and_then(|pointer| {
            snapshot
                .nodes()
                .iter()
                .zip(&screen_positions)
                .filter_map(|(node, position)| {
                    let distance = position.as_ref()?.distance(pointer);
                    (distance <= radius_of(node.role)).then_some((node, distance))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(node, _)| node)
        });

        let mut hovered_edge = None;
        for edge in snapshot.edges() {
            let (Some(from), Some(to)) = (
                snapshot.index_of(&edge.from).and_then(|index| screen_positions[index]),
                snapshot.index_of(&edge.to).and_then(|index| screen_positions[index]),
            ) else {
                continue;
            };

            let is_hovered = hovered_node.is_none()
                && hovered_edge.is_none()
                && pointer.is_some_and(|pointer| {
                    distance_to_segment(pointer, from, to) <= EDGE_HOVER_DISTANCE
                });
            if is_hovered {
                hovered_edge = Some(edge);
            }

            let width = edge_stroke_width(edge.weight, zoom) + if is_hovered { 1.5 } else { 0.0 };
            painter.line_segment([from, to], Stroke::new(width, edge_color(edge.verified)));
        }

        for (node, position) in snapshot.nodes().iter().zip(&screen_positions) {
            let Some(position) = *position else {
                continue;
            };
            let radius = radius_of(node.role);
            if !circle_visible(rect, position, radius + 80.0) {
                continue;
            }

            let is_hovered = hovered_node.is_some_and(|hovered| hovered.id == node.id);
            painter.circle_filled(position, radius, role_color(node.role));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if is_hovered { 3.0 } else { 2.0 },
                    Color32::from_rgba_unmultiplied(255, 255, 255, 220),
                ),
            );
            painter.text(
                position + vec2(radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                node.id.as_str(),
                FontId::proportional(14.0),
                Color32::from_gray(51),
            );
        }

        let status = if let Some(node) = hovered_node {
            Some(format!(
                "{}  |  {}  |  {} interactions",
                node.id,
                node.role.label(),
                snapshot.degree(&node.id)
            ))
        } else {
            hovered_edge.map(|edge| {
                format!(
                    "{} - {}  |  Score: {}",
                    edge.from,
                    edge.to,
                    format_score(edge.score)
                )
            })
        };
        if let Some(status) = status {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                status,
                FontId::proportional(13.0),
                Color32::from_gray(40),
            );
        }

        if hovered_node.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let clicked = response
            .clicked_by(egui::PointerButton::Primary)
            .then(|| hovered_node.map(|node| node.id.clone()))
            .flatten();
        if let Some(node_id) = clicked {
            self.activate(&node_id);
        }
    }
}
