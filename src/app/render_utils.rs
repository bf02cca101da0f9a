use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::graph::Role;

const CENTER_COLOR: Color32 = Color32::from_rgb(0xe9, 0x1e, 0x63);
const PEER_COLOR: Color32 = Color32::from_rgb(0x2b, 0x7c, 0xe9);
const VERIFIED_EDGE_COLOR: Color32 = Color32::from_rgb(0xff, 0x00, 0x00);
const PREDICTED_EDGE_COLOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);

pub(super) fn role_color(role: Role) -> Color32 {
    match role {
        Role::Center => CENTER_COLOR,
        Role::Peer => PEER_COLOR,
    }
}

pub(super) fn edge_color(verified: bool) -> Color32 {
    if verified {
        VERIFIED_EDGE_COLOR
    } else {
        PREDICTED_EDGE_COLOR
    }
}

pub(super) fn edge_stroke_width(weight: f64, zoom: f32) -> f32 {
    (weight as f32 * 3.0 * zoom.sqrt()).clamp(0.5, 6.0)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 250));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(200, 205, 212, 90));

    let mut x = origin.x.rem_euclid(step) + rect.left();
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step) + rect.top();
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

pub(super) fn fit_view(
    size: Vec2,
    positions: impl IntoIterator<Item = Vec2>,
    margin: f32,
) -> Option<(Vec2, f32)> {
    let mut positions = positions.into_iter();
    let first = positions.next()?;
    let (min, max) = positions.fold((first, first), |(min, max), position| {
        (min.min(position), max.max(position))
    });

    let extent = (max - min).max(Vec2::splat(1.0));
    let available = (size - Vec2::splat(margin * 2.0)).max(Vec2::splat(1.0));
    let zoom = (available.x / extent.x).min(available.y / extent.y).clamp(0.05, 2.5);
    let mid = (min + max) * 0.5;

    Some((-mid * zoom, zoom))
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn fit_view_centers_the_bounding_box() {
        let (pan, zoom) = fit_view(
            vec2(400.0, 200.0),
            [vec2(-100.0, -50.0), vec2(300.0, 50.0)],
            0.0,
        )
        .unwrap();

        assert!((zoom - 1.0).abs() < 1e-6);
        assert_eq!(pan, vec2(-100.0, 0.0));

        let rect = Rect::from_min_size(Pos2::ZERO, vec2(400.0, 200.0));
        assert_eq!(world_to_screen(rect, pan, zoom, vec2(-100.0, -50.0)), pos2(0.0, 50.0));
        assert!(fit_view(vec2(400.0, 200.0), std::iter::empty(), 10.0).is_none());
    }

    #[test]
    fn screen_and_world_coordinates_round_trip() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), vec2(300.0, 300.0));
        let world = vec2(12.0, -8.0);
        let screen = world_to_screen(rect, vec2(5.0, 5.0), 1.5, world);
        let back = screen_to_world(rect, vec2(5.0, 5.0), 1.5, screen);
        assert!((back - world).length() < 1e-4);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let start = pos2(0.0, 0.0);
        let end = pos2(10.0, 0.0);
        assert!((distance_to_segment(pos2(5.0, 3.0), start, end) - 3.0).abs() < 1e-6);
        assert!((distance_to_segment(pos2(-4.0, 3.0), start, end) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn weak_edges_keep_a_visible_stroke() {
        assert!(edge_stroke_width(0.0, 1.0) >= 0.5);
        assert!((edge_stroke_width(1.0, 1.0) - 3.0).abs() < 1e-6);
        assert_eq!(edge_color(true), VERIFIED_EDGE_COLOR);
        assert_eq!(role_color(Role::Center), CENTER_COLOR);
    }
}
