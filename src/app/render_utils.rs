use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) const MIN_ZOOM: f32 = 0.1;
pub(super) const MAX_ZOOM: f32 = 10.0;

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 248));

    // Grid spacing follows the zoom so the canvas visibly moves with the content.
    let step = 80.0 * zoom;
    if step < 12.0 {
        return;
    }

    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(0, 0, 0, 12));
    let origin = rect.center() + pan;

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
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

/// Conservative segment/rectangle test used to skip links that are entirely
/// off screen.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    if !bounds.intersects(rect) {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let straddles = |c1: f32, c2: f32| (c1 <= 0.0 && c2 >= 0.0) || (c1 >= 0.0 && c2 <= 0.0);

    straddles(cross(a1, a2, b1), cross(a1, a2, b2))
        && straddles(cross(b1, b2, a1), cross(b1, b2, a2))
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// New pan offset that keeps the world point under `anchor` fixed while the
/// zoom changes.
pub(super) fn zoom_about(
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    anchor: Pos2,
    factor: f32,
) -> (Vec2, f32) {
    let world = screen_to_world(rect, pan, zoom, anchor);
    let next_zoom = (zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    let next_pan = anchor - rect.center() - (world * next_zoom);
    (next_pan, next_zoom)
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    #[test]
    fn screen_and_world_round_trip() {
        let rect = viewport();
        let pan = vec2(35.0, -12.0);
        let world = vec2(-140.0, 72.5);
        let screen = world_to_screen(rect, pan, 2.5, world);
        assert!((screen_to_world(rect, pan, 2.5, screen) - world).length() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped_to_extent() {
        let rect = viewport();
        let (_, zoomed_in) = zoom_about(rect, Vec2::ZERO, 9.0, rect.center(), 4.0);
        let (_, zoomed_out) = zoom_about(rect, Vec2::ZERO, 0.2, rect.center(), 0.1);
        assert_eq!(zoomed_in, MAX_ZOOM);
        assert_eq!(zoomed_out, MIN_ZOOM);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let rect = viewport();
        let anchor = pos2(620.0, 140.0);
        let pan = vec2(10.0, 20.0);
        let before = screen_to_world(rect, pan, 1.0, anchor);
        let (next_pan, next_zoom) = zoom_about(rect, pan, 1.0, anchor, 1.4);
        let after = screen_to_world(rect, next_pan, next_zoom, anchor);
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn offscreen_edges_are_culled() {
        let rect = viewport();
        assert!(edge_visible(rect, pos2(-50.0, 300.0), pos2(900.0, 300.0), 1.0));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, -80.0), 1.0));
        assert!(edge_visible(rect, pos2(400.0, 300.0), pos2(1200.0, 900.0), 1.0));
    }
}
