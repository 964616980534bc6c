use eframe::egui::{self, PointerButton, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::controller::GraphEvent;
use super::super::render_utils::{circle_visible, screen_to_world, zoom_about};

/// Topmost node under `point`. Nodes drawn later sit on top, so ties resolve
/// to the higher index.
pub(in crate::app) fn node_at(
    point: Pos2,
    visible_indices: &[usize],
    screen_positions: &[Pos2],
    screen_radii: &[f32],
) -> Option<usize> {
    visible_indices
        .iter()
        .rev()
        .copied()
        .filter_map(|index| {
            let distance = screen_positions.get(index)?.distance(point);
            (distance <= *screen_radii.get(index)?).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
        let factor = if (pinch - 1.0).abs() > f32::EPSILON {
            pinch
        } else if scroll.abs() > f32::EPSILON {
            (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15)
        } else {
            return;
        };

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        (self.pan, self.zoom) = zoom_about(rect, self.pan, self.zoom, pointer, factor);
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible_indices: &mut Vec<usize>,
    ) {
        visible_indices.clear();
        visible_indices.extend(
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index])),
        );
    }

    /// Turns this frame's pointer activity on the canvas into graph events.
    /// Dragging empty canvas pans instead.
    pub(in crate::app) fn collect_pointer_events(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) -> Vec<GraphEvent> {
        let mut events = Vec::new();
        let scratch = &self.graph.view_scratch;
        let hit = |point: Pos2| {
            node_at(
                point,
                &scratch.visible_indices,
                &scratch.screen_positions,
                &scratch.screen_radii,
            )
        };

        if !self.interaction.is_dragging() {
            let under_pointer = response.hover_pos().and_then(hit);
            match (self.interaction.hovered(), under_pointer) {
                (previous, Some(node)) if previous != Some(node) => {
                    events.push(GraphEvent::HoverEnter { node });
                }
                (Some(_), None) => events.push(GraphEvent::HoverLeave),
                _ => {}
            }
        }

        if response.drag_started_by(PointerButton::Primary) {
            let origin = ui.input(|input| input.pointer.press_origin());
            if let Some(node) = origin.and_then(hit) {
                self.pointer_drag = Some(node);
                events.push(GraphEvent::DragStart { node });
            }
        }

        if response.dragged_by(PointerButton::Primary) {
            match (self.pointer_drag, response.interact_pointer_pos()) {
                (Some(node), Some(pointer)) => events.push(GraphEvent::DragMove {
                    node,
                    world: screen_to_world(rect, self.pan, self.zoom, pointer),
                }),
                (None, _) => self.pan += response.drag_delta(),
                _ => {}
            }
        }

        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }

        if response.drag_stopped()
            && let Some(node) = self.pointer_drag.take()
        {
            events.push(GraphEvent::DragEnd { node });
        }

        // Clicks are read from the whole window so that the side panels and
        // the top bar also close an open popup.
        let clicked = ui.input(|input| input.pointer.primary_clicked());
        let canvas_hit = response
            .clicked_by(PointerButton::Primary)
            .then(|| response.interact_pointer_pos())
            .flatten()
            .and_then(|pointer| hit(pointer).map(|node| (node, pointer)));
        events.extend(GraphEvent::for_click(clicked, canvas_hit));

        events
    }

    pub(in crate::app) fn apply_events(&mut self, events: impl IntoIterator<Item = GraphEvent>) {
        for event in events {
            self.interaction
                .dispatch(event, &mut self.graph.simulation, &self.network);
        }
    }
}
