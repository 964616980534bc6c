use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Order, Rect, Sense, Stroke, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{
    draw_background, edge_visible, with_opacity, world_to_screen,
};
use super::super::{RenderGraph, SearchMatchCache, ViewModel};

const LINK_COLOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);
const LINK_OPACITY: f32 = 0.6;
const LINK_WIDTH: f32 = 1.5;
const SEARCH_RING_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const SELECTED_RING_COLOR: Color32 = Color32::from_rgb(245, 170, 40);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn update_screen_space(rect: Rect, pan: Vec2, zoom: f32, graph: &mut RenderGraph) {
        let scratch = &mut graph.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_positions.extend(
            graph
                .simulation
                .positions()
                .map(|world| world_to_screen(rect, pan, zoom, world)),
        );
        scratch.screen_radii.clear();
        scratch
            .screen_radii
            .extend(graph.radii.iter().map(|radius| radius * zoom));
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matches = Arc::new(
            self.ranked_search_matches(usize::MAX)
                .into_iter()
                .collect::<HashSet<_>>(),
        );
        self.search_match_cache = Some(SearchMatchCache {
            query: self.search.trim().to_owned(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    /// Authors whose name fuzzily matches the search box, best match first.
    pub(in crate::app) fn ranked_search_matches(&self, limit: usize) -> Vec<usize> {
        let query = self.search.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored = self
            .network
            .authors
            .iter()
            .enumerate()
            .filter_map(|(index, author)| {
                fuzzy_match_score(&matcher, &author.name, query).map(|score| (index, score))
            })
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.into_iter().take(limit).map(|(index, _)| index).collect()
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        if self.graph.simulation.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "This network has no authors.",
                FontId::proportional(15.0),
                Color32::from_gray(90),
            );
            return;
        }
        self.handle_graph_zoom(ui, rect, &response);

        if self.live_physics {
            self.graph.simulation.tick();
        }

        let pan = self.pan;
        let zoom = self.zoom;
        Self::update_screen_space(rect, pan, zoom, &mut self.graph);
        {
            let scratch = &mut self.graph.view_scratch;
            Self::visible_indices_into(
                rect,
                &scratch.screen_positions,
                &scratch.screen_radii,
                &mut scratch.visible_indices,
            );
        }

        // Hit tests use this frame's post-tick positions, the same ones drawn
        // below.
        let events = self.collect_pointer_events(ui, rect, &response);
        self.apply_events(events);

        if self.interaction.hovered().is_some() || self.pointer_drag.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        if self.show_quadtree_overlay {
            self.draw_quadtree_overlay(&painter, rect);
        }

        let search_matches = self.cached_search_matches();
        let graph = &self.graph;
        let scratch = &graph.view_scratch;

        let link_stroke = Stroke::new(LINK_WIDTH * zoom, with_opacity(LINK_COLOR, LINK_OPACITY));
        for (source, target) in graph.simulation.link_pairs() {
            let (Some(&start), Some(&end)) = (
                scratch.screen_positions.get(source),
                scratch.screen_positions.get(target),
            ) else {
                continue;
            };
            if !edge_visible(rect, start, end, link_stroke.width) {
                continue;
            }
            painter.line_segment([start, end], link_stroke);
        }

        let selected = self.interaction.selected();
        for &index in &scratch.visible_indices {
            let position = scratch.screen_positions[index];
            let radius = scratch.screen_radii[index];
            let opacity = self.interaction.node_opacity(index, &self.network);

            painter.circle_filled(position, radius, with_opacity(graph.colors[index], opacity));
            let outline = if self.interaction.is_dragging_node(index) {
                Stroke::new(2.0, Color32::from_gray(30))
            } else {
                Stroke::new(1.0, with_opacity(Color32::WHITE, opacity))
            };
            painter.circle_stroke(position, radius, outline);

            if search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index))
            {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.6, SEARCH_RING_COLOR),
                );
            }
            if selected == Some(index) {
                painter.circle_stroke(
                    position,
                    radius + 5.0,
                    Stroke::new(2.0, SELECTED_RING_COLOR),
                );
            }
            if graph.simulation.is_pinned(index) {
                painter.circle_filled(position, (radius * 0.3).max(1.5), Color32::from_gray(30));
            }
        }

        if let Some(author) = self
            .interaction
            .hovered()
            .and_then(|index| self.network.authors.get(index))
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  {} co-authors", author.name, author.country, author.degree),
                FontId::proportional(13.0),
                Color32::from_gray(40),
            );
        }

        self.draw_tooltip(ui);

        if (self.live_physics && self.graph.simulation.is_running())
            || self.interaction.is_dragging()
        {
            ui.ctx().request_repaint();
        }
    }

    fn draw_quadtree_overlay(&mut self, painter: &egui::Painter, rect: Rect) {
        let graph = &mut self.graph;
        graph
            .simulation
            .quadtree_cells(&mut graph.view_scratch.quadtree_cells);

        for cell in &graph.view_scratch.quadtree_cells {
            let half = vec2(cell.half_extent, cell.half_extent);
            let min = world_to_screen(rect, self.pan, self.zoom, cell.center - half);
            let max = world_to_screen(rect, self.pan, self.zoom, cell.center + half);

            let alpha = if cell.is_leaf { 110 } else { 55 };
            let line_width = (1.4 - (cell.depth as f32 * 0.09)).clamp(0.45, 1.4);
            painter.rect_stroke(
                Rect::from_min_max(min, max),
                0.0,
                Stroke::new(line_width, Color32::from_rgba_unmultiplied(60, 140, 220, alpha)),
                egui::StrokeKind::Middle,
            );
        }
    }

    fn draw_tooltip(&self, ui: &Ui) {
        let Some(tooltip) = self.interaction.tooltip() else {
            return;
        };
        let Some((author_line, country_line)) = tooltip.lines(&self.network) else {
            return;
        };

        egui::Area::new(egui::Id::new("author_tooltip"))
            .order(Order::Tooltip)
            .fixed_pos(tooltip.anchor + vec2(10.0, -28.0))
            .interactable(false)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(author_line);
                    ui.label(country_line);
                });
            });
    }
}
