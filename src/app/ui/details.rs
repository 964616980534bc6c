use eframe::egui::{self, Align, Layout, RichText, Ui};

use crate::network::AuthorNetwork;

use super::super::ViewModel;
use super::super::controller::GraphEvent;

/// Co-authors of `node`, most connected first.
fn coauthors_by_degree(network: &AuthorNetwork, node: usize) -> Vec<usize> {
    let mut coauthors = network.coauthors.get(node).cloned().unwrap_or_default();
    coauthors.sort_by(|&a, &b| {
        network.authors[b]
            .degree
            .cmp(&network.authors[a].degree)
            .then_with(|| network.authors[a].name.cmp(&network.authors[b].name))
    });
    coauthors
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Author Details");
        ui.add_space(6.0);

        let Some(selected) = self.interaction.selected() else {
            ui.label("Click an author on the canvas or pick one from search.");
            return;
        };
        let Some(author) = self.network.authors.get(selected) else {
            ui.label("Selected author is not part of the current network.");
            return;
        };

        ui.label(RichText::new(author.name.as_str()).strong());
        ui.small(format!("id: {}", author.id));
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter()
                .circle_filled(rect.center(), 5.0, self.graph.colors[selected]);
            ui.label(format!("Country: {}", author.country));
        });
        ui.label(format!("Co-authorships: {}", author.degree));
        if let Some(position) = self.graph.simulation.position(selected) {
            ui.label(format!("Position: ({:.1}, {:.1})", position.x, position.y));
        }
        if self.graph.simulation.is_pinned(selected) {
            ui.label("Pinned while dragged");
        }

        ui.separator();
        ui.label(RichText::new("Co-authors").strong());

        let coauthors = coauthors_by_degree(&self.network, selected);
        if coauthors.is_empty() {
            ui.label("No co-authors in this network.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("coauthors_scroll")
            .max_height(360.0)
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, coauthors.len(), |ui, row_range| {
                for &node in &coauthors[row_range] {
                    let coauthor = &self.network.authors[node];
                    ui.horizontal(|ui| {
                        if ui
                            .link(coauthor.name.as_str())
                            .on_hover_text(coauthor.country.as_str())
                            .clicked()
                        {
                            clicked = Some(node);
                        }
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            ui.weak(coauthor.degree.to_string());
                        });
                    });
                }
            });

        if let Some(node) = clicked {
            self.apply_events([GraphEvent::SelectAuthor { node }]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::network_from_json;

    #[test]
    fn coauthors_are_ordered_by_degree_then_name() {
        let network = network_from_json(
            r#"{
                "nodes": [
                    {"id": 1, "name": "Hub", "country": "US"},
                    {"id": 2, "name": "Zed", "country": "US"},
                    {"id": 3, "name": "Amy", "country": "FR"},
                    {"id": 4, "name": "Max", "country": "FR"}
                ],
                "links": [
                    {"source": 1, "target": 2},
                    {"source": 1, "target": 3},
                    {"source": 1, "target": 4},
                    {"source": 4, "target": 2}
                ]
            }"#,
        );

        let names = coauthors_by_degree(&network, 0)
            .into_iter()
            .map(|index| network.authors[index].name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Max", "Zed", "Amy"]);
        assert!(coauthors_by_degree(&network, 99).is_empty());
    }
}
