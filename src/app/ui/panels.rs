use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::network::AuthorNetwork;

use super::controls::ParameterPanel;
use super::super::controller::InteractionState;
use super::super::encoding::VisualEncoding;
use super::super::{AppConfig, RenderGraph, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(network: AuthorNetwork, config: &AppConfig) -> Self {
        let encoding = VisualEncoding::new(&network, config.encoding);
        let graph = RenderGraph::build(&network, &encoding, config.force_params);
        let parameters = ParameterPanel::new(graph.simulation.params());
        tracing::info!(
            authors = network.author_count(),
            links = network.link_count(),
            colored_countries = encoding.palette.legend().len(),
            "author network ready"
        );

        Self {
            network,
            encoding,
            graph,
            interaction: InteractionState::default(),
            parameters,
            pointer_drag: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            show_quadtree_overlay: false,
            search: String::new(),
            search_match_cache: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        data_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("coauthor-graph");
                    ui.separator();
                    ui.label(format!("data: {}", data_path.display()));
                    ui.label(format!("authors: {}", self.network.author_count()));
                    ui.label(format!("links: {}", self.network.link_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let status = if self.graph.simulation.is_running() {
                            "settling"
                        } else {
                            "settled"
                        };
                        ui.label(format!("zoom {:.2}x  |  {status}", self.zoom));
                        if is_loading {
                            ui.spinner();
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.draw_controls(ui));
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
