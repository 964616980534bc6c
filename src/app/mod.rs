use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Color32, Context, Pos2, Vec2};

use crate::network::{AuthorNetwork, load_author_network};

mod controller;
mod encoding;
mod graph;
mod physics;
mod render_utils;
mod ui;

use controller::InteractionState;
pub use encoding::EncodingSettings;
use encoding::VisualEncoding;
pub use physics::ForceParams;
use physics::{ForceSimulation, QuadtreeCell};
use ui::controls::ParameterPanel;

/// Everything the app needs from the command line.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub force_params: ForceParams,
    pub encoding: EncodingSettings,
}

pub struct CoauthorGraphApp {
    config: AppConfig,
    state: AppState,
    reload_rx: Option<Receiver<Result<AuthorNetwork, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<AuthorNetwork, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    network: AuthorNetwork,
    encoding: VisualEncoding,
    graph: RenderGraph,
    interaction: InteractionState,
    parameters: ParameterPanel,
    pointer_drag: Option<usize>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    show_quadtree_overlay: bool,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

/// Per-node drawing data next to the simulation that positions it. Indices
/// line up with `AuthorNetwork::authors`.
struct RenderGraph {
    simulation: ForceSimulation,
    radii: Vec<f32>,
    colors: Vec<Color32>,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    quadtree_cells: Vec<QuadtreeCell>,
}

impl CoauthorGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let state = Self::start_load(&config);
        Self {
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(config: &AppConfig) -> Receiver<Result<AuthorNetwork, String>> {
        let (tx, rx) = mpsc::channel();
        let data_path = config.data_path.clone();

        thread::spawn(move || {
            let result = load_author_network(&data_path).map_err(|error| {
                tracing::error!("failed to load author network: {error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(config: &AppConfig) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(config),
        }
    }

    fn ready(&self, network: AuthorNetwork) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(network, &self.config)))
    }
}

impl eframe::App for CoauthorGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry_load = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading author network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load author network");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        retry_load = true;
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.config.data_path,
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(&self.config));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry_load {
            self.state = Self::start_load(&self.config);
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(network) => self.ready(network),
                Err(error) => AppState::Error(error),
            };
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::network::AuthorNetwork;

    pub(crate) const CHAIN_OF_THREE: &str = r#"{
        "nodes": [
            {"id": "A", "name": "Alice", "country": "NL"},
            {"id": "B", "name": "Bob", "country": "NL"},
            {"id": "C", "name": "Carol", "country": "DE"}
        ],
        "links": [
            {"source": "A", "target": "B"},
            {"source": "B", "target": "C"}
        ]
    }"#;

    pub(crate) fn network_from_json(raw: &str) -> AuthorNetwork {
        AuthorNetwork::from_json(raw).expect("valid test network")
    }
}
