mod app;
mod network;

use std::path::PathBuf;

use clap::Parser;

use app::{AppConfig, EncodingSettings, ForceParams};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with `nodes` (id, name, country) and `links` (source, target).
    #[arg(long, default_value = "author_network.json")]
    data: PathBuf,

    /// Many-body strength; negative values repel.
    #[arg(long, default_value_t = -30.0, allow_negative_numbers = true)]
    charge_strength: f32,

    /// Extra spacing added to every node's radius for collisions.
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    collision_padding: f32,

    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    link_strength: f32,

    /// Rest length of a co-authorship link.
    #[arg(long, default_value_t = 30.0)]
    link_distance: f32,

    /// How many of the most common countries get their own color.
    #[arg(long, default_value_t = 10)]
    top_countries: usize,
}

impl Args {
    fn into_config(self) -> AppConfig {
        AppConfig {
            data_path: self.data,
            force_params: ForceParams {
                charge_strength: self.charge_strength,
                collision_padding: self.collision_padding,
                link_strength: self.link_strength,
                link_distance: self.link_distance,
                ..ForceParams::default()
            },
            encoding: EncodingSettings {
                top_countries: self.top_countries,
                ..EncodingSettings::default()
            },
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();
    tracing::info!(data = %config.data_path.display(), "starting coauthor-graph");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 920.0])
            .with_title("coauthor-graph"),
        ..Default::default()
    };

    eframe::run_native(
        "coauthor-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::CoauthorGraphApp::new(cc, config)))),
    )
}
