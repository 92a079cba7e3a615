mod app;
mod data;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::info;

use data::{FileProvider, GraphDataProvider, HttpProvider};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the ontology service serving /api/rdf/graph-data.
    #[arg(long, default_value = "http://localhost:8080")]
    url: String,

    /// Read graph data from a JSON file instead of the service.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 920.0)]
    height: f32,

    /// Approximate repulsion with a Barnes-Hut quadtree at this opening angle.
    #[arg(long, value_name = "THETA")]
    barnes_hut: Option<f32>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let provider: Arc<dyn GraphDataProvider> = match &args.file {
        Some(path) => {
            info!("reading graph data from {}", path.display());
            Arc::new(FileProvider::new(path.clone()))
        }
        None => {
            let provider = HttpProvider::new(&args.url);
            info!("using graph data endpoint {}", provider.endpoint());
            Arc::new(provider)
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    let barnes_hut = args.barnes_hut;
    eframe::run_native(
        "ontograph",
        options,
        Box::new(move |cc| Ok(Box::new(app::OntologyGraphApp::new(cc, provider, barnes_hut)))),
    )
}
