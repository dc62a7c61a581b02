use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use eframe::egui;

mod animation;
mod app;
mod config;
mod format;
mod math;
mod render;
mod scenario;


use app::TransformApp;
use config::VizConfig;


#[derive(Debug, Parser)]
#[command(about = "Interactive 2D linear transformation visualizer", long_about = None)]
struct Cli {
    /// Path to RON configuration file to use
    #[arg(short, long)]
    config: Option<PathBuf>,
}


fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = VizConfig::load(cli.config.as_deref())?;
    log::debug!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.canvas_width + 360.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Linear Transformations - Composition & Determinants",
        options,
        Box::new(move |_cc| Box::new(TransformApp::new(&config))),
    )
    .map_err(|err| anyhow::anyhow!("Could not start the window: {err}"))
}
