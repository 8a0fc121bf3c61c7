use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod constants;
mod html_template;
mod map_view;
mod places;
mod server;
mod settings;

use catalog::Catalog;
use places::Gazetteer;
use server::{start_server, AppState};
use settings::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to sikkim.toml next to the executable)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the settings file
    #[arg(short, long)]
    port: Option<u16>,

    /// Monastery dataset to serve instead of the embedded one
    #[arg(short, long, value_name = "FILE")]
    dataset: Option<PathBuf>,
}

fn load_catalog(settings: &Settings) -> Result<Catalog> {
    match &settings.dataset {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("Failed to load dataset {}", path.display())),
        None => Catalog::embedded().context("Failed to load embedded dataset"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if cli.dataset.is_some() {
        settings.dataset = cli.dataset;
    }

    info!("Sikkim monastery map v{} starting", env!("CARGO_PKG_VERSION"));
    if settings.maps.api_key.is_none() {
        warn!("no maps API key configured; the browser map will fail to load");
    }

    let catalog = load_catalog(&settings)?;
    info!(locations = catalog.len(), "catalog loaded");

    let places = Gazetteer::embedded()?.with_catalog(&catalog);

    start_server(AppState::new(catalog, places, settings)).await
}
