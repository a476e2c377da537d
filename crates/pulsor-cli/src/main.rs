//! # Pulsor CLI
//!
//! Loads HTML fragments and templates through the Pulsor registry.
//!
//! ## Usage
//!
//! ```bash
//! # Load fragments from ./fragments
//! pulsor header sidebar
//!
//! # Load templates with a custom config
//! pulsor --template --config /path/to/pulsor.toml card
//!
//! # Run with environment variables
//! PULSOR_FRAGMENT_ROOT=public PULSOR_METRICS=true pulsor header
//! ```

mod app;
mod config;
mod metrics;

use anyhow::Result;
use clap::Parser;
use pulsor_core::TracingRecorder;
use pulsor_fragment::{FETCH_FRAGMENT, FETCH_TEMPLATE};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pulsor", version)]
#[command(about = "Load HTML fragments through Pulsor pulsers", long_about = None)]
struct Cli {
    /// Fragment or template names to load
    names: Vec<String>,

    /// Load templates instead of fragments
    #[arg(short, long)]
    template: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the registered pulsers and exit
    #[arg(short, long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulsor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => config::Config::from_file(path)?,
        None => config::Config::load()?,
    };

    let recorder = Arc::new(TracingRecorder::with_prefix(config.logging.prefix.clone()));
    recorder.set_levels(config.logging.levels);
    if let Some(debug) = config.logging.levels.debug {
        recorder.set_debug(debug);
    }

    if config.metrics.enabled {
        metrics::start_metrics_server(config.metrics.port)?;
        metrics::init_metrics();
    }

    let app = app::App::build(&config, recorder)?;

    if cli.list {
        let infos: Vec<_> = app
            .registry
            .list()
            .iter()
            .filter_map(|alias| app.registry.info(alias))
            .collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let alias = if cli.template { FETCH_TEMPLATE } else { FETCH_FRAGMENT };
    for name in &cli.names {
        let markup = app.load(alias, name).await?;
        println!("{}", serde_json::to_string_pretty(&json!({ "name": name, "markup": markup }))?);
    }

    for button in app.sidebar_buttons() {
        println!("{button}");
    }

    Ok(())
}
