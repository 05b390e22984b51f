//! layerview command line.
//!
//! Usage:
//!   layerview serve --port 8080
//!   layerview watch --base-url http://localhost:8080 --layers layers.json
//!
//! `serve` runs the demo backend. `watch` follows a backend and prints the
//! pipeline every time it changes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layerview_devserver::{build_router, render_summary, Fleet};
use layerview_store::EntityStore;
use layerview_sync::{spawn_controller, ApiConfig, ControllerConfig, HttpSource};
use layerview_topology::build_topology;
use layerview_types::LayerTable;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "layerview")]
#[command(about = "Live view of a GitOps fleet's delivery pipeline")]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the built-in demo fleet
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Seconds between live updates
        #[arg(long, default_value = "5")]
        tick: u64,
    },
    /// Follow a backend and print the pipeline on every change
    Watch {
        /// Backend root URL
        #[arg(long, default_value = "http://localhost:8080")]
        base_url: String,

        /// Bearer token for the backend
        #[arg(long)]
        token: Option<String>,

        /// JSON file with the layer table (built-in pipeline if omitted)
        #[arg(long)]
        layers: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Command::Serve { port, tick } => serve(port, Duration::from_secs(tick)).await,
        Command::Watch {
            base_url,
            token,
            layers,
        } => watch(base_url, token, layers).await,
    }
}

async fn serve(port: u16, tick: Duration) -> Result<()> {
    let fleet = Arc::new(Fleet::demo(tick));
    let app_count = fleet.apps.len();
    let app = build_router(fleet);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    println!("\n========================================");
    println!("  layerview demo backend");
    println!("========================================");
    println!("  Port:          {port}");
    println!("  Applications:  {app_count}");
    println!("  Update every:  {}s", tick.as_secs());
    println!("\n  Watch it with:");
    println!("  layerview watch --base-url http://localhost:{port}");
    println!("========================================\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server failed")?;
    info!("demo backend stopped");
    Ok(())
}

async fn watch(base_url: String, token: Option<String>, layers: Option<PathBuf>) -> Result<()> {
    let layers = match layers {
        Some(path) => LayerTable::from_json_file(&path)
            .with_context(|| format!("Failed to load layer table from {}", path.display()))?,
        None => LayerTable::default(),
    };
    info!(layers = layers.len(), %base_url, "watching backend");

    let config = ApiConfig {
        base_url,
        token,
        ..Default::default()
    };
    let source = HttpSource::new(config).context("Failed to create HTTP client")?;
    let handle = spawn_controller(Arc::new(source), EntityStore::new(), ControllerConfig::default());
    let mut view = handle.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = view.borrow_and_update().clone();
                let topology = build_topology(&layers, &current.snapshot);
                print!("{}", render_summary(&current, &topology, chrono::Utc::now()));
                println!();
            }
        }
    }

    handle.stop().await.context("Controller did not shut down cleanly")?;
    info!("watch stopped");
    Ok(())
}
