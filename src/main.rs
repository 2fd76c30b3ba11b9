use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portfolio_voice::{create_router, AppState, Config, Playground};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "portfolio-voice")]
#[command(about = "Session configuration playground for the portfolio voice agent")]
struct Cli {
    /// Config file, without extension
    #[arg(short, long, default_value = "config/portfolio-voice")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// List built-in and stored presets
    Presets,
    /// Print the share token of a preset
    Export { id: String },
    /// Add a preset from a share token to the stored presets and print it
    Import { token: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config))?;

    info!("Loaded config: {}", cfg.service.name);

    let mut playground = Playground::new(cfg.limits.clone(), cfg.storage.open())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            match cfg.agent.portfolio_dataset() {
                Some(dataset) if dataset.exists() => {
                    info!("Portfolio dataset: {}", dataset.path().display())
                }
                Some(dataset) => warn!(
                    "Portfolio dataset not found at {}; the agent will have nothing to ground on",
                    dataset.path().display()
                ),
                None => warn!("No portfolio dataset configured"),
            }

            let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
            let app = create_router(AppState::new(playground));

            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("HTTP server listening on {}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            info!("HTTP server shut down");
        }
        Command::Presets => {
            let state = playground.state();
            for preset in state.presets().iter() {
                let marker = if state.selected_preset_id() == Some(preset.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {:<36} {:<24} {:?}",
                    marker, preset.id, preset.name, preset.origin
                );
            }
        }
        Command::Export { id } => {
            println!("{}", playground.export_preset(&id)?);
        }
        Command::Import { token } => {
            let preset = playground.import_preset(&token)?;
            println!("{}", serde_json::to_string_pretty(&preset)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
    }
}
