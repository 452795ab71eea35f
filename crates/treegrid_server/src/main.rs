//! Headless API server entrypoint.

use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use treegrid_core::{ImportPayload, DEFAULT_PORT};
use treegrid_server::{config::Config, serve_router, AppState, Engine};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    load: Option<PathBuf>,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--load" => {
                let Some(path) = iter.next() else {
                    anyhow::bail!("--load requires a snapshot file path");
                };
                flags.load = Some(PathBuf::from(path));
            }
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

/// Build the startup engine, seeded from a snapshot file when one is given.
///
/// Seeding does not emit an event; the event history starts empty.
fn initial_engine(load: Option<&PathBuf>) -> anyhow::Result<Engine> {
    let Some(path) = load else {
        return Ok(Engine::new());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("Failed to read {}: {}", path.display(), err))?;
    let payload = ImportPayload::from_json(&text)?;
    let engine = Engine::with_state(payload.data, payload.config.unwrap_or_default())?;
    tracing::info!(
        records = engine.records().len(),
        columns = engine.columns().len(),
        "Loaded snapshot from {}",
        path.display()
    );
    Ok(engine)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treegrid=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let engine = initial_engine(cli_flags.load.as_ref())?;
    let state = AppState::new(config.clone(), engine);

    let allow_public = treegrid_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = treegrid_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("TreeGrid running at http://{}", actual_addr);

    let events = state.events.clone();
    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!(last_seq = events.last_seq(), "Server stopped");

    Ok(())
}

fn print_help() {
    println!("TreeGrid Server\n");
    println!("Usage: treegrid-server [OPTIONS]\n");
    println!("Options:");
    println!("  --load <FILE>     Seed records and columns from a snapshot file");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  MAX_REQUEST_SIZE  Maximum request body in bytes (default: 16MB)");
    println!("  EVENT_LOG_LIMIT   Events kept for GET /api/events (default: 10000)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
