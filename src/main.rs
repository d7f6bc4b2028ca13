//! signloop - Main entry point
//!
//! Wires the playback controller, preloader, update monitor, heartbeat and
//! status API together, then waits for either a shutdown signal or a
//! reload request. A reload exits with a dedicated code so the supervisor
//! (e.g. systemd with `Restart=always`) performs the cold restart.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signloop::config::{Config, ConfigOverrides};
use signloop::playback::{
    FilePrefetcher, PlaybackController, Playlist, Preloader, ProcessPlayer,
};
use signloop::update::{heartbeat, HttpVersionSource, ProcessReload, UpdateMonitor};
use signloop::{api, SharedState};

/// Exit code signalling "restart me" to the supervisor
const RELOAD_EXIT_CODE: u8 = 75;

/// Command-line arguments for signloop
#[derive(Parser, Debug)]
#[command(name = "signloop")]
#[command(about = "Unattended looping media player for kiosk displays")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "signloop.toml", env = "SIGNLOOP_CONFIG")]
    config: PathBuf,

    /// Status HTTP server port (overrides the config file)
    #[arg(short, long, env = "SIGNLOOP_PORT")]
    port: Option<u16>,

    /// Version endpoint to poll for new deployments (overrides the config file)
    #[arg(long, env = "SIGNLOOP_VERSION_URL")]
    version_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signloop=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::load(
        &args.config,
        ConfigOverrides {
            port: args.port,
            version_url: args.version_url,
        },
    )
    .await
    .context("Failed to load configuration")?;

    info!(
        "Starting signloop: {} playlist item(s), player '{}'",
        config.playlist.len(),
        config.player_command
    );

    let playlist =
        Playlist::from_strings(config.playlist.clone()).context("Invalid playlist")?;
    let shared = SharedState::new(playlist.len());
    let (reload, mut reload_rx) = ProcessReload::new();

    // Playback controller with its player capability and preloader
    let (player_events_tx, player_events_rx) = mpsc::unbounded_channel();
    let player = ProcessPlayer::new(
        config.player_command.clone(),
        config.player_args.clone(),
        player_events_tx,
    );
    let controller = PlaybackController::new(
        playlist,
        player,
        Preloader::new(FilePrefetcher),
        config.max_retries,
        config.retry_delay(),
        shared.clone(),
    );
    tokio::spawn(controller.run(player_events_rx));

    // Update monitor, if a version endpoint is configured
    if let Some(url) = config.version_url.clone() {
        let source = HttpVersionSource::new(url).context("Invalid version endpoint")?;
        let monitor =
            UpdateMonitor::new(source, reload.clone(), config.poll_interval(), shared.clone());
        tokio::spawn(monitor.run());
    } else {
        info!("update checks disabled (no version_url configured)");
    }

    // Heartbeat failsafe
    tokio::spawn(heartbeat::run(config.heartbeat_interval(), reload.clone()));

    // Status HTTP server
    let app = api::create_router(api::AppState {
        shared,
        port: config.port,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind status server address")?;
    info!("status server listening on {}", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("status server error: {}", e);
        }
    });

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received, exiting");
            Ok(ExitCode::SUCCESS)
        }
        Some(reason) = reload_rx.recv() => {
            info!("restarting: {}", reason);
            Ok(ExitCode::from(RELOAD_EXIT_CODE))
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
