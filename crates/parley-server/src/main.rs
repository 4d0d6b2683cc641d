use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;

use parley_api::{AppState, ChatService};
use parley_store::Bootstrap;

/// Parley chat server
#[derive(Parser, Debug)]
#[command(name = "parley-server")]
#[command(version)]
struct Args {
    /// Address (host:port) to listen on
    #[arg(short, long, env = "PARLEY_ADDRESS", default_value = "localhost:12000")]
    address: String,

    /// Path to the users bootstrap file
    #[arg(long, env = "PARLEY_USERS_PATH", default_value = "storage/server/users.json")]
    users: PathBuf,

    /// Path to the rooms bootstrap file
    #[arg(long, env = "PARLEY_ROOMS_PATH", default_value = "storage/server/rooms.json")]
    rooms: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley_server=info,parley_api=info,parley_store=info,tower_http=debug".into()),
        )
        .init();

    let args = Args::parse();

    let bootstrap = Bootstrap::load(&args.users, &args.rooms)?;
    let state: AppState = Arc::new(ChatService::from_bootstrap(bootstrap));

    let app = parley_api::router(state).layer(TraceLayer::new_for_http());

    info!("Starting server on {}", args.address);
    let listener = tokio::net::TcpListener::bind(&args.address).await?;
    info!("Ready to serve on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
