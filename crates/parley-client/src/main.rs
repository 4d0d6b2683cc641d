use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use parley_client::console::{self, Console, StdoutConsole};
use parley_client::{ChatTransport, ClientSession, HttpTransport, SyncConfig};
use parley_types::api::UserCred;

/// Parley chat client
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version)]
struct Args {
    /// Server address (host:port or URL)
    #[arg(short, long, env = "PARLEY_ADDRESS", default_value = "localhost:12000")]
    address: String,

    /// Username of your account
    #[arg(short, long, env = "PARLEY_USERNAME")]
    username: Option<String>,

    /// Password of your account
    #[arg(short, long, env = "PARLEY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Milliseconds between polls for new messages
    #[arg(long, default_value = "1000")]
    poll_interval_ms: u64,

    /// Deadline for each request, in milliseconds
    #[arg(long, default_value = "1000")]
    request_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they never interleave with the chat on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley_client=warn".into()),
        )
        .init();

    let args = Args::parse();
    let console: Arc<dyn Console> = Arc::new(StdoutConsole);
    let mut input = console::spawn_stdin_reader();

    let (username, password) = match (args.username, args.password) {
        (Some(u), Some(p)) => (u, p),
        (u, p) => {
            console.rule();
            let username = match u {
                Some(u) => u,
                None => console::request_input(console.as_ref(), &mut input, "Username")
                    .await
                    .context("no username given")?,
            };
            let password = match p {
                Some(p) => p,
                None => console::request_input(console.as_ref(), &mut input, "Password")
                    .await
                    .context("no password given")?,
            };
            (username, password)
        }
    };
    console.rule();

    let cred = UserCred::from_plaintext(username, &password);
    let transport: Arc<dyn ChatTransport> = Arc::new(HttpTransport::new(
        &args.address,
        Duration::from_millis(args.request_timeout_ms),
    )?);
    let config = SyncConfig {
        poll_interval: Duration::from_millis(args.poll_interval_ms),
    };

    let session = ClientSession::login(transport, cred, console.clone(), config).await?;
    session.run(&mut input).await?;

    Ok(())
}
