use anyhow::Context;
use bookstore_cli::{commands, CatalogClient, Command, Console};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Browse and edit the bookstore catalog
#[derive(Parser, Debug)]
#[command(name = "bookstore", version, about)]
struct Cli {
    /// Base URL of the catalog service
    #[arg(
        long,
        global = true,
        env = "BOOKSTORE_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Quiet unless RUST_LOG asks for more.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let client = CatalogClient::new(&cli.api_url).context("failed to build the catalog client")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let mut console = Console::stdio();
    let outcome = commands::run(cli.command, &client, &mut console, &cancel).await?;
    tracing::debug!(?outcome, "command finished");

    std::process::exit(outcome.exit_code());
}
