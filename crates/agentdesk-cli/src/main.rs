mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use agentdesk_service::HttpService;
use config::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    debug!("using backend {}", cli.api_url);
    let api = HttpService::new(&cli.api_url);

    match cli.command {
        Command::Reference => commands::reference(api).await,
        Command::Upload { paths } => commands::upload(api, &paths).await,
        Command::Save(args) => commands::save(api, &args).await,
        Command::TestCall { agent, target } => commands::test_call(api, &agent, &target).await,
    }
}
