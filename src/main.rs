use clap::Parser;
use tracing_subscriber::EnvFilter;

use tarpit::cli::Cli;
use tarpit::config::Config;
use tarpit::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_directive().into()),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::from_cli(&cli)?;

    tokio::select! {
        res = server::run(&cfg) => {
            if let Err(e) = res {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
