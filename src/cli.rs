use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::MAX_DELAY_SECS;

/// Accepts connections and answers them only after DELAY seconds.
#[derive(Parser, Debug, Clone)]
#[command(name = "tarpit", version, about)]
pub struct Cli {
    /// TCP port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Seconds to hold each connection before responding (at most one week)
    #[arg(value_parser = clap::value_parser!(u64).range(1..=MAX_DELAY_SECS))]
    pub delay: u64,

    /// Serve one client at a time
    #[arg(short = '1', long = "single-client")]
    pub single_client: bool,

    /// YAML file with tuning values (bind address, backlog, buffer size)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind instead of 0.0.0.0
    #[arg(long = "bind")]
    pub bind: Option<IpAddr>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default `RUST_LOG` directive for the selected verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "tarpit=info",
            1 => "tarpit=debug",
            _ => "tarpit=trace",
        }
    }
}
