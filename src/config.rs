use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::ConfigError;

/// Longest delay accepted: one week. Keeps `now + delay` far from `Instant` overflow.
pub const MAX_DELAY_SECS: u64 = 7 * 24 * 60 * 60;

/// Process-wide configuration. Built once at startup and never mutated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tarpit: TarpitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub backlog: u32,
    pub single_client: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TarpitConfig {
    /// Seconds each connection is held before the response phase.
    pub delay_secs: u64,
    /// Bytes of client input kept for request sniffing.
    pub buffer_capacity: usize,
    /// Upper bound on a single sleep while draining.
    pub drain_interval_secs: u64,
    /// Look up a host name for each peer address.
    pub resolve_peer_names: bool,
}

/// Per-connection timing and sizing handed to each handler.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub delay: Duration,
    pub buffer_capacity: usize,
    pub drain_interval: Duration,
    pub resolve_peer_names: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
            backlog: 5,
            single_client: false,
        }
    }
}

impl Default for TarpitConfig {
    fn default() -> Self {
        Self {
            delay_secs: 0,
            buffer_capacity: 4096,
            drain_interval_secs: 10,
            resolve_peer_names: true,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl TarpitConfig {
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings::from(self)
    }
}

impl From<&TarpitConfig> for ConnectionSettings {
    fn from(cfg: &TarpitConfig) -> Self {
        Self {
            delay: Duration::from_secs(cfg.delay_secs),
            buffer_capacity: cfg.buffer_capacity,
            drain_interval: Duration::from_secs(cfg.drain_interval_secs),
            resolve_peer_names: cfg.resolve_peer_names,
        }
    }
}

impl Config {
    /// Reads a YAML config file. Sections and fields left out keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Builds the final configuration: file (if any), then command-line values.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut cfg = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        cfg.server.port = cli.port;
        cfg.tarpit.delay_secs = cli.delay;
        if cli.single_client {
            cfg.server.single_client = true;
        }
        if let Some(addr) = cli.bind {
            cfg.server.bind_addr = addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("port must be positive".into()));
        }
        if self.server.backlog == 0 {
            return Err(ConfigError::Invalid("backlog must be positive".into()));
        }
        if self.tarpit.delay_secs == 0 {
            return Err(ConfigError::Invalid("delay must be positive".into()));
        }
        if self.tarpit.delay_secs > MAX_DELAY_SECS {
            return Err(ConfigError::Invalid(format!(
                "delay must be at most {MAX_DELAY_SECS} seconds"
            )));
        }
        if self.tarpit.buffer_capacity == 0 {
            return Err(ConfigError::Invalid("buffer_capacity must be positive".into()));
        }
        if self.tarpit.drain_interval_secs == 0 || self.tarpit.drain_interval_secs > MAX_DELAY_SECS {
            return Err(ConfigError::Invalid(
                "drain_interval_secs must be between 1 and the maximum delay".into(),
            ));
        }
        Ok(())
    }
}
