//! Error types
//!
//! Configuration and server errors are fatal to the process. Connection
//! errors stay inside the handler that produced them.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors raised while building the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Setup and accept failures of the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("socket: {0}")]
    Socket(#[source] io::Error),

    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("listen: {0}")]
    Listen(#[source] io::Error),

    #[error("accept: {0}")]
    Accept(#[source] io::Error),
}

/// Failures on a single connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("select: {0}")]
    Wait(#[source] io::Error),

    #[error("read: {0}")]
    Receive(#[source] io::Error),

    #[error("write: {0}")]
    Write(#[source] io::Error),
}
