use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span};

use crate::config::{Config, ConnectionSettings, ServerConfig};
use crate::error::ServerError;
use crate::http::connection::{Connection, ConnectionSummary};

/// Creates the listening socket: address reuse on, configured backlog.
pub fn bind(cfg: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = cfg.listen_addr();
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(ServerError::Socket)?;

    socket.set_reuseaddr(true).map_err(ServerError::Socket)?;
    socket
        .bind(addr)
        .map_err(|source| ServerError::Bind { addr, source })?;
    socket.listen(cfg.backlog).map_err(ServerError::Listen)
}

pub async fn run(cfg: &Config) -> Result<(), ServerError> {
    let listener = bind(&cfg.server)?;
    serve(listener, cfg).await
}

/// Accept loop. Returns only when accepting fails.
pub async fn serve(listener: TcpListener, cfg: &Config) -> Result<(), ServerError> {
    let span = info_span!("tarpit", pid = std::process::id());
    accept_loop(listener, cfg).instrument(span).await
}

async fn accept_loop(listener: TcpListener, cfg: &Config) -> Result<(), ServerError> {
    let local = listener.local_addr().map_err(ServerError::Socket)?;
    let settings = cfg.tarpit.settings();
    info!(
        single_client = cfg.server.single_client,
        delay_secs = cfg.tarpit.delay_secs,
        "Listening on {}",
        local
    );

    if cfg.server.single_client {
        serve_one_at_a_time(listener, settings).await
    } else {
        serve_concurrently(listener, settings).await
    }
}

/// Handles each connection to completion before accepting the next. The
/// listen backlog holds whoever is waiting.
async fn serve_one_at_a_time(
    listener: TcpListener,
    settings: ConnectionSettings,
) -> Result<(), ServerError> {
    let mut next_id: u64 = 0;
    loop {
        let (socket, peer) = listener.accept().await.map_err(ServerError::Accept)?;
        next_id += 1;
        handle(socket, peer, next_id, settings.clone()).await;
    }
}

/// One task per connection. Finished tasks are reaped as they complete.
async fn serve_concurrently(
    listener: TcpListener,
    settings: ConnectionSettings,
) -> Result<(), ServerError> {
    let mut next_id: u64 = 0;
    let mut handlers = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = accepted.map_err(ServerError::Accept)?;
                next_id += 1;
                handlers.spawn(handle(socket, peer, next_id, settings.clone()));
            }

            Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                match joined {
                    Ok((id, summary)) => info!(
                        handler = id,
                        peer = %summary.peer,
                        host = summary.host.as_deref().unwrap_or("-"),
                        reason = ?summary.reason,
                        response = ?summary.response,
                        "Reaped handler"
                    ),
                    Err(e) => error!(error = %e, "Connection handler panicked"),
                }
            }
        }
    }
}

/// Runs one connection inside its own span and reports how it ended.
pub async fn handle(
    socket: TcpStream,
    peer: SocketAddr,
    id: u64,
    settings: ConnectionSettings,
) -> (u64, ConnectionSummary) {
    let span = info_span!(
        "conn",
        pid = std::process::id(),
        id,
        peer = %peer,
        host = tracing::field::Empty
    );
    let summary = Connection::new(socket, peer, &settings)
        .run()
        .instrument(span)
        .await;
    (id, summary)
}
