use std::net::{Shutdown, SocketAddr};
use std::time::Duration;
use std::io::ErrorKind;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout};
use tracing::{Span, debug, error, info, warn};

use crate::config::ConnectionSettings;
use crate::error::ConnectionError;
use crate::http::buffer::InputBuffer;
use crate::http::peer::resolve_name;
use crate::http::reader::{ReadOutcome, read_before};
use crate::http::response::{
    EMPTY_BODY_TRAILER, GREETING, ResponseKind, service_unavailable_head,
};
use crate::http::sniffer::RequestSniffer;
use crate::http::writer::ResponseWriter;

/// One held connection. Owned by exactly one handler from accept to close.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    host: Option<String>,
    resolve_peer_names: bool,
    buffer: InputBuffer,
    sniffer: RequestSniffer,
    eof: bool,
    deadline: Instant,
    drain_interval: Duration,
    bytes_received: usize,
    response: ResponseKind,
    reason: CloseReason,
    state: ConnectionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Reading,
    RespondingHeader,
    Draining,
    RespondingFinal,
    Closed,
}

/// Why a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The delay ran out and the response phase finished.
    Completed,
    /// The peer sent EOF first.
    PeerClosed,
    /// A read, wait or write failed.
    Failed,
}

/// What happened on a connection, reported once it is closed.
#[derive(Debug, Clone)]
pub struct ConnectionSummary {
    pub peer: SocketAddr,
    /// Reverse-resolved name of the peer, when one was found.
    pub host: Option<String>,
    pub bytes_received: usize,
    pub request_line: Option<String>,
    pub response: ResponseKind,
    pub reason: CloseReason,
}

impl Connection {
    /// Starts the clock: the deadline is fixed here and never moves.
    pub fn new(stream: TcpStream, peer: SocketAddr, settings: &ConnectionSettings) -> Self {
        Self {
            stream,
            peer,
            host: None,
            resolve_peer_names: settings.resolve_peer_names,
            buffer: InputBuffer::with_capacity(settings.buffer_capacity),
            sniffer: RequestSniffer::new(),
            eof: false,
            deadline: deadline_after(settings.delay),
            drain_interval: settings.drain_interval,
            bytes_received: 0,
            response: ResponseKind::None,
            reason: CloseReason::Completed,
            state: ConnectionState::Reading,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Runs the connection to completion. Errors are logged here and never
    /// returned; the socket is closed on every path.
    pub async fn run(mut self) -> ConnectionSummary {
        if self.resolve_peer_names {
            self.host = resolve_name(self.peer.ip()).await;
            if let Some(host) = &self.host {
                Span::current().record("host", host.as_str());
            }
        }
        info!("CONNECTED");

        loop {
            match self.state {
                ConnectionState::Reading => {
                    self.state = match self.read_until_deadline().await {
                        Ok(()) if self.eof => ConnectionState::Closed,
                        Ok(()) if self.sniffer.is_http() => ConnectionState::RespondingHeader,
                        Ok(()) => ConnectionState::Draining,
                        Err(e) => {
                            error!(error = %e, "Connection failed");
                            self.reason = CloseReason::Failed;
                            ConnectionState::Closed
                        }
                    };
                }

                ConnectionState::RespondingHeader => {
                    let head = service_unavailable_head();
                    match ResponseWriter::new(&head).write_to_stream(&mut self.stream).await {
                        Ok(()) => {
                            info!("Sent HTTP 503");
                            self.response = ResponseKind::HeaderOnly;
                            self.state = ConnectionState::Draining;
                        }
                        Err(e) => {
                            // The peer is gone; nothing more will be sent.
                            error!(error = %e, "Failed to send HTTP 503");
                            self.eof = true;
                            self.reason = CloseReason::Failed;
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Draining => {
                    self.drain().await;
                    self.state = if self.eof {
                        ConnectionState::Closed
                    } else {
                        ConnectionState::RespondingFinal
                    };
                }

                ConnectionState::RespondingFinal => {
                    self.respond_final().await;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => break,
            }
        }

        let summary = ConnectionSummary {
            peer: self.peer,
            host: self.host.clone(),
            bytes_received: self.bytes_received,
            request_line: self.sniffer.request_line().map(str::to_owned),
            response: self.response,
            reason: self.reason,
        };
        self.close();
        summary
    }

    /// Absorbs input until the deadline passes or the peer sends EOF.
    async fn read_until_deadline(&mut self) -> Result<(), ConnectionError> {
        loop {
            match read_before(&self.stream, &mut self.buffer, self.deadline).await {
                ReadOutcome::Data { len, retained } => {
                    self.bytes_received += len;
                    info!(bytes = len, "Received {} bytes", len);

                    if retained {
                        if let Some(line) = self.sniffer.inspect(self.buffer.as_slice()) {
                            info!(request_line = %line, "HTTP request detected");
                        }
                    }
                }
                ReadOutcome::PeerClosed => {
                    info!("EOF");
                    self.eof = true;
                    self.reason = CloseReason::PeerClosed;
                    return Ok(());
                }
                ReadOutcome::Retry => continue,
                ReadOutcome::Timeout => return Ok(()),
                ReadOutcome::Fatal(e) => return Err(e),
            }
        }
    }

    /// Keeps consuming input until the deadline, waking at least every
    /// `drain_interval`. Stops early on EOF or a read error.
    async fn drain(&mut self) {
        loop {
            let remaining = self.deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            info!("{} seconds remaining", remaining.as_secs());
            match timeout(remaining.min(self.drain_interval), self.stream.readable()).await {
                Err(_) => continue,
                Ok(Err(e)) => {
                    debug!(error = %e, "Drain wait failed");
                    break;
                }
                Ok(Ok(())) => {}
            }

            match self.stream.try_read(self.buffer.discard_mut()) {
                Ok(0) => {
                    info!("EOF");
                    self.eof = true;
                    self.reason = CloseReason::PeerClosed;
                    break;
                }
                Ok(n) => {
                    self.bytes_received += n;
                    debug!(bytes = n, "Drained");
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {}
                Err(e) => {
                    debug!(error = %e, "Drain read failed");
                    break;
                }
            }
        }
    }

    async fn respond_final(&mut self) {
        let (payload, kind) = if self.sniffer.is_http() {
            (EMPTY_BODY_TRAILER, ResponseKind::ServiceUnavailable)
        } else {
            (GREETING, ResponseKind::Greeting)
        };

        match ResponseWriter::new(payload).write_to_stream(&mut self.stream).await {
            Ok(()) => {
                debug!(response = ?kind, "Response sent");
                self.response = kind;
            }
            Err(e) => {
                warn!(error = %e, "Failed to send response");
                self.reason = CloseReason::Failed;
            }
        }
    }

    /// Shuts down both directions and drops the socket. Consumes the
    /// connection, so it happens once.
    fn close(self) {
        match self.stream.into_std() {
            Ok(stream) => {
                if let Err(e) = stream.shutdown(Shutdown::Both) {
                    debug!(error = %e, "shutdown failed");
                }
            }
            Err(e) => debug!(error = %e, "Failed to detach socket"),
        }
        info!("CLOSED");
    }
}

/// `now + delay`, or a point far enough out to never fire if that overflows.
fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}
