//! Deadline-bounded reads.
//!
//! Each call waits for readability no longer than the time left until the
//! connection's deadline, then makes a single non-blocking receive.

use std::io::ErrorKind;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};

use crate::error::ConnectionError;
use crate::http::buffer::InputBuffer;

/// Result of one read attempt.
#[derive(Debug)]
pub enum ReadOutcome {
    /// `len` bytes arrived. `retained` is false when they went to scratch space.
    Data { len: usize, retained: bool },
    /// The peer sent EOF.
    PeerClosed,
    /// Readiness was spurious or the receive was interrupted.
    Retry,
    /// The deadline has passed.
    Timeout,
    Fatal(ConnectionError),
}

/// Waits until `stream` is readable or `deadline` passes, then reads once.
pub async fn read_before(
    stream: &TcpStream,
    buffer: &mut InputBuffer,
    deadline: Instant,
) -> ReadOutcome {
    loop {
        if Instant::now() >= deadline {
            return ReadOutcome::Timeout;
        }

        match timeout_at(deadline, stream.readable()).await {
            Err(_) => return ReadOutcome::Timeout,
            // Retried with whatever time is left.
            Ok(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
            Ok(Err(e)) => return ReadOutcome::Fatal(ConnectionError::Wait(e)),
            Ok(Ok(())) => break,
        }
    }

    let (dst, retained) = buffer.spare_mut();
    match stream.try_read(dst) {
        Ok(0) => ReadOutcome::PeerClosed,
        Ok(len) => {
            if retained {
                buffer.commit(len);
            }
            ReadOutcome::Data { len, retained }
        }
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
            ReadOutcome::Retry
        }
        Err(e) => ReadOutcome::Fatal(ConnectionError::Receive(e)),
    }
}
