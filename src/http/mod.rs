//! The per-connection tarpit.
//!
//! Each accepted connection is held for the configured delay while its input
//! is drained, then answered with a minimal response and closed.
//!
//! # Architecture
//!
//! - **`buffer`**: Capacity-bounded input store that keeps draining after it fills
//! - **`reader`**: One readability wait plus one receive, bounded by the deadline
//! - **`peer`**: Optional reverse lookup of the peer address
//! - **`sniffer`**: Detects an HTTP/1.0 or HTTP/1.1 request line in the input
//! - **`response`**: The 503 fragments and the plain greeting
//! - **`writer`**: Writes a response fragment to the client
//! - **`connection`**: The state machine tying the above together
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Drain input until the deadline
//!        └──────┬──────┘
//!               ├─ EOF / error ───────────────────────┐
//!               │ Deadline reached                    │
//!               ▼                                     │
//!        ┌──────────────────┐                         │
//!        │ RespondingHeader │ ← HTTP only: 503 + type │
//!        └──────┬───────────┘                         │
//!               ▼                                     │
//!        ┌──────────────────┐                         │
//!        │    Draining      │ ← Absorb late input ────┤ EOF
//!        └──────┬───────────┘                         │
//!               ▼                                     │
//!        ┌──────────────────┐                         │
//!        │ RespondingFinal  │ ← trailer or greeting   │
//!        └──────┬───────────┘                         │
//!               ▼                                     ▼
//!        ┌──────────────────────────────────────────────┐
//!        │                   Closed                     │
//!        └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tarpit::config::TarpitConfig;
//! use tarpit::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let settings = TarpitConfig { delay_secs: 5, ..Default::default() }.settings();
//!
//!     loop {
//!         let (socket, peer) = listener.accept().await?;
//!         let settings = settings.clone();
//!         tokio::spawn(async move {
//!             Connection::new(socket, peer, &settings).run().await;
//!         });
//!     }
//! }
//! ```

pub mod buffer;
pub mod connection;
pub mod peer;
pub mod reader;
pub mod response;
pub mod sniffer;
pub mod writer;
