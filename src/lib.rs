//! Tarpit - a deliberately slow TCP/HTTP responder
//!
//! Holds every accepted connection open for a fixed delay, drains whatever
//! the client sends, then answers minimally and closes.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod server;
