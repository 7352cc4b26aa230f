//! Connection dispatch.

pub mod listener;

pub use listener::{bind, run, serve};
