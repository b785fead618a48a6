//! Core runtime for long-polling chat bots.
//!
//! This crate is transport-agnostic. The HTTP round trip lives behind the
//! [`gateway::Gateway`] port, implemented in adapter crates.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod domain;
pub mod envelope;
pub mod errors;
pub mod gateway;
pub mod handler;
pub mod keyboard;
pub mod logging;
pub mod offset;
pub mod registry;
pub mod update;

#[cfg(test)]
mod fake;

pub use context::Context;
pub use dispatch::PollingApp;
pub use errors::{Error, FailureKind, Result};
pub use handler::{handler_fn, recover_fn, ErrorHandler, UpdateHandler};
pub use update::{Update, UpdateKind};
