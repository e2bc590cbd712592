//! # parley-client
//!
//! Session runtime for the Parley chat client: long-lived session state
//! with explicit sign-in/sign-out, command functions the UI layer invokes,
//! and the feed loop that drives the conversation core from push
//! notifications (or a polling fallback).

pub mod commands;
pub mod config;
pub mod events;
pub mod feed;
pub mod state;

mod error;

pub use config::ClientConfig;
pub use error::ClientError;
pub use state::SessionState;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.  Call once at process start.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("parley_client=debug,parley_core=debug,parley_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
