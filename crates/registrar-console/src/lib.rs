//! Registrar Console - command line front end
//!
//! - [`cli`]: clap command tree and parsed [`cli::Invocation`]
//! - [`run`]: executes an [`cli::Action`] against a [`registrar_sync::Session`]
//! - [`output`]: plain-text rendering of the view models
//! - [`init_tracing`]: stderr logging, optionally as JSON

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod output;
pub mod run;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use cli::{command, parse, Action, Invocation};
pub use run::{run, watch_notifications};

/// Install the global subscriber
///
/// `RUST_LOG` selects the filter, default `info`. Logs go to stderr so
/// command output on stdout stays clean.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("tracing already initialised: {err}");
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
