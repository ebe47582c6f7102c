//! Registrar Sync - keeping console views in step with the backend
//!
//! Runtime half of the registrar console:
//! - [`RequestRegistry`]: per-session snapshot store, sole source of view state
//! - [`SyncOrchestrator`]: scope refreshes with stale-response dropping and
//!   an [`EventBus`] keyed by [`RefreshScope`]
//! - [`ActionDispatcher`]: admin actions with double-submit protection and
//!   fan-out invalidation
//! - [`ClientRequests`]: client submissions with field-level error routing
//! - [`NotificationCenter`] and [`NotificationPoller`]
//! - [`views`]: pure view models over the registry
//! - [`HttpBackend`]: reqwest implementation of the backend traits
//!
//! # Example
//!
//! ```rust,no_run
//! use registrar_sync::{ConsoleConfig, RefreshScope, Session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConsoleConfig::new().with_base_url("https://registrar.example");
//! let session = Session::connect(config)?;
//! session.enter_section(RefreshScope::DashboardCounts).await?;
//! println!("{:?}", session.registry().summary());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod http;
pub mod notifications;
pub mod orchestrator;
pub mod registry;
pub mod session;
pub mod views;

pub use backend::{
    AdminBackend, ClientBackend, InternalTransferSubmission, NotificationBackend, SessionBackend,
};
pub use client::{ClientRequests, ErrorSurface, FIELD_DOMAIN, FIELD_TARGET_CLIENT};
pub use config::{ConfigError, ConsoleConfig};
pub use dispatcher::{ActionDispatcher, DispatchError, DispatchOutcome, NoteForm};
pub use events::{EventBus, RefreshScope, ScopeFilter, Subscription, SyncEvent};
pub use http::HttpBackend;
pub use notifications::{NotificationCenter, NotificationPoller, NotificationState};
pub use orchestrator::{resolve_scopes, RefreshError, RefreshOutcome, SyncOrchestrator};
pub use registry::RequestRegistry;
pub use session::Session;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a console session
    pub use crate::{
        ActionDispatcher, DispatchError, RefreshScope, RequestRegistry, ScopeFilter, Session,
        SyncEvent, SyncOrchestrator,
    };
    pub use registrar_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
