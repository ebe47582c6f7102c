//! Per-login session
//!
//! Owns one registry and everything wired to it. Nothing here is global:
//! a new login builds a new session, logout clears it.

use crate::backend::{AdminBackend, ClientBackend, NotificationBackend, SessionBackend};
use crate::client::ClientRequests;
use crate::config::ConsoleConfig;
use crate::dispatcher::ActionDispatcher;
use crate::events::RefreshScope;
use crate::http::HttpBackend;
use crate::notifications::{NotificationCenter, NotificationPoller};
use crate::orchestrator::{RefreshError, RefreshOutcome, SyncOrchestrator};
use crate::registry::RequestRegistry;
use registrar_model::{ApiError, TransitionTable};
use std::sync::Arc;
use std::time::Duration;

/// Everything a signed-in console needs
pub struct Session {
    config: ConsoleConfig,
    orchestrator: Arc<SyncOrchestrator>,
    dispatcher: ActionDispatcher,
    client: ClientRequests,
    poller: NotificationPoller,
    auth: Arc<dyn SessionBackend>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url)
            .field("orchestrator", &self.orchestrator)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session over HTTP
    ///
    /// # Errors
    /// See [`HttpBackend::new`].
    pub fn connect(config: ConsoleConfig) -> Result<Self, ApiError> {
        let backend = Arc::new(HttpBackend::new(config.clone())?);
        Ok(Self::with_backend(backend, config))
    }

    /// Session over any backend implementing every role
    #[must_use]
    pub fn with_backend<B>(backend: Arc<B>, config: ConsoleConfig) -> Self
    where
        B: AdminBackend + ClientBackend + NotificationBackend + SessionBackend + 'static,
    {
        let registry = Arc::new(RequestRegistry::new(TransitionTable::standard()));
        let orchestrator = Arc::new(
            SyncOrchestrator::new(registry)
                .with_admin_backend(backend.clone())
                .with_client_backend(backend.clone())
                .with_overview_limit(config.overview_limit),
        );
        let dispatcher = ActionDispatcher::new(backend.clone(), Arc::clone(&orchestrator));
        let client = ClientRequests::new(backend.clone(), Arc::clone(&orchestrator));
        let poller = NotificationPoller::new(Arc::new(NotificationCenter::new(backend.clone())));

        Self {
            config,
            orchestrator,
            dispatcher,
            client,
            poller,
            auth: backend,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<RequestRegistry> {
        self.orchestrator.registry()
    }

    #[inline]
    #[must_use]
    pub fn orchestrator(&self) -> &Arc<SyncOrchestrator> {
        &self.orchestrator
    }

    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    #[inline]
    #[must_use]
    pub fn client_requests(&self) -> &ClientRequests {
        &self.client
    }

    #[inline]
    #[must_use]
    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        self.poller.center()
    }

    #[inline]
    #[must_use]
    pub fn poller(&self) -> &NotificationPoller {
        &self.poller
    }

    /// A section became visible: mount its scope and load it
    ///
    /// # Errors
    /// See [`SyncOrchestrator::refresh`].
    pub async fn enter_section(&self, scope: RefreshScope) -> Result<RefreshOutcome, RefreshError> {
        self.orchestrator.mount(scope);
        self.orchestrator.refresh(scope).await
    }

    /// A section was hidden
    pub fn leave_section(&self, scope: RefreshScope) {
        self.orchestrator.unmount(scope);
    }

    /// Start notification polling at the configured interval
    pub fn start_polling(&self) {
        self.start_polling_every(self.config.poll_interval());
    }

    pub fn start_polling_every(&self, interval: Duration) {
        self.poller.start(interval);
    }

    /// End the session
    ///
    /// Polling stops and the registry is cleared even when the backend
    /// call fails.
    ///
    /// # Errors
    /// The backend's logout error, after local teardown.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.auth.logout().await;
        self.poller.stop().await;
        self.registry().clear();
        match &result {
            Ok(()) => tracing::info!("logged out"),
            Err(err) => tracing::warn!(error = %err, "logout request failed; local session cleared"),
        }
        result
    }
}
