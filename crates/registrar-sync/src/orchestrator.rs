//! Sync Orchestrator
//!
//! Refetches registry slots from the backend and announces commits on the
//! event bus. Each scope carries a generation counter:
//! - every `refresh(scope)` takes the next generation before fetching
//! - a response is committed only if its generation is still the latest
//! - superseded responses are dropped and logged, never written
//!
//! Detail scopes (ticket, domain, client) are refreshed by invalidation
//! only while some view has them mounted.

use crate::backend::{AdminBackend, ClientBackend};
use crate::events::{EventBus, RefreshScope, ScopeFilter, Subscription, SyncEvent};
use crate::registry::RequestRegistry;
use dashmap::DashMap;
use futures::future::join_all;
use registrar_model::{
    ApiError, Client, ClientDetail, ClientPendingCounts, DashboardSummary, Domain, DomainDetail,
    Invalidation, Invoice, ModelError, Request, RequestType,
};
use std::sync::Arc;

/// Refresh failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RefreshError {
    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Backend returned a snapshot violating a lifecycle invariant
    #[error("rejected snapshot: {0}")]
    Invalid(#[from] ModelError),

    /// No backend for this scope is configured in the session
    #[error("no backend configured for scope {0}")]
    NoBackend(RefreshScope),
}

/// Result of a refresh that reached the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot written at this generation
    Committed(u64),
    /// A newer refresh of the same scope was issued meanwhile
    Superseded { generation: u64, latest: u64 },
}

impl RefreshOutcome {
    /// Whether the snapshot reached the registry
    #[inline]
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

enum Snapshot {
    Summary(DashboardSummary),
    Recent(Vec<Request>),
    Pending(RequestType, Vec<Request>),
    Tickets(Vec<Request>),
    TicketDetail(Request),
    Domains(Vec<Domain>),
    DomainDetail(u64, DomainDetail),
    Clients(Vec<Client>),
    ClientDetail(u64, ClientDetail),
    Invoices(Vec<Invoice>),
    ClientCounts(ClientPendingCounts),
}

/// Keeps the registry in step with the backend
pub struct SyncOrchestrator {
    registry: Arc<RequestRegistry>,
    admin: Option<Arc<dyn AdminBackend>>,
    client: Option<Arc<dyn ClientBackend>>,
    bus: EventBus,
    generations: DashMap<RefreshScope, u64>,
    mounted: DashMap<RefreshScope, usize>,
    overview_limit: usize,
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("admin", &self.admin.is_some())
            .field("client", &self.client.is_some())
            .field("mounted", &self.mounted.len())
            .field("overview_limit", &self.overview_limit)
            .finish_non_exhaustive()
    }
}

impl SyncOrchestrator {
    /// Create orchestrator over a registry with no backends yet
    #[must_use]
    pub fn new(registry: Arc<RequestRegistry>) -> Self {
        Self {
            registry,
            admin: None,
            client: None,
            bus: EventBus::default(),
            generations: DashMap::new(),
            mounted: DashMap::new(),
            overview_limit: 5,
        }
    }

    /// With admin backend
    #[must_use]
    pub fn with_admin_backend(mut self, backend: Arc<dyn AdminBackend>) -> Self {
        self.admin = Some(backend);
        self
    }

    /// With client backend
    #[must_use]
    pub fn with_client_backend(mut self, backend: Arc<dyn ClientBackend>) -> Self {
        self.client = Some(backend);
        self
    }

    /// With recent overview size
    #[inline]
    #[must_use]
    pub fn with_overview_limit(mut self, limit: usize) -> Self {
        self.overview_limit = limit;
        self
    }

    /// With a caller-provided bus
    #[inline]
    #[must_use]
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    /// Registry this orchestrator writes
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    /// Event bus
    #[inline]
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribe to refreshes matching `filter`
    #[must_use]
    pub fn subscribe(&self, filter: ScopeFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// Latest generation issued for a scope (0 if never refreshed)
    ///
    /// Scopes sharing a snapshot share the counter.
    #[must_use]
    pub fn generation(&self, scope: RefreshScope) -> u64 {
        self.generations.get(&scope.snapshot_key()).map_or(0, |g| *g)
    }

    // Mounting

    /// A view showing `scope` became visible
    pub fn mount(&self, scope: RefreshScope) {
        *self.mounted.entry(scope).or_insert(0) += 1;
        tracing::debug!(%scope, "scope mounted");
    }

    /// A view showing `scope` went away
    pub fn unmount(&self, scope: RefreshScope) {
        let gone = match self.mounted.get_mut(&scope) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            None => false,
        };
        if gone {
            self.mounted.remove(&scope);
            if let RefreshScope::TicketDetail(_) = scope {
                self.registry.clear_ticket_detail();
            }
            tracing::debug!(%scope, "scope unmounted");
        }
    }

    /// Whether a view currently shows `scope`
    #[must_use]
    pub fn is_mounted(&self, scope: RefreshScope) -> bool {
        self.mounted.contains_key(&scope)
    }

    // Refresh

    /// Fetch `scope`, commit it unless superseded, and publish the result
    ///
    /// # Errors
    /// [`RefreshError::Api`] when the backend call fails and
    /// [`RefreshError::Invalid`] when the snapshot breaks a lifecycle
    /// invariant. In both cases the registry keeps the previous snapshot and
    /// a [`SyncEvent::Failed`] is published.
    pub async fn refresh(&self, scope: RefreshScope) -> Result<RefreshOutcome, RefreshError> {
        let generation = {
            let mut entry = self.generations.entry(scope.snapshot_key()).or_insert(0);
            *entry += 1;
            *entry
        };
        tracing::debug!(%scope, generation, "refresh issued");

        let result = match self.fetch(scope).await {
            Ok(snapshot) => self.commit(scope, generation, snapshot),
            Err(err) => Err(err),
        };

        match &result {
            Ok(RefreshOutcome::Committed(_)) => {
                self.bus.publish(SyncEvent::Refreshed { scope, generation });
                if let Some(shared) = scope.shares_snapshot_with() {
                    self.bus.publish(SyncEvent::Refreshed {
                        scope: shared,
                        generation,
                    });
                }
            }
            Ok(RefreshOutcome::Superseded { latest, .. }) => {
                tracing::debug!(%scope, generation, latest, "stale response dropped");
            }
            Err(err) => {
                tracing::warn!(%scope, error = %err, "refresh failed");
                let report = match err {
                    RefreshError::Api(api) => api.report(),
                    other => ApiError::http(0, other.to_string()).report(),
                };
                self.bus.publish(SyncEvent::Failed {
                    scope,
                    error: report,
                });
            }
        }
        result
    }

    /// Refresh several scopes concurrently, skipping unmounted detail scopes
    ///
    /// Failures are published per scope and do not stop the others.
    pub async fn refresh_invalidated(
        &self,
        scopes: &[RefreshScope],
    ) -> Vec<(RefreshScope, Result<RefreshOutcome, RefreshError>)> {
        let mut targets: Vec<RefreshScope> = Vec::with_capacity(scopes.len());
        for scope in scopes.iter().map(|s| s.snapshot_key()) {
            if (!scope.is_detail() || self.is_mounted(scope)) && !targets.contains(&scope) {
                targets.push(scope);
            }
        }

        let results = join_all(targets.iter().map(|scope| self.refresh(*scope))).await;
        targets.into_iter().zip(results).collect()
    }

    fn admin(&self, scope: RefreshScope) -> Result<&Arc<dyn AdminBackend>, RefreshError> {
        self.admin.as_ref().ok_or(RefreshError::NoBackend(scope))
    }

    async fn fetch(&self, scope: RefreshScope) -> Result<Snapshot, RefreshError> {
        let snapshot = match scope {
            RefreshScope::DashboardCounts => {
                Snapshot::Summary(self.admin(scope)?.dashboard_summary().await?)
            }
            RefreshScope::RecentPending => {
                Snapshot::Recent(self.admin(scope)?.recent_pending().await?)
            }
            RefreshScope::PendingList(RequestType::SupportTicket) | RefreshScope::TicketList => {
                Snapshot::Tickets(self.admin(scope)?.tickets().await?)
            }
            RefreshScope::PendingList(request_type) => Snapshot::Pending(
                request_type,
                self.admin(scope)?.pending_requests(request_type).await?,
            ),
            RefreshScope::TicketDetail(id) => {
                Snapshot::TicketDetail(self.admin(scope)?.ticket_detail(id).await?)
            }
            RefreshScope::DomainList => Snapshot::Domains(self.admin(scope)?.domains().await?),
            RefreshScope::DomainDetail(id) => {
                Snapshot::DomainDetail(id, self.admin(scope)?.domain_detail(id).await?)
            }
            RefreshScope::ClientList => Snapshot::Clients(self.admin(scope)?.clients().await?),
            RefreshScope::ClientDetail(id) => {
                Snapshot::ClientDetail(id, self.admin(scope)?.client_detail(id).await?)
            }
            RefreshScope::InvoiceList => Snapshot::Invoices(self.admin(scope)?.invoices().await?),
            RefreshScope::ClientPendingCounts => {
                let client = self.client.as_ref().ok_or(RefreshError::NoBackend(scope))?;
                Snapshot::ClientCounts(client.pending_counts().await?)
            }
        };
        Ok(snapshot)
    }

    fn commit(
        &self,
        scope: RefreshScope,
        generation: u64,
        snapshot: Snapshot,
    ) -> Result<RefreshOutcome, RefreshError> {
        // Holding the shard guard blocks a newer refresh of this scope from
        // being issued until the write below is done.
        let guard = self.generations.get(&scope.snapshot_key());
        let latest = guard.as_deref().copied().unwrap_or(0);
        if latest != generation {
            return Ok(RefreshOutcome::Superseded { generation, latest });
        }

        let registry = &self.registry;
        match snapshot {
            Snapshot::Summary(summary) => registry.set_summary(summary),
            Snapshot::Recent(mut items) => {
                items.truncate(self.overview_limit);
                registry.set_recent(items)?;
            }
            Snapshot::Pending(request_type, items) => registry.set(request_type, items)?,
            Snapshot::Tickets(tickets) => {
                let descriptor = registry.table().descriptor(RequestType::SupportTicket);
                let open: Vec<Request> = tickets
                    .iter()
                    .filter(|t| descriptor.is_pending(t.status))
                    .cloned()
                    .collect();
                registry.set_tickets(tickets)?;
                registry.set(RequestType::SupportTicket, open)?;
            }
            Snapshot::TicketDetail(ticket) => registry.set_ticket_detail(ticket)?,
            Snapshot::Domains(domains) => registry.set_domains(domains),
            Snapshot::DomainDetail(id, detail) => registry.set_domain_detail(id, detail),
            Snapshot::Clients(clients) => registry.set_clients(clients),
            Snapshot::ClientDetail(id, detail) => registry.set_client_detail(id, detail),
            Snapshot::Invoices(invoices) => registry.set_invoices(invoices),
            Snapshot::ClientCounts(counts) => registry.set_client_counts(counts),
        }
        drop(guard);
        Ok(RefreshOutcome::Committed(generation))
    }
}

/// Map table invalidations for `request` onto concrete scopes
///
/// Order is preserved and duplicates removed, counting scopes that share a
/// snapshot as one. A transfer target that the backend has not resolved yet
/// yields no scope.
#[must_use]
pub fn resolve_scopes(request: &Request, invalidations: &[Invalidation]) -> Vec<RefreshScope> {
    let mut scopes = Vec::with_capacity(invalidations.len());
    for invalidation in invalidations {
        let scope = match invalidation {
            Invalidation::OwnPendingList => Some(RefreshScope::PendingList(request.request_type)),
            Invalidation::DashboardCounts => Some(RefreshScope::DashboardCounts),
            Invalidation::RecentPending => Some(RefreshScope::RecentPending),
            Invalidation::DomainList => Some(RefreshScope::DomainList),
            Invalidation::ClientList => Some(RefreshScope::ClientList),
            Invalidation::InvoiceList => Some(RefreshScope::InvoiceList),
            Invalidation::OwnerClientDetail => Some(RefreshScope::ClientDetail(request.owner_id)),
            Invalidation::TargetClientDetail => {
                request.transfer_target_id().map(RefreshScope::ClientDetail)
            }
            Invalidation::TicketList => Some(RefreshScope::TicketList),
            Invalidation::TicketDetail => Some(RefreshScope::TicketDetail(request.id)),
        };
        if let Some(scope) = scope
            .map(RefreshScope::snapshot_key)
            .filter(|s| !scopes.contains(s))
        {
            scopes.push(scope);
        }
    }
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use registrar_model::{RequestStatus, TransitionTable};

    #[test]
    fn resolves_internal_transfer_fan_out() {
        let table = TransitionTable::standard();
        let request = Request::new(5, RequestType::InternalTransferRequest, RequestStatus::Approved, 2)
            .with_requested("target_client_id", 11);
        let scopes = resolve_scopes(&request, &table.invalidations(request.request_type, request.status));
        assert_eq!(
            scopes,
            vec![
                RefreshScope::PendingList(RequestType::InternalTransferRequest),
                RefreshScope::DashboardCounts,
                RefreshScope::RecentPending,
                RefreshScope::DomainList,
                RefreshScope::ClientList,
                RefreshScope::ClientDetail(2),
                RefreshScope::ClientDetail(11),
            ]
        );
    }

    #[test]
    fn unresolved_target_is_skipped_and_duplicates_collapse() {
        let request = Request::new(5, RequestType::InternalTransferRequest, RequestStatus::Approved, 2);
        let scopes = resolve_scopes(
            &request,
            &[Invalidation::TargetClientDetail, Invalidation::DashboardCounts, Invalidation::DashboardCounts],
        );
        assert_eq!(scopes, vec![RefreshScope::DashboardCounts]);
    }

    #[test]
    fn ticket_invalidations_collapse_to_one_fetch() {
        let table = TransitionTable::standard();
        let ticket = Request::new(8, RequestType::SupportTicket, RequestStatus::InProgress, 2);
        let scopes = resolve_scopes(&ticket, &table.invalidations(ticket.request_type, ticket.status));
        assert!(scopes.contains(&RefreshScope::TicketList));
        assert!(!scopes.contains(&RefreshScope::PendingList(RequestType::SupportTicket)));
        assert_eq!(scopes.iter().filter(|s| **s == RefreshScope::TicketList).count(), 1);
    }

    #[test]
    fn mount_counts_nest() {
        let orchestrator = SyncOrchestrator::new(Arc::new(RequestRegistry::default()));
        let scope = RefreshScope::ClientDetail(4);
        orchestrator.mount(scope);
        orchestrator.mount(scope);
        orchestrator.unmount(scope);
        assert!(orchestrator.is_mounted(scope));
        orchestrator.unmount(scope);
        assert!(!orchestrator.is_mounted(scope));
        orchestrator.unmount(scope);
        assert!(!orchestrator.is_mounted(scope));
    }

    #[tokio::test]
    async fn missing_backend_is_reported() {
        let orchestrator = SyncOrchestrator::new(Arc::new(RequestRegistry::default()));
        let mut events = orchestrator.subscribe(ScopeFilter::All);
        let err = orchestrator.refresh(RefreshScope::InvoiceList).await.unwrap_err();
        assert_eq!(err, RefreshError::NoBackend(RefreshScope::InvoiceList));
        assert!(matches!(events.try_recv(), Some(SyncEvent::Failed { .. })));
    }
}
