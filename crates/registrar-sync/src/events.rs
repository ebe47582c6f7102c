//! Scope-keyed event bus
//!
//! Views subscribe with a [`ScopeFilter`] and receive a [`SyncEvent`] each
//! time a matching scope is committed to the registry or fails to refresh.

use registrar_model::{ErrorReport, RequestType};
use std::fmt;
use tokio::sync::broadcast;

/// Unit of refresh: one or more backend fetches feeding one registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefreshScope {
    DashboardCounts,
    RecentPending,
    PendingList(RequestType),
    TicketList,
    TicketDetail(u64),
    DomainList,
    DomainDetail(u64),
    ClientList,
    ClientDetail(u64),
    InvoiceList,
    ClientPendingCounts,
}

impl RefreshScope {
    /// Detail scopes are only refreshed while a view has them mounted
    #[inline]
    #[must_use]
    pub fn is_detail(&self) -> bool {
        matches!(
            self,
            Self::TicketDetail(_) | Self::DomainDetail(_) | Self::ClientDetail(_)
        )
    }

    /// Whether the scope concerns support tickets
    #[must_use]
    pub fn is_ticket_scope(&self) -> bool {
        matches!(
            self,
            Self::TicketList | Self::TicketDetail(_) | Self::PendingList(RequestType::SupportTicket)
        )
    }

    /// Scope owning the registry slots this scope writes
    ///
    /// The pending ticket list is derived from the full ticket fetch, so both
    /// scopes share one snapshot and one generation counter.
    #[inline]
    #[must_use]
    pub fn snapshot_key(self) -> Self {
        match self {
            Self::PendingList(RequestType::SupportTicket) => Self::TicketList,
            other => other,
        }
    }

    /// The other scope written by the same snapshot, if any
    #[must_use]
    pub fn shares_snapshot_with(self) -> Option<Self> {
        match self {
            Self::TicketList => Some(Self::PendingList(RequestType::SupportTicket)),
            Self::PendingList(RequestType::SupportTicket) => Some(Self::TicketList),
            _ => None,
        }
    }
}

impl fmt::Display for RefreshScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DashboardCounts => f.write_str("dashboard-counts"),
            Self::RecentPending => f.write_str("recent-pending"),
            Self::PendingList(t) => write!(f, "pending-list:{t}"),
            Self::TicketList => f.write_str("ticket-list"),
            Self::TicketDetail(id) => write!(f, "ticket-detail:{id}"),
            Self::DomainList => f.write_str("domain-list"),
            Self::DomainDetail(id) => write!(f, "domain-detail:{id}"),
            Self::ClientList => f.write_str("client-list"),
            Self::ClientDetail(id) => write!(f, "client-detail:{id}"),
            Self::InvoiceList => f.write_str("invoice-list"),
            Self::ClientPendingCounts => f.write_str("client-pending-counts"),
        }
    }
}

/// Published after each refresh attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// New snapshot committed for `scope`
    Refreshed { scope: RefreshScope, generation: u64 },
    /// Fetch failed; the registry still holds the previous snapshot
    Failed {
        scope: RefreshScope,
        error: ErrorReport,
    },
}

impl SyncEvent {
    /// Scope the event is about
    #[inline]
    #[must_use]
    pub fn scope(&self) -> RefreshScope {
        match self {
            Self::Refreshed { scope, .. } | Self::Failed { scope, .. } => *scope,
        }
    }
}

/// Which events a subscriber receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    All,
    Exact(RefreshScope),
    AnyOf(Vec<RefreshScope>),
    /// Ticket list, ticket details and the pending ticket list
    Tickets,
    /// Every pending list regardless of type
    PendingLists,
}

impl ScopeFilter {
    /// Check a scope against the filter
    #[must_use]
    pub fn matches(&self, scope: &RefreshScope) -> bool {
        match self {
            Self::All => true,
            Self::Exact(wanted) => wanted == scope,
            Self::AnyOf(wanted) => wanted.contains(scope),
            Self::Tickets => scope.is_ticket_scope(),
            Self::PendingLists => matches!(scope, RefreshScope::PendingList(_)),
        }
    }
}

/// Broadcast bus shared by the orchestrator and its subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Create a bus retaining up to `capacity` undelivered events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to every subscriber; returns how many received it
    pub fn publish(&self, event: SyncEvent) -> usize {
        // no receivers is not an error: nothing is mounted yet
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events matching `filter`
    #[must_use]
    pub fn subscribe(&self, filter: ScopeFilter) -> Subscription {
        Subscription {
            filter,
            receiver: self.sender.subscribe(),
        }
    }

    /// Current subscriber count
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Filtered receiving end of the bus
#[derive(Debug)]
pub struct Subscription {
    filter: ScopeFilter,
    receiver: broadcast::Receiver<SyncEvent>,
}

impl Subscription {
    /// Next matching event; `None` once the bus is gone
    ///
    /// A subscriber that falls behind skips the missed events; the next
    /// delivered event still reflects the latest registry state.
    pub async fn recv(&mut self) -> Option<SyncEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event.scope()) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event already queued, without waiting
    pub fn try_recv(&mut self) -> Option<SyncEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event.scope()) => return Some(event),
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }

    /// Drain every matching event currently queued
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters() {
        let pending = RefreshScope::PendingList(RequestType::SupportTicket);
        assert!(ScopeFilter::Tickets.matches(&pending));
        assert!(ScopeFilter::Tickets.matches(&RefreshScope::TicketDetail(3)));
        assert!(!ScopeFilter::Tickets.matches(&RefreshScope::InvoiceList));
        assert!(ScopeFilter::PendingLists.matches(&RefreshScope::PendingList(RequestType::Renew)));
        assert!(ScopeFilter::AnyOf(vec![RefreshScope::DomainList]).matches(&RefreshScope::DomainList));
        assert!(!ScopeFilter::Exact(RefreshScope::ClientDetail(1)).matches(&RefreshScope::ClientDetail(2)));
    }

    #[tokio::test]
    async fn subscriber_only_sees_matching_scopes() {
        let bus = EventBus::default();
        let mut invoices = bus.subscribe(ScopeFilter::Exact(RefreshScope::InvoiceList));

        bus.publish(SyncEvent::Refreshed { scope: RefreshScope::DomainList, generation: 1 });
        bus.publish(SyncEvent::Refreshed { scope: RefreshScope::InvoiceList, generation: 4 });

        let event = invoices.recv().await.unwrap();
        assert_eq!(event, SyncEvent::Refreshed { scope: RefreshScope::InvoiceList, generation: 4 });
        assert!(invoices.try_recv().is_none());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        assert_eq!(bus.publish(SyncEvent::Refreshed { scope: RefreshScope::TicketList, generation: 1 }), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn ticket_scopes_share_a_snapshot() {
        let pending = RefreshScope::PendingList(RequestType::SupportTicket);
        assert_eq!(pending.snapshot_key(), RefreshScope::TicketList);
        assert_eq!(RefreshScope::TicketList.snapshot_key(), RefreshScope::TicketList);
        assert_eq!(RefreshScope::TicketList.shares_snapshot_with(), Some(pending));
        let renew = RefreshScope::PendingList(RequestType::Renew);
        assert_eq!(renew.snapshot_key(), renew);
        assert_eq!(renew.shares_snapshot_with(), None);
    }

    #[test]
    fn scope_display() {
        assert_eq!(RefreshScope::PendingList(RequestType::DnsChange).to_string(), "pending-list:dns_change");
        assert_eq!(RefreshScope::ClientDetail(9).to_string(), "client-detail:9");
    }
}
