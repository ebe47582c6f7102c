//! Request Registry
//!
//! In-memory cache of server-owned entities for one session. Every slot is a
//! snapshot in server response order; writes replace whole snapshots (last
//! write wins) except for the targeted `upsert`/`remove` used after a
//! confirmed status change.

use parking_lot::RwLock;
use registrar_model::{
    Client, ClientDetail, ClientPendingCounts, DashboardSummary, Domain, DomainDetail, Invoice,
    ModelError, Request, RequestKey, RequestStatus, RequestType, TicketReply, TransitionTable,
};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Slots {
    pending: HashMap<RequestType, Vec<Request>>,
    tickets: Vec<Request>,
    ticket_detail: Option<Request>,
    recent: Vec<Request>,
    invoices: Vec<Invoice>,
    domains: Vec<Domain>,
    clients: Vec<Client>,
    client_details: HashMap<u64, ClientDetail>,
    domain_details: HashMap<u64, DomainDetail>,
    summary: Option<DashboardSummary>,
    client_counts: Option<ClientPendingCounts>,
}

/// Session-scoped cache of requests and related entities
///
/// Shared as `Arc<RequestRegistry>` between the orchestrator, the
/// dispatcher and views. Reads return owned snapshots so no lock is held
/// while rendering.
#[derive(Debug)]
pub struct RequestRegistry {
    table: TransitionTable,
    slots: RwLock<Slots>,
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new(TransitionTable::standard())
    }
}

impl RequestRegistry {
    /// Create an empty registry validating against `table`
    #[must_use]
    pub fn new(table: TransitionTable) -> Self {
        Self {
            table,
            slots: RwLock::new(Slots::default()),
        }
    }

    /// Transition table used for status validation
    #[inline]
    #[must_use]
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    fn check(&self, items: &[Request]) -> Result<(), ModelError> {
        items
            .iter()
            .try_for_each(|item| self.table.validate_status(item.request_type, item.status))
    }

    // Pending lists

    /// Pending list of a type, in server order
    #[must_use]
    pub fn get(&self, request_type: RequestType) -> Vec<Request> {
        self.slots
            .read()
            .pending
            .get(&request_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a pending list for `request_type` has been loaded
    #[must_use]
    pub fn is_loaded(&self, request_type: RequestType) -> bool {
        self.slots.read().pending.contains_key(&request_type)
    }

    /// Replace the pending list of a type
    ///
    /// # Errors
    /// [`ModelError::StatusNotAllowed`] when any item carries a status outside
    /// its type's lifecycle. The previous snapshot is kept in that case.
    pub fn set(&self, request_type: RequestType, items: Vec<Request>) -> Result<(), ModelError> {
        self.check(&items)?;
        if let Some(stray) = items.iter().find(|r| r.request_type != request_type) {
            return Err(ModelError::TypeMismatch {
                expected: request_type,
                found: stray.request_type,
            });
        }
        self.slots.write().pending.insert(request_type, items);
        Ok(())
    }

    /// Look up a request by type and id
    ///
    /// Searches the pending list first, then the ticket slots, then
    /// historical request lists held by detail views.
    #[must_use]
    pub fn find_by_id(&self, request_type: RequestType, id: u64) -> Option<Request> {
        let key = RequestKey::new(request_type, id);
        let slots = self.slots.read();
        let matches = |r: &&Request| r.key() == key;

        slots
            .pending
            .get(&request_type)
            .and_then(|list| list.iter().find(matches))
            .or_else(|| slots.ticket_detail.as_ref().filter(|t| t.key() == key))
            .or_else(|| slots.tickets.iter().find(matches))
            .or_else(|| slots.recent.iter().find(matches))
            .or_else(|| {
                slots
                    .client_details
                    .values()
                    .flat_map(|d| d.requests.iter().chain(d.tickets.iter()))
                    .find(matches)
            })
            .or_else(|| {
                slots
                    .domain_details
                    .values()
                    .flat_map(|d| d.requests.iter().chain(d.tickets.iter()))
                    .find(matches)
            })
            .cloned()
    }

    /// Replace a request in its pending list, appending when absent
    ///
    /// Historical copies in ticket and detail slots are refreshed too.
    ///
    /// # Errors
    /// [`ModelError::StatusNotAllowed`] for a status outside the type's
    /// lifecycle; nothing is written.
    pub fn upsert(&self, request: Request) -> Result<(), ModelError> {
        self.check(std::slice::from_ref(&request))?;
        let mut slots = self.slots.write();
        let list = slots.pending.entry(request.request_type).or_default();
        match list.iter_mut().find(|r| r.key() == request.key()) {
            Some(existing) => *existing = request.clone(),
            None => list.push(request.clone()),
        }
        record_history(&mut slots, &request);
        Ok(())
    }

    /// Drop a request from its pending list and the recent overview
    ///
    /// Returns the removed entry. Historical copies stay where they are.
    pub fn remove(&self, request_type: RequestType, id: u64) -> Option<Request> {
        let key = RequestKey::new(request_type, id);
        let mut slots = self.slots.write();
        slots.recent.retain(|r| r.key() != key);
        let list = slots.pending.get_mut(&request_type)?;
        let index = list.iter().position(|r| r.key() == key)?;
        Some(list.remove(index))
    }

    /// Refresh historical copies of `request` without touching pending lists
    pub fn record_history(&self, request: &Request) {
        record_history(&mut self.slots.write(), request);
    }

    // Tickets

    /// Every support ticket
    #[must_use]
    pub fn tickets(&self) -> Vec<Request> {
        self.slots.read().tickets.clone()
    }

    /// Replace the ticket list
    ///
    /// # Errors
    /// As [`RequestRegistry::set`].
    pub fn set_tickets(&self, tickets: Vec<Request>) -> Result<(), ModelError> {
        self.check(&tickets)?;
        self.slots.write().tickets = tickets;
        Ok(())
    }

    /// Ticket shown in the detail view
    #[must_use]
    pub fn ticket_detail(&self) -> Option<Request> {
        self.slots.read().ticket_detail.clone()
    }

    /// Replace the ticket detail
    ///
    /// # Errors
    /// As [`RequestRegistry::set`].
    pub fn set_ticket_detail(&self, ticket: Request) -> Result<(), ModelError> {
        self.check(std::slice::from_ref(&ticket))?;
        self.slots.write().ticket_detail = Some(ticket);
        Ok(())
    }

    /// Apply a posted reply to the cached ticket copies
    pub fn apply_ticket_reply(&self, reply: TicketReply, ticket_status: RequestStatus) {
        let key = RequestKey::new(RequestType::SupportTicket, reply.ticket_id);
        let mut slots = self.slots.write();
        if let Some(detail) = slots.ticket_detail.as_mut().filter(|t| t.key() == key) {
            detail.status = ticket_status;
            if !detail.replies.iter().any(|r| r.id == reply.id) {
                detail.replies.push(reply);
            }
        }
        for ticket in slots.tickets.iter_mut().filter(|t| t.key() == key) {
            ticket.status = ticket_status;
        }
    }

    /// Forget the ticket detail (view closed)
    pub fn clear_ticket_detail(&self) {
        self.slots.write().ticket_detail = None;
    }

    // Overview

    /// Recent pending overview
    #[must_use]
    pub fn recent(&self) -> Vec<Request> {
        self.slots.read().recent.clone()
    }

    /// Replace the recent pending overview
    ///
    /// # Errors
    /// As [`RequestRegistry::set`].
    pub fn set_recent(&self, items: Vec<Request>) -> Result<(), ModelError> {
        self.check(&items)?;
        self.slots.write().recent = items;
        Ok(())
    }

    /// Admin dashboard counters
    #[must_use]
    pub fn summary(&self) -> Option<DashboardSummary> {
        self.slots.read().summary.clone()
    }

    /// Replace the admin dashboard counters
    pub fn set_summary(&self, summary: DashboardSummary) {
        self.slots.write().summary = Some(summary);
    }

    /// Client dashboard counters
    #[must_use]
    pub fn client_counts(&self) -> Option<ClientPendingCounts> {
        self.slots.read().client_counts.clone()
    }

    /// Replace the client dashboard counters
    pub fn set_client_counts(&self, counts: ClientPendingCounts) {
        self.slots.write().client_counts = Some(counts);
    }

    // Invoices, domains, clients

    #[must_use]
    pub fn invoices(&self) -> Vec<Invoice> {
        self.slots.read().invoices.clone()
    }

    pub fn set_invoices(&self, invoices: Vec<Invoice>) {
        self.slots.write().invoices = invoices;
    }

    /// Invoice by id
    #[must_use]
    pub fn find_invoice(&self, id: u64) -> Option<Invoice> {
        self.slots.read().invoices.iter().find(|i| i.id == id).cloned()
    }

    /// Replace one invoice in place, appending when absent
    pub fn upsert_invoice(&self, invoice: Invoice) {
        let mut slots = self.slots.write();
        match slots.invoices.iter_mut().find(|i| i.id == invoice.id) {
            Some(existing) => *existing = invoice,
            None => slots.invoices.push(invoice),
        }
    }

    #[must_use]
    pub fn domains(&self) -> Vec<Domain> {
        self.slots.read().domains.clone()
    }

    pub fn set_domains(&self, domains: Vec<Domain>) {
        self.slots.write().domains = domains;
    }

    #[must_use]
    pub fn clients(&self) -> Vec<Client> {
        self.slots.read().clients.clone()
    }

    pub fn set_clients(&self, clients: Vec<Client>) {
        self.slots.write().clients = clients;
    }

    /// Cached client detail
    #[must_use]
    pub fn client_detail(&self, client_id: u64) -> Option<ClientDetail> {
        self.slots.read().client_details.get(&client_id).cloned()
    }

    pub fn set_client_detail(&self, client_id: u64, detail: ClientDetail) {
        self.slots.write().client_details.insert(client_id, detail);
    }

    /// Cached domain detail
    #[must_use]
    pub fn domain_detail(&self, domain_id: u64) -> Option<DomainDetail> {
        self.slots.read().domain_details.get(&domain_id).cloned()
    }

    pub fn set_domain_detail(&self, domain_id: u64, detail: DomainDetail) {
        self.slots.write().domain_details.insert(domain_id, detail);
    }

    /// Drop everything (logout)
    pub fn clear(&self) {
        *self.slots.write() = Slots::default();
        tracing::debug!("request registry cleared");
    }
}

fn record_history(slots: &mut Slots, request: &Request) {
    let key = request.key();
    let replace = |list: &mut Vec<Request>| {
        for slot in list.iter_mut().filter(|r| r.key() == key) {
            *slot = request.clone();
        }
    };

    if request.request_type == RequestType::SupportTicket {
        replace(&mut slots.tickets);
        if let Some(detail) = slots.ticket_detail.as_mut().filter(|t| t.key() == key) {
            // the status response carries no replies
            let replies = std::mem::take(&mut detail.replies);
            *detail = request.clone();
            if detail.replies.is_empty() {
                detail.replies = replies;
            }
        }
    }
    for detail in slots.client_details.values_mut() {
        replace(&mut detail.requests);
        replace(&mut detail.tickets);
    }
    for detail in slots.domain_details.values_mut() {
        replace(&mut detail.requests);
        replace(&mut detail.tickets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use registrar_model::Client;

    fn register(id: u64, status: RequestStatus) -> Request {
        Request::new(id, RequestType::Register, status, 7).with_domain(format!("d{id}.com"))
    }

    #[test]
    fn set_keeps_server_order_and_last_write_wins() {
        let registry = RequestRegistry::default();
        registry
            .set(RequestType::Register, vec![register(3, RequestStatus::Pending), register(1, RequestStatus::Pending)])
            .unwrap();
        let ids: Vec<_> = registry.get(RequestType::Register).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);

        registry.set(RequestType::Register, vec![register(9, RequestStatus::Pending)]).unwrap();
        assert_eq!(registry.get(RequestType::Register).len(), 1);
        assert!(registry.get(RequestType::Renew).is_empty());
    }

    #[test]
    fn set_rejects_foreign_status_and_keeps_previous() {
        let registry = RequestRegistry::default();
        registry.set(RequestType::Register, vec![register(1, RequestStatus::Pending)]).unwrap();
        let bad = vec![register(2, RequestStatus::EppCodeSent)];
        assert!(registry.set(RequestType::Register, bad).is_err());
        assert_eq!(registry.get(RequestType::Register)[0].id, 1);
    }

    #[test]
    fn set_rejects_items_of_another_type() {
        let registry = RequestRegistry::default();
        let renew = Request::new(4, RequestType::Renew, RequestStatus::Pending, 1);
        assert!(registry.set(RequestType::Register, vec![renew]).is_err());
        assert!(!registry.is_loaded(RequestType::Register));
    }

    #[test]
    fn ids_are_scoped_by_type() {
        let registry = RequestRegistry::default();
        registry.set(RequestType::Register, vec![register(5, RequestStatus::Pending)]).unwrap();
        assert!(registry.find_by_id(RequestType::Register, 5).is_some());
        assert!(registry.find_by_id(RequestType::Renew, 5).is_none());
    }

    #[test]
    fn upsert_replaces_in_place_and_remove_drops() {
        let registry = RequestRegistry::default();
        registry
            .set(RequestType::Register, vec![register(1, RequestStatus::Pending), register(2, RequestStatus::Pending)])
            .unwrap();
        let mut updated = register(1, RequestStatus::Pending);
        updated.admin_notes = Some("checked".into());
        registry.upsert(updated).unwrap();
        assert_eq!(registry.get(RequestType::Register)[0].admin_notes.as_deref(), Some("checked"));

        let removed = registry.remove(RequestType::Register, 1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(registry.remove(RequestType::Register, 1).is_none());
        assert_eq!(registry.get(RequestType::Register).len(), 1);
    }

    #[test]
    fn history_survives_pending_removal() {
        let registry = RequestRegistry::default();
        registry.set_client_detail(
            7,
            ClientDetail {
                profile: Client {
                    id: 7,
                    username: "acme".into(),
                    name: "Acme".into(),
                    email: None,
                    is_active: true,
                    domain_count: None,
                },
                domains: vec![],
                requests: vec![register(42, RequestStatus::PendingAdminApproval)],
                tickets: vec![],
            },
        );
        registry.set(RequestType::Register, vec![register(42, RequestStatus::PendingAdminApproval)]).unwrap();

        let approved = register(42, RequestStatus::Approved);
        registry.record_history(&approved);
        registry.remove(RequestType::Register, 42);

        assert!(registry.get(RequestType::Register).is_empty());
        let found = registry.find_by_id(RequestType::Register, 42).unwrap();
        assert_eq!(found.status, RequestStatus::Approved);
    }

    #[test]
    fn ticket_detail_keeps_replies_on_status_update() {
        let registry = RequestRegistry::default();
        let mut ticket = Request::new(3, RequestType::SupportTicket, RequestStatus::Open, 7);
        ticket.replies.push(TicketReply {
            id: 1,
            ticket_id: 3,
            user_id: Some(1),
            author_username: "admin".into(),
            author_role: "admin".into(),
            message: "hi".into(),
            timestamp: None,
        });
        registry.set_ticket_detail(ticket).unwrap();
        registry.record_history(&Request::new(3, RequestType::SupportTicket, RequestStatus::Closed, 7));
        let detail = registry.ticket_detail().unwrap();
        assert_eq!(detail.status, RequestStatus::Closed);
        assert_eq!(detail.replies.len(), 1);
    }

    #[test]
    fn clear_empties_every_slot() {
        let registry = RequestRegistry::default();
        registry.set(RequestType::Register, vec![register(1, RequestStatus::Pending)]).unwrap();
        registry.set_summary(DashboardSummary::default());
        registry.clear();
        assert!(!registry.is_loaded(RequestType::Register));
        assert!(registry.summary().is_none());
    }
}
