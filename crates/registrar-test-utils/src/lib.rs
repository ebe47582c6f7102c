//! Testing utilities for the registrar console workspace
//!
//! [`ScriptedBackend`] is an in-memory stand-in for the REST backend. It
//! keeps enough state to behave like the real one (status changes move
//! items out of pending lists, counters follow the lists) and lets tests
//! inject failures and delays per endpoint.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use registrar_model::{
    ApiError, Client, ClientDetail, ClientPendingCounts, DashboardSummary, Domain, DomainDetail,
    Invoice, InvoiceStatus, MarkReadTarget, Notification, NotificationFeed, Request,
    RequestStatus, RequestType, StatusUpdate, TicketReply, TicketReplyOutcome, TransitionTable,
};
use registrar_sync::{
    AdminBackend, ClientBackend, ConsoleConfig, InternalTransferSubmission, NotificationBackend,
    Session, SessionBackend,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Backend endpoints, for failure and delay injection and call logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DashboardSummary,
    RecentPending,
    PendingRequests,
    Tickets,
    TicketDetail,
    UpdateStatus,
    ReplyToTicket,
    Domains,
    DomainDetail,
    ReassignDomain,
    Clients,
    ClientDetail,
    Invoices,
    MarkInvoicePaid,
    CancelInvoice,
    PendingCounts,
    ClientTickets,
    InternalTransfer,
    AutoRenewChange,
    LockChange,
    Notifications,
    MarkRead,
    Logout,
}

#[derive(Debug, Default)]
struct State {
    pending: HashMap<RequestType, Vec<Request>>,
    history: Vec<Request>,
    tickets: Vec<Request>,
    base_summary: DashboardSummary,
    domains: Vec<Domain>,
    clients: Vec<Client>,
    invoices: Vec<Invoice>,
    notifications: Vec<Notification>,
    next_id: u64,
}

/// In-memory backend implementing every backend role
pub struct ScriptedBackend {
    table: TransitionTable,
    client_user_id: u64,
    today: NaiveDate,
    state: Mutex<State>,
    failures: Mutex<HashMap<Endpoint, VecDeque<ApiError>>>,
    delays: Mutex<HashMap<Endpoint, VecDeque<Duration>>>,
    calls: Mutex<Vec<Endpoint>>,
    status_updates: Mutex<Vec<(RequestType, u64, StatusUpdate)>>,
    transfers: Mutex<Vec<InternalTransferSubmission>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: TransitionTable::standard(),
            client_user_id: 1,
            today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            status_updates: Mutex::new(Vec::new()),
            transfers: Mutex::new(Vec::new()),
        }
    }

    /// Id of the signed-in client for client endpoints
    #[must_use]
    pub fn with_client_user(mut self, user_id: u64) -> Self {
        self.client_user_id = user_id;
        self
    }

    /// Date used for payment dates
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Wrap in an `Arc` for handing to a session
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    // Seeding

    pub fn seed_request(&self, request: Request) {
        let mut state = self.state.lock();
        if request.request_type == RequestType::SupportTicket {
            state.tickets.push(request);
        } else {
            state.pending.entry(request.request_type).or_default().push(request);
        }
    }

    pub fn seed_summary(&self, summary: DashboardSummary) {
        self.state.lock().base_summary = summary;
    }

    pub fn seed_domain(&self, domain: Domain) {
        self.state.lock().domains.push(domain);
    }

    pub fn seed_client(&self, client: Client) {
        self.state.lock().clients.push(client);
    }

    pub fn seed_invoice(&self, invoice: Invoice) {
        self.state.lock().invoices.push(invoice);
    }

    pub fn seed_notification(&self, notification: Notification) {
        self.state.lock().notifications.push(notification);
    }

    /// Drop a pending item behind the console's back (another admin acted)
    pub fn resolve_elsewhere(&self, request_type: RequestType, id: u64) {
        if let Some(list) = self.state.lock().pending.get_mut(&request_type) {
            list.retain(|r| r.id != id);
        }
    }

    // Injection

    /// Make the next call to `endpoint` fail with `err`
    pub fn fail_next(&self, endpoint: Endpoint, err: ApiError) {
        self.failures.lock().entry(endpoint).or_default().push_back(err);
    }

    /// Make the next call to `endpoint` wait `delay` after capturing its
    /// response
    pub fn delay_next(&self, endpoint: Endpoint, delay: Duration) {
        self.delays.lock().entry(endpoint).or_default().push_back(delay);
    }

    // Inspection

    #[must_use]
    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().iter().filter(|e| **e == endpoint).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    #[must_use]
    pub fn status_updates(&self) -> Vec<(RequestType, u64, StatusUpdate)> {
        self.status_updates.lock().clone()
    }

    #[must_use]
    pub fn transfer_submissions(&self) -> Vec<InternalTransferSubmission> {
        self.transfers.lock().clone()
    }

    #[must_use]
    pub fn invoice(&self, id: u64) -> Option<Invoice> {
        self.state.lock().invoices.iter().find(|i| i.id == id).cloned()
    }

    /// Items the backend still considers pending
    #[must_use]
    pub fn pending_ids(&self, request_type: RequestType) -> Vec<u64> {
        self.state
            .lock()
            .pending
            .get(&request_type)
            .map(|list| list.iter().map(|r| r.id).collect())
            .unwrap_or_default()
    }

    // Plumbing

    /// Record the call, then fail if a failure is queued
    fn enter(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        self.calls.lock().push(endpoint);
        let queued = self
            .failures
            .lock()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        queued.map_or(Ok(()), Err)
    }

    async fn settle<T>(&self, endpoint: Endpoint, result: Result<T, ApiError>) -> Result<T, ApiError> {
        let delay = self
            .delays
            .lock()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn respond<T>(&self, endpoint: Endpoint, f: impl FnOnce(&mut State) -> Result<T, ApiError>) -> Result<T, ApiError> {
        let result = self.enter(endpoint).and_then(|()| f(&mut self.state.lock()));
        self.settle(endpoint, result).await
    }

    fn summary_of(&self, state: &State) -> DashboardSummary {
        let mut summary = state.base_summary.clone();
        for (request_type, list) in &state.pending {
            let descriptor = self.table.descriptor(*request_type);
            let count = Some(list.iter().filter(|r| descriptor.is_pending(r.status)).count() as u64);
            set_pending(&mut summary, *request_type, count);
        }
        if !state.tickets.is_empty() {
            let descriptor = self.table.descriptor(RequestType::SupportTicket);
            summary.open_support_tickets =
                Some(state.tickets.iter().filter(|t| descriptor.is_pending(t.status)).count() as u64);
        }
        summary
    }

    fn next_id(state: &mut State) -> u64 {
        state.next_id += 1;
        state.next_id
    }
}

fn set_pending(summary: &mut DashboardSummary, request_type: RequestType, count: Option<u64>) {
    let slot = match request_type {
        RequestType::Register => &mut summary.pending_registrations,
        RequestType::Renew => &mut summary.pending_renewals,
        RequestType::AutoRenewChange => &mut summary.pending_auto_renew_changes,
        RequestType::LockChange => &mut summary.pending_lock_changes,
        RequestType::TransferIn => &mut summary.pending_transfers_in,
        RequestType::TransferOut => &mut summary.pending_transfers_out,
        RequestType::InternalTransferRequest => &mut summary.pending_internal_transfers,
        RequestType::DnsChange => &mut summary.pending_dns_changes,
        RequestType::ContactUpdate => &mut summary.pending_contact_updates,
        RequestType::PaymentProof => &mut summary.pending_payment_proofs,
        RequestType::SupportTicket => &mut summary.open_support_tickets,
    };
    *slot = count;
}

fn not_found(what: &str) -> ApiError {
    ApiError::http(404, format!("{what} not found."))
}

#[async_trait]
impl AdminBackend for ScriptedBackend {
    async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        self.respond(Endpoint::DashboardSummary, |state| Ok(self.summary_of(state)))
            .await
    }

    async fn recent_pending(&self) -> Result<Vec<Request>, ApiError> {
        self.respond(Endpoint::RecentPending, |state| {
            let mut all: Vec<Request> = state.pending.values().flatten().cloned().collect();
            all.sort_by(|a, b| b.request_date.cmp(&a.request_date).then(b.id.cmp(&a.id)));
            all.truncate(5);
            Ok(all)
        })
        .await
    }

    async fn pending_requests(&self, request_type: RequestType) -> Result<Vec<Request>, ApiError> {
        self.respond(Endpoint::PendingRequests, |state| {
            Ok(state.pending.get(&request_type).cloned().unwrap_or_default())
        })
        .await
    }

    async fn tickets(&self) -> Result<Vec<Request>, ApiError> {
        self.respond(Endpoint::Tickets, |state| Ok(state.tickets.clone()))
            .await
    }

    async fn ticket_detail(&self, ticket_id: u64) -> Result<Request, ApiError> {
        self.respond(Endpoint::TicketDetail, |state| {
            state
                .tickets
                .iter()
                .find(|t| t.id == ticket_id)
                .cloned()
                .ok_or_else(|| not_found("Ticket"))
        })
        .await
    }

    async fn update_status(
        &self,
        request_type: RequestType,
        id: u64,
        update: &StatusUpdate,
    ) -> Result<Request, ApiError> {
        self.status_updates
            .lock()
            .push((request_type, id, update.clone()));
        self.respond(Endpoint::UpdateStatus, |state| {
            if !self.table.is_allowed_status(request_type, update.status) {
                return Err(ApiError::http(400, format!("Invalid status: {}", update.status)));
            }
            let list = if request_type == RequestType::SupportTicket {
                &mut state.tickets
            } else {
                state.pending.entry(request_type).or_default()
            };
            let position = list
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| not_found("Request"))?;
            let item = &mut list[position];
            let from = item.status;
            if self.table.action_for(request_type, from, update.status).is_none() {
                return Err(ApiError::http(
                    400,
                    format!("Cannot change status from {from} to {}.", update.status),
                ));
            }
            item.status = update.status;
            item.admin_notes = Some(update.admin_notes.clone());
            if !update.extra.is_empty() && !item.requested_data.is_object() {
                item.requested_data = serde_json::Value::Object(serde_json::Map::new());
            }
            if let Some(requested) = item.requested_data.as_object_mut() {
                requested.extend(update.extra.clone());
            }
            let updated = item.clone();

            let descriptor = self.table.descriptor(request_type);
            if request_type != RequestType::SupportTicket && !descriptor.is_pending(updated.status) {
                list.remove(position);
                state.history.push(updated.clone());
            }
            Ok(updated)
        })
        .await
    }

    async fn reply_to_ticket(&self, ticket_id: u64, message: &str) -> Result<TicketReplyOutcome, ApiError> {
        self.respond(Endpoint::ReplyToTicket, |state| {
            let reply_id = Self::next_id(state);
            let ticket = state
                .tickets
                .iter_mut()
                .find(|t| t.id == ticket_id)
                .ok_or_else(|| not_found("Ticket"))?;
            if ticket.status == RequestStatus::Open {
                ticket.status = RequestStatus::InProgress;
            }
            let reply = TicketReply {
                id: reply_id,
                ticket_id,
                user_id: None,
                author_username: "admin".to_string(),
                author_role: "admin".to_string(),
                message: message.to_string(),
                timestamp: None,
            };
            ticket.replies.push(reply.clone());
            Ok(TicketReplyOutcome {
                message: Some("Reply added successfully.".to_string()),
                reply,
                ticket_status: ticket.status,
            })
        })
        .await
    }

    async fn domains(&self) -> Result<Vec<Domain>, ApiError> {
        self.respond(Endpoint::Domains, |state| Ok(state.domains.clone()))
            .await
    }

    async fn domain_detail(&self, domain_id: u64) -> Result<DomainDetail, ApiError> {
        self.respond(Endpoint::DomainDetail, |state| {
            let domain = state
                .domains
                .iter()
                .find(|d| d.id == domain_id)
                .cloned()
                .ok_or_else(|| not_found("Domain"))?;
            let requests = state
                .pending
                .values()
                .flatten()
                .chain(&state.history)
                .filter(|r| r.domain_id == Some(domain_id))
                .cloned()
                .collect();
            Ok(DomainDetail {
                domain_info: domain,
                requests,
                tickets: Vec::new(),
            })
        })
        .await
    }

    async fn reassign_domain(&self, domain_id: u64, new_user_id: u64) -> Result<Domain, ApiError> {
        self.respond(Endpoint::ReassignDomain, |state| {
            if !state.clients.iter().any(|c| c.id == new_user_id) {
                return Err(not_found("Client"));
            }
            let domain = state
                .domains
                .iter_mut()
                .find(|d| d.id == domain_id)
                .ok_or_else(|| not_found("Domain"))?;
            domain.user_id = Some(new_user_id);
            Ok(domain.clone())
        })
        .await
    }

    async fn clients(&self) -> Result<Vec<Client>, ApiError> {
        self.respond(Endpoint::Clients, |state| Ok(state.clients.clone()))
            .await
    }

    async fn client_detail(&self, client_id: u64) -> Result<ClientDetail, ApiError> {
        self.respond(Endpoint::ClientDetail, |state| {
            let profile = state
                .clients
                .iter()
                .find(|c| c.id == client_id)
                .cloned()
                .ok_or_else(|| not_found("Client"))?;
            Ok(ClientDetail {
                profile,
                domains: state
                    .domains
                    .iter()
                    .filter(|d| d.user_id == Some(client_id))
                    .cloned()
                    .collect(),
                requests: state
                    .pending
                    .values()
                    .flatten()
                    .chain(&state.history)
                    .filter(|r| r.owner_id == client_id)
                    .cloned()
                    .collect(),
                tickets: state
                    .tickets
                    .iter()
                    .filter(|t| t.owner_id == client_id)
                    .cloned()
                    .collect(),
            })
        })
        .await
    }

    async fn invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        self.respond(Endpoint::Invoices, |state| Ok(state.invoices.clone()))
            .await
    }

    async fn mark_invoice_paid(&self, invoice_id: u64) -> Result<Invoice, ApiError> {
        let today = self.today;
        self.respond(Endpoint::MarkInvoicePaid, |state| {
            let invoice = state
                .invoices
                .iter_mut()
                .find(|i| i.id == invoice_id)
                .ok_or_else(|| not_found("Invoice"))?;
            if !invoice.status.can_mark_paid() {
                return Err(ApiError::http(400, format!("Invoice is already {}.", invoice.status)));
            }
            invoice.status = InvoiceStatus::Paid;
            invoice.payment_date = Some(today);
            Ok(invoice.clone())
        })
        .await
    }

    async fn cancel_invoice(&self, invoice_id: u64) -> Result<Invoice, ApiError> {
        self.respond(Endpoint::CancelInvoice, |state| {
            let invoice = state
                .invoices
                .iter_mut()
                .find(|i| i.id == invoice_id)
                .ok_or_else(|| not_found("Invoice"))?;
            if invoice.status == InvoiceStatus::Paid {
                return Err(ApiError::http(400, "Cannot cancel a paid invoice."));
            }
            invoice.status = InvoiceStatus::Cancelled;
            Ok(invoice.clone())
        })
        .await
    }
}

#[async_trait]
impl ClientBackend for ScriptedBackend {
    async fn pending_counts(&self) -> Result<ClientPendingCounts, ApiError> {
        let me = self.client_user_id;
        self.respond(Endpoint::PendingCounts, |state| {
            let count = |t: RequestType| {
                let n = state
                    .pending
                    .get(&t)
                    .map_or(0, |list| list.iter().filter(|r| r.owner_id == me).count());
                Some(n as u64)
            };
            Ok(ClientPendingCounts {
                registrations: count(RequestType::Register),
                renewals: count(RequestType::Renew),
                auto_renew_changes: count(RequestType::AutoRenewChange),
                lock_changes: count(RequestType::LockChange),
                open_support_tickets: Some(
                    state
                        .tickets
                        .iter()
                        .filter(|t| t.owner_id == me && t.status != RequestStatus::Closed)
                        .count() as u64,
                ),
                pending_transfers_in: count(RequestType::TransferIn),
                pending_transfers_out: count(RequestType::TransferOut),
                pending_dns_changes: count(RequestType::DnsChange),
                pending_contact_updates: count(RequestType::ContactUpdate),
                pending_payment_proofs: count(RequestType::PaymentProof),
                pending_internal_transfers: count(RequestType::InternalTransferRequest),
            })
        })
        .await
    }

    async fn client_tickets(&self) -> Result<Vec<Request>, ApiError> {
        let me = self.client_user_id;
        self.respond(Endpoint::ClientTickets, |state| {
            Ok(state.tickets.iter().filter(|t| t.owner_id == me).cloned().collect())
        })
        .await
    }

    async fn submit_internal_transfer(&self, submission: &InternalTransferSubmission) -> Result<Request, ApiError> {
        self.transfers.lock().push(submission.clone());
        let me = self.client_user_id;
        self.respond(Endpoint::InternalTransfer, |state| {
            let identifier = submission.target_client_identifier.as_str();
            let domain = state
                .domains
                .iter()
                .find(|d| d.id == submission.domain_id && d.user_id == Some(me))
                .cloned()
                .ok_or_else(|| ApiError::http(404, "Domain not found or not owned by you."))?;
            let target = state
                .clients
                .iter()
                .find(|c| c.is_active && (c.username == identifier || c.email.as_deref() == Some(identifier)))
                .cloned()
                .ok_or_else(|| ApiError::http(404, "Target client not found or inactive."))?;
            if target.id == me {
                return Err(ApiError::http(400, "Cannot transfer to yourself."));
            }
            let list = state.pending.entry(RequestType::InternalTransferRequest).or_default();
            if list.iter().any(|r| r.domain_id == Some(domain.id)) {
                return Err(ApiError::http(409, "Request already pending."));
            }

            let id = Self::next_id(state);
            let mut request = Request::new(
                id,
                RequestType::InternalTransferRequest,
                RequestStatus::PendingAdminApproval,
                me,
            )
            .with_domain(domain.name.clone())
            .with_summary("target_client_username", target.username.clone())
            .with_requested("target_client_id", target.id);
            request.domain_id = Some(domain.id);
            state
                .pending
                .entry(RequestType::InternalTransferRequest)
                .or_default()
                .push(request.clone());
            Ok(request)
        })
        .await
    }

    async fn request_auto_renew_change(&self, domain_id: u64, enable: bool) -> Result<Request, ApiError> {
        let me = self.client_user_id;
        self.respond(Endpoint::AutoRenewChange, |state| {
            let domain = owned_domain(state, domain_id, me)?;
            if domain.auto_renew == enable {
                return Err(ApiError::http(409, "Auto-renew is already in the requested state."));
            }
            let id = Self::next_id(state);
            let mut request = Request::new(id, RequestType::AutoRenewChange, RequestStatus::PendingAdminApproval, me)
                .with_domain(domain.name)
                .with_summary("requested_status", enable);
            request.domain_id = Some(domain_id);
            state.pending.entry(RequestType::AutoRenewChange).or_default().push(request.clone());
            Ok(request)
        })
        .await
    }

    async fn request_lock_change(&self, domain_id: u64, lock: bool) -> Result<Request, ApiError> {
        let me = self.client_user_id;
        self.respond(Endpoint::LockChange, |state| {
            let domain = owned_domain(state, domain_id, me)?;
            if domain.is_locked == lock {
                let word = if lock { "locked" } else { "unlocked" };
                return Err(ApiError::http(409, format!("Domain is already {word}.")));
            }
            let id = Self::next_id(state);
            let mut request = Request::new(id, RequestType::LockChange, RequestStatus::PendingAdminApproval, me)
                .with_domain(domain.name)
                .with_summary("requested_lock_status", lock);
            request.domain_id = Some(domain_id);
            state.pending.entry(RequestType::LockChange).or_default().push(request.clone());
            Ok(request)
        })
        .await
    }
}

fn owned_domain(state: &State, domain_id: u64, owner: u64) -> Result<Domain, ApiError> {
    state
        .domains
        .iter()
        .find(|d| d.id == domain_id && d.user_id == Some(owner))
        .cloned()
        .ok_or_else(|| ApiError::http(404, "Domain not found or not owned by you."))
}

#[async_trait]
impl NotificationBackend for ScriptedBackend {
    async fn notifications(&self) -> Result<NotificationFeed, ApiError> {
        self.respond(Endpoint::Notifications, |state| {
            let unread_count = state.notifications.iter().filter(|n| !n.is_read).count() as u64;
            Ok(NotificationFeed {
                notifications: state.notifications.clone(),
                unread_count,
            })
        })
        .await
    }

    async fn mark_read(&self, target: MarkReadTarget) -> Result<u64, ApiError> {
        self.respond(Endpoint::MarkRead, |state| {
            for n in &mut state.notifications {
                let hit = match &target {
                    MarkReadTarget::All => true,
                    MarkReadTarget::Ids(ids) => ids.contains(&n.id),
                };
                if hit {
                    n.is_read = true;
                }
            }
            Ok(state.notifications.iter().filter(|n| !n.is_read).count() as u64)
        })
        .await
    }
}

#[async_trait]
impl SessionBackend for ScriptedBackend {
    async fn logout(&self) -> Result<(), ApiError> {
        self.respond(Endpoint::Logout, |_| Ok(())).await
    }
}

// Fixtures

/// Session over a scripted backend with default configuration
pub fn scripted_session(backend: &Arc<ScriptedBackend>) -> Session {
    Session::with_backend(Arc::clone(backend), ConsoleConfig::default())
}

/// Pending registration for `example-<id>.com` owned by client 1
pub fn register_request(id: u64) -> Request {
    let mut request = Request::new(id, RequestType::Register, RequestStatus::PendingAdminApproval, 1)
        .with_domain(format!("example-{id}.com"))
        .with_owner_username("alice")
        .with_summary("duration", 1);
    request.request_date = Some("2024-05-20".to_string());
    request
}

/// Pending request of any domain type owned by client 1
pub fn pending_request(id: u64, request_type: RequestType) -> Request {
    let mut request = Request::new(id, request_type, RequestStatus::PendingAdminApproval, 1)
        .with_domain(format!("example-{id}.com"))
        .with_owner_username("alice");
    request.domain_id = Some(id);
    request
}

/// Support ticket owned by client 1
pub fn ticket(id: u64, status: RequestStatus) -> Request {
    Request::new(id, RequestType::SupportTicket, status, 1)
        .with_owner_username("alice")
        .with_ticket_text(format!("Ticket {id}"), "Something is broken")
}

pub fn invoice(id: u64, status: InvoiceStatus) -> Invoice {
    Invoice {
        id,
        invoice_number: format!("INV-{id:04}"),
        user_id: 1,
        client_name: Some("Alice".to_string()),
        client_username: Some("alice".to_string()),
        domain_name: Some(format!("example-{id}.com")),
        description: "Domain registration".to_string(),
        amount: 12.0,
        issue_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        due_date: NaiveDate::from_ymd_opt(2024, 5, 31),
        status,
        payment_date: None,
        notes: None,
    }
}

pub fn domain(id: u64, name: &str, owner: u64) -> Domain {
    Domain {
        id,
        name: name.to_string(),
        status: "Active".to_string(),
        reg_date: NaiveDate::from_ymd_opt(2023, 1, 1),
        exp_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        auto_renew: false,
        is_locked: false,
        user_id: Some(owner),
        owner_name: None,
    }
}

pub fn client(id: u64, username: &str) -> Client {
    Client {
        id,
        username: username.to_string(),
        name: username.to_string(),
        email: Some(format!("{username}@example.com")),
        is_active: true,
        domain_count: None,
    }
}

pub fn notification(id: u64, notification_type: &str, message: &str) -> Notification {
    Notification {
        id,
        message: message.to_string(),
        notification_type: Some(notification_type.to_string()),
        is_read: false,
        timestamp: None,
        link: None,
    }
}

/// JSON for a request as the backend would serve it
pub fn request_json(request: &Request) -> serde_json::Value {
    serde_json::to_value(request).unwrap_or_default()
}
