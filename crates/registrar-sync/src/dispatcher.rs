//! Action Dispatcher
//!
//! Turns an admin action into a backend call and feeds the confirmed
//! result back through the registry and the orchestrator:
//! - one call per [`RequestKey`] at a time; a second one fails fast
//! - nothing is written locally until the backend confirms
//! - terminal results leave the pending list, others are upserted
//! - every scope the transition table invalidates is refreshed

use crate::backend::AdminBackend;
use crate::events::RefreshScope;
use crate::orchestrator::{resolve_scopes, SyncOrchestrator};
use dashmap::DashSet;
use registrar_model::{
    AdminAction, ApiError, Domain, ErrorReport, Invoice, ModelError, NotePrompt, Request,
    RequestKey, RequestStatus, RequestType, StatusUpdate, TicketReply,
};
use serde_json::{Map, Value};
use std::hash::Hash;
use std::sync::Arc;

/// Dispatch failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// Another action on the same item has not settled yet
    #[error("an action on {0} is already in flight")]
    InFlight(String),

    /// Backend rejected or never received the call
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Status outside the type's lifecycle
    #[error(transparent)]
    Invalid(#[from] ModelError),

    /// Ticket reply with no text
    #[error("Reply message cannot be empty.")]
    EmptyReply,
}

impl DispatchError {
    /// Normalised `{message, status, errors}` form
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        match self {
            Self::Api(err) => err.report(),
            other => ErrorReport {
                message: other.to_string(),
                status: 0,
                errors: registrar_model::FieldErrors::new(),
            },
        }
    }

    /// Check for the double-submit guard
    #[inline]
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight(_))
    }
}

/// Result of a confirmed status change
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Item as returned by the backend
    pub request: Request,
    /// Whether the item left its pending list
    pub removed_from_pending: bool,
    /// Scopes refreshed afterwards
    pub refreshed: Vec<RefreshScope>,
    /// Scopes whose refresh failed (already published on the bus)
    pub failed_refreshes: Vec<RefreshScope>,
}

/// Input collected by the admin notes prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub request_id: u64,
    pub request_type: RequestType,
    pub target: RequestStatus,
    pub prompt: NotePrompt,
    pub notes: String,
    pub epp_code: String,
}

impl NoteForm {
    /// Open the prompt for `action` on a request
    #[must_use]
    pub fn for_action(request: &Request, action: &AdminAction) -> Self {
        Self {
            request_id: request.id,
            request_type: request.request_type,
            target: action.target,
            prompt: action.prompt,
            notes: request.admin_notes.clone().unwrap_or_default(),
            epp_code: String::new(),
        }
    }

    /// With note text
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// With EPP code text
    #[inline]
    #[must_use]
    pub fn with_epp_code(mut self, code: impl Into<String>) -> Self {
        self.epp_code = code.into();
        self
    }

    /// Extra body fields; the EPP code only when the prompt asks for it and
    /// one was typed
    #[must_use]
    pub fn extra(&self) -> Map<String, Value> {
        let mut extra = Map::new();
        let code = self.epp_code.trim();
        if self.prompt.wants_epp_code() && !code.is_empty() {
            extra.insert("epp_code".to_string(), Value::String(code.to_string()));
        }
        extra
    }
}

/// Removes its key from the in-flight set when dropped
struct InFlightGuard<'a, K: Eq + Hash> {
    set: &'a DashSet<K>,
    key: K,
}

impl<'a, K: Eq + Hash + Clone> InFlightGuard<'a, K> {
    fn acquire(set: &'a DashSet<K>, key: K) -> Option<Self> {
        set.insert(key.clone()).then_some(Self { set, key })
    }
}

impl<K: Eq + Hash> Drop for InFlightGuard<'_, K> {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

/// Admin action dispatcher
pub struct ActionDispatcher {
    backend: Arc<dyn AdminBackend>,
    orchestrator: Arc<SyncOrchestrator>,
    in_flight: DashSet<RequestKey>,
    invoices_in_flight: DashSet<u64>,
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("in_flight", &self.in_flight.len())
            .field("invoices_in_flight", &self.invoices_in_flight.len())
            .finish_non_exhaustive()
    }
}

impl ActionDispatcher {
    /// Create dispatcher
    #[must_use]
    pub fn new(backend: Arc<dyn AdminBackend>, orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self {
            backend,
            orchestrator,
            in_flight: DashSet::new(),
            invoices_in_flight: DashSet::new(),
        }
    }

    /// Whether an action on `key` has not settled yet
    #[must_use]
    pub fn is_in_flight(&self, key: RequestKey) -> bool {
        self.in_flight.contains(&key)
    }

    /// Whether an invoice action on `invoice_id` has not settled yet
    #[must_use]
    pub fn is_invoice_in_flight(&self, invoice_id: u64) -> bool {
        self.invoices_in_flight.contains(&invoice_id)
    }

    /// Every request key with an unsettled action
    #[must_use]
    pub fn in_flight_keys(&self) -> Vec<RequestKey> {
        self.in_flight.iter().map(|k| *k).collect()
    }

    /// Move a request to `new_status`
    ///
    /// # Errors
    /// - [`DispatchError::InFlight`] when the same request is already being
    ///   dispatched
    /// - [`DispatchError::Invalid`] when `new_status` is outside the type's
    ///   lifecycle (no network call is made)
    /// - [`DispatchError::Api`] when the backend fails; the registry is left
    ///   untouched
    pub async fn dispatch(
        &self,
        request_id: u64,
        request_type: RequestType,
        new_status: RequestStatus,
        notes: &str,
        extra: Map<String, Value>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let key = RequestKey::new(request_type, request_id);
        let registry = self.orchestrator.registry();
        registry.table().validate_status(request_type, new_status)?;

        let guard = InFlightGuard::acquire(&self.in_flight, key)
            .ok_or_else(|| DispatchError::InFlight(key.to_string()))?;

        let update = StatusUpdate {
            status: new_status,
            admin_notes: notes.to_string(),
            extra,
        };
        tracing::info!(%key, status = %new_status, "dispatching status change");

        let updated = self
            .backend
            .update_status(request_type, request_id, &update)
            .await
            .map_err(|err| {
                tracing::warn!(%key, error = %err, "status change rejected");
                err
            })?;

        let removed_from_pending = updated.status.is_terminal();
        if removed_from_pending {
            registry.record_history(&updated);
            registry.remove(request_type, request_id);
        } else if let Err(err) = registry.upsert(updated.clone()) {
            tracing::warn!(%key, error = %err, "backend returned status outside lifecycle");
        }
        drop(guard);

        let invalidations = registry.table().invalidations(request_type, updated.status);
        let scopes = resolve_scopes(&updated, &invalidations);
        let (refreshed, failed_refreshes) = self.refresh(&scopes).await;

        tracing::info!(%key, status = %updated.status, removed_from_pending, "status change applied");
        Ok(DispatchOutcome {
            request: updated,
            removed_from_pending,
            refreshed,
            failed_refreshes,
        })
    }

    /// Submit the notes prompt
    ///
    /// Notes are trimmed and may be empty.
    ///
    /// # Errors
    /// As [`ActionDispatcher::dispatch`].
    pub async fn submit_note_form(&self, form: &NoteForm) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch(
            form.request_id,
            form.request_type,
            form.target,
            form.notes.trim(),
            form.extra(),
        )
        .await
    }

    /// Change a ticket's status with the generated audit note
    ///
    /// # Errors
    /// As [`ActionDispatcher::dispatch`].
    pub async fn change_ticket_status(
        &self,
        ticket_id: u64,
        new_status: RequestStatus,
    ) -> Result<DispatchOutcome, DispatchError> {
        let note = format!("Status changed to {new_status} by admin.");
        self.dispatch(ticket_id, RequestType::SupportTicket, new_status, &note, Map::new())
            .await
    }

    /// Post an admin reply on a ticket
    ///
    /// # Errors
    /// [`DispatchError::EmptyReply`] for blank text (no network call),
    /// otherwise as [`ActionDispatcher::dispatch`].
    pub async fn reply_to_ticket(
        &self,
        ticket_id: u64,
        message: &str,
    ) -> Result<TicketReply, DispatchError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DispatchError::EmptyReply);
        }

        let key = RequestKey::new(RequestType::SupportTicket, ticket_id);
        let guard = InFlightGuard::acquire(&self.in_flight, key)
            .ok_or_else(|| DispatchError::InFlight(key.to_string()))?;

        let outcome = self.backend.reply_to_ticket(ticket_id, message).await?;
        tracing::info!(ticket_id, status = %outcome.ticket_status, "ticket reply posted");
        self.orchestrator
            .registry()
            .apply_ticket_reply(outcome.reply.clone(), outcome.ticket_status);
        drop(guard);

        self.refresh(&[
            RefreshScope::TicketList,
            RefreshScope::TicketDetail(ticket_id),
            RefreshScope::DashboardCounts,
        ])
        .await;
        Ok(outcome.reply)
    }

    /// Mark an invoice paid
    ///
    /// # Errors
    /// [`DispatchError::InFlight`] or [`DispatchError::Api`].
    pub async fn mark_invoice_paid(&self, invoice_id: u64) -> Result<Invoice, DispatchError> {
        self.invoice_action(invoice_id, "mark-paid").await
    }

    /// Cancel an invoice
    ///
    /// # Errors
    /// [`DispatchError::InFlight`] or [`DispatchError::Api`].
    pub async fn cancel_invoice(&self, invoice_id: u64) -> Result<Invoice, DispatchError> {
        self.invoice_action(invoice_id, "cancel").await
    }

    async fn invoice_action(&self, invoice_id: u64, action: &'static str) -> Result<Invoice, DispatchError> {
        let guard = InFlightGuard::acquire(&self.invoices_in_flight, invoice_id)
            .ok_or_else(|| DispatchError::InFlight(format!("invoice#{invoice_id}")))?;

        let result = if action == "cancel" {
            self.backend.cancel_invoice(invoice_id).await
        } else {
            self.backend.mark_invoice_paid(invoice_id).await
        };
        let invoice = result.map_err(|err| {
            tracing::warn!(invoice_id, action, error = %err, "invoice action rejected");
            err
        })?;

        tracing::info!(invoice_id, action, status = %invoice.status, "invoice updated");
        self.orchestrator.registry().upsert_invoice(invoice.clone());
        drop(guard);

        self.refresh(&[
            RefreshScope::InvoiceList,
            RefreshScope::DashboardCounts,
            RefreshScope::PendingList(RequestType::PaymentProof),
            RefreshScope::RecentPending,
            RefreshScope::ClientDetail(invoice.user_id),
        ])
        .await;
        Ok(invoice)
    }

    /// Move a domain to another client
    ///
    /// # Errors
    /// [`DispatchError::Api`] when the backend refuses.
    pub async fn reassign_domain(&self, domain_id: u64, new_user_id: u64) -> Result<Domain, DispatchError> {
        let previous_owner = self
            .orchestrator
            .registry()
            .domains()
            .into_iter()
            .find(|d| d.id == domain_id)
            .and_then(|d| d.user_id);

        let domain = self.backend.reassign_domain(domain_id, new_user_id).await?;
        tracing::info!(domain_id, new_user_id, "domain reassigned");

        let mut scopes = vec![
            RefreshScope::DomainList,
            RefreshScope::DomainDetail(domain_id),
            RefreshScope::ClientList,
            RefreshScope::ClientDetail(new_user_id),
        ];
        if let Some(owner) = previous_owner.filter(|o| *o != new_user_id) {
            scopes.push(RefreshScope::ClientDetail(owner));
        }
        self.refresh(&scopes).await;
        Ok(domain)
    }

    async fn refresh(&self, scopes: &[RefreshScope]) -> (Vec<RefreshScope>, Vec<RefreshScope>) {
        let mut refreshed = Vec::new();
        let mut failed = Vec::new();
        for (scope, result) in self.orchestrator.refresh_invalidated(scopes).await {
            if result.is_ok() {
                refreshed.push(scope);
            } else {
                failed.push(scope);
            }
        }
        (refreshed, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_model::TransitionTable;

    #[test]
    fn epp_code_only_for_epp_prompt() {
        let table = TransitionTable::standard();
        let request = Request::new(9, RequestType::TransferOut, RequestStatus::PendingAdminApproval, 1);
        let send_epp = table
            .action_for(RequestType::TransferOut, request.status, RequestStatus::EppCodeSent)
            .unwrap();
        let form = NoteForm::for_action(&request, send_epp).with_epp_code("  AUTH-1 ");
        assert_eq!(form.extra().get("epp_code"), Some(&Value::String("AUTH-1".into())));

        let blank = NoteForm::for_action(&request, send_epp).with_epp_code("   ");
        assert!(blank.extra().is_empty());

        let reject = table
            .action_for(RequestType::TransferOut, request.status, RequestStatus::Rejected)
            .unwrap();
        let form = NoteForm::for_action(&request, reject).with_epp_code("AUTH-1");
        assert!(form.extra().is_empty());
    }

    #[test]
    fn in_flight_guard_releases_on_drop() {
        let set = DashSet::new();
        let key = RequestKey::new(RequestType::Register, 1);
        let guard = InFlightGuard::acquire(&set, key).unwrap();
        assert!(InFlightGuard::acquire(&set, key).is_none());
        drop(guard);
        assert!(InFlightGuard::acquire(&set, key).is_some());
    }

    #[test]
    fn report_of_local_errors() {
        let report = DispatchError::EmptyReply.report();
        assert_eq!(report.status, 0);
        assert_eq!(report.message, "Reply message cannot be empty.");
        assert!(DispatchError::InFlight("register#1".into()).is_in_flight());
    }
}
