//! Backend boundary
//!
//! The REST backend is an external collaborator; these traits are the only
//! surface the sync core depends on. [`crate::http::HttpBackend`] implements
//! all of them over reqwest, and tests script them in memory.

use async_trait::async_trait;
use registrar_model::{
    ApiError, Client, ClientDetail, ClientPendingCounts, DashboardSummary, Domain, DomainDetail,
    Invoice, MarkReadTarget, NotificationFeed, Request, RequestType, StatusUpdate,
    TicketReplyOutcome,
};
use serde::{Deserialize, Serialize};

/// Admin endpoints under the admin prefix
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// `GET /dashboard-summary`
    async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError>;

    /// `GET /requests/recent-pending`
    async fn recent_pending(&self) -> Result<Vec<Request>, ApiError>;

    /// `GET /requests/{type}/pending`
    async fn pending_requests(&self, request_type: RequestType) -> Result<Vec<Request>, ApiError>;

    /// `GET /requests/support-tickets/all`
    async fn tickets(&self) -> Result<Vec<Request>, ApiError>;

    /// `GET /support-tickets/{id}/details`
    async fn ticket_detail(&self, ticket_id: u64) -> Result<Request, ApiError>;

    /// `PUT /requests/{path}/{id}/status`, returning the updated item
    async fn update_status(
        &self,
        request_type: RequestType,
        id: u64,
        update: &StatusUpdate,
    ) -> Result<Request, ApiError>;

    /// `POST /support-tickets/{id}/reply`
    async fn reply_to_ticket(
        &self,
        ticket_id: u64,
        message: &str,
    ) -> Result<TicketReplyOutcome, ApiError>;

    /// `GET /all-domains`
    async fn domains(&self) -> Result<Vec<Domain>, ApiError>;

    /// `GET /domain/{id}/details`
    async fn domain_detail(&self, domain_id: u64) -> Result<DomainDetail, ApiError>;

    /// `POST /domains/{id}/reassign`
    async fn reassign_domain(&self, domain_id: u64, new_user_id: u64) -> Result<Domain, ApiError>;

    /// `GET /clients`
    async fn clients(&self) -> Result<Vec<Client>, ApiError>;

    /// `GET /client/{id}/details`
    async fn client_detail(&self, client_id: u64) -> Result<ClientDetail, ApiError>;

    /// `GET /invoices`
    async fn invoices(&self) -> Result<Vec<Invoice>, ApiError>;

    /// `POST /invoices/{id}/mark-paid`
    async fn mark_invoice_paid(&self, invoice_id: u64) -> Result<Invoice, ApiError>;

    /// `POST /invoices/{id}/cancel`
    async fn cancel_invoice(&self, invoice_id: u64) -> Result<Invoice, ApiError>;
}

/// Client endpoints under the api prefix
#[async_trait]
pub trait ClientBackend: Send + Sync {
    /// `GET /client/pending-request-counts`
    async fn pending_counts(&self) -> Result<ClientPendingCounts, ApiError>;

    /// `GET /support-tickets` for the signed-in client
    async fn client_tickets(&self) -> Result<Vec<Request>, ApiError>;

    /// `POST /domain-requests/internal-transfer`
    async fn submit_internal_transfer(
        &self,
        submission: &InternalTransferSubmission,
    ) -> Result<Request, ApiError>;

    /// `POST /domain-requests/auto-renew-change/{domain_id}`
    async fn request_auto_renew_change(&self, domain_id: u64, enable: bool) -> Result<Request, ApiError>;

    /// `POST /domain-requests/lock-change/{domain_id}`
    async fn request_lock_change(&self, domain_id: u64, lock: bool) -> Result<Request, ApiError>;
}

/// Notification endpoints, shared by both roles
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    /// `GET /notifications`
    async fn notifications(&self) -> Result<NotificationFeed, ApiError>;

    /// `POST /notifications/mark-read`, returning the new unread count
    async fn mark_read(&self, target: MarkReadTarget) -> Result<u64, ApiError>;
}

/// Session endpoints
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// `POST /auth/logout`
    async fn logout(&self) -> Result<(), ApiError>;
}

/// Body of an internal transfer submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternalTransferSubmission {
    #[serde(rename = "domainId")]
    pub domain_id: u64,
    #[serde(rename = "targetClientIdentifier")]
    pub target_client_identifier: String,
}

/// `{message, request}` envelope of client submissions
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub request: Request,
}

/// `{message, invoice}` envelope of invoice actions
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub invoice: Invoice,
}

/// `{message, domain}` envelope of domain reassignment
#[derive(Debug, Clone, Deserialize)]
pub struct DomainEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub domain: Domain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn internal_transfer_body_uses_camel_case() {
        let body = InternalTransferSubmission {
            domain_id: 5,
            target_client_identifier: "acme".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"domainId": 5, "targetClientIdentifier": "acme"})
        );
    }

    #[test]
    fn invoice_envelope_decodes() {
        let raw = json!({
            "message": "Invoice marked Paid.",
            "invoice": {
                "id": 7, "invoice_number": "INV-7", "user_id": 2,
                "description": "Renewal", "amount": 10.0,
                "status": "Paid", "payment_date": "2024-06-01"
            }
        });
        let envelope: InvoiceEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.invoice.id, 7);
    }
}
