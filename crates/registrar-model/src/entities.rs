//! Server-owned entities around requests: invoices, domains, clients and
//! dashboard counters.

use crate::error::ModelError;
use crate::request::{Request, RequestType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Invoice lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[serde(rename = "Pending Payment")]
    PendingPayment,
    #[serde(rename = "Overdue")]
    Overdue,
    #[serde(rename = "Paid")]
    Paid,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl InvoiceStatus {
    /// Display / wire string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingPayment => "Pending Payment",
            Self::Overdue => "Overdue",
            Self::Paid => "Paid",
            Self::Cancelled => "Cancelled",
        }
    }

    /// "Mark Paid" is offered
    #[inline]
    #[must_use]
    pub const fn can_mark_paid(self) -> bool {
        matches!(self, Self::PendingPayment | Self::Overdue)
    }

    /// "Cancel" is offered
    #[inline]
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        !matches!(self, Self::Paid | Self::Cancelled)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::PendingPayment, Self::Overdue, Self::Paid, Self::Cancelled]
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownInvoiceStatus(s.to_string()))
    }
}

/// Invoice issued to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u64,
    pub invoice_number: String,
    pub user_id: u64,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_username: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Managed domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: u64,
    pub name: String,
    pub status: String,
    #[serde(rename = "regDate", default)]
    pub reg_date: Option<NaiveDate>,
    #[serde(rename = "expDate", default)]
    pub exp_date: Option<NaiveDate>,
    #[serde(rename = "autoRenew", default)]
    pub auto_renew: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(rename = "userId", default)]
    pub user_id: Option<u64>,
    #[serde(rename = "ownerName", default)]
    pub owner_name: Option<String>,
}

/// Client account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: u64,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub domain_count: Option<u64>,
}

fn default_active() -> bool {
    true
}

/// `GET /client/{id}/details`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDetail {
    pub profile: Client,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub tickets: Vec<Request>,
}

/// `GET /domain/{id}/details`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainDetail {
    pub domain_info: Domain,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub tickets: Vec<Request>,
}

/// Admin dashboard counters; a missing counter renders as `N/A`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub pending_registrations: Option<u64>,
    #[serde(default)]
    pub pending_renewals: Option<u64>,
    #[serde(default)]
    pub pending_auto_renew_changes: Option<u64>,
    #[serde(default)]
    pub pending_lock_changes: Option<u64>,
    #[serde(default)]
    pub open_support_tickets: Option<u64>,
    #[serde(default)]
    pub pending_transfers_in: Option<u64>,
    #[serde(default)]
    pub pending_transfers_out: Option<u64>,
    #[serde(default)]
    pub pending_internal_transfers: Option<u64>,
    #[serde(default)]
    pub pending_dns_changes: Option<u64>,
    #[serde(default)]
    pub pending_contact_updates: Option<u64>,
    #[serde(default)]
    pub pending_payment_proofs: Option<u64>,
    #[serde(default)]
    pub total_managed_domains: Option<u64>,
    #[serde(default)]
    pub total_clients: Option<u64>,
}

impl DashboardSummary {
    /// Pending (or open, for tickets) counter for a request type
    #[must_use]
    pub fn pending_for(&self, request_type: RequestType) -> Option<u64> {
        match request_type {
            RequestType::Register => self.pending_registrations,
            RequestType::Renew => self.pending_renewals,
            RequestType::AutoRenewChange => self.pending_auto_renew_changes,
            RequestType::LockChange => self.pending_lock_changes,
            RequestType::TransferIn => self.pending_transfers_in,
            RequestType::TransferOut => self.pending_transfers_out,
            RequestType::InternalTransferRequest => self.pending_internal_transfers,
            RequestType::DnsChange => self.pending_dns_changes,
            RequestType::ContactUpdate => self.pending_contact_updates,
            RequestType::PaymentProof => self.pending_payment_proofs,
            RequestType::SupportTicket => self.open_support_tickets,
        }
    }

    /// All counters with their dashboard labels
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, Option<u64>)> {
        vec![
            ("Pending Registrations", self.pending_registrations),
            ("Pending Renewals", self.pending_renewals),
            ("Open Tickets", self.open_support_tickets),
            ("Pending Transfers In", self.pending_transfers_in),
            ("Pending Transfers Out", self.pending_transfers_out),
            ("Pending Internal Transfers", self.pending_internal_transfers),
            ("Pending DNS Changes", self.pending_dns_changes),
            ("Pending Contact Updates", self.pending_contact_updates),
            ("Pending Payment Proofs", self.pending_payment_proofs),
            ("Total Domains", self.total_managed_domains),
            ("Total Clients", self.total_clients),
            ("Pending Auto-Renew Changes", self.pending_auto_renew_changes),
            ("Pending Lock Changes", self.pending_lock_changes),
        ]
    }
}

/// Client dashboard counters (`GET /client/pending-request-counts`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPendingCounts {
    #[serde(default)]
    pub registrations: Option<u64>,
    #[serde(default)]
    pub renewals: Option<u64>,
    #[serde(default)]
    pub auto_renew_changes: Option<u64>,
    #[serde(default)]
    pub lock_changes: Option<u64>,
    #[serde(default)]
    pub open_support_tickets: Option<u64>,
    #[serde(default)]
    pub pending_transfers_in: Option<u64>,
    #[serde(default)]
    pub pending_transfers_out: Option<u64>,
    #[serde(default)]
    pub pending_dns_changes: Option<u64>,
    #[serde(default)]
    pub pending_contact_updates: Option<u64>,
    #[serde(default)]
    pub pending_payment_proofs: Option<u64>,
    #[serde(default)]
    pub pending_internal_transfers: Option<u64>,
}

impl ClientPendingCounts {
    /// Sum of every pending counter
    #[must_use]
    pub fn total(&self) -> u64 {
        [
            self.registrations,
            self.renewals,
            self.auto_renew_changes,
            self.lock_changes,
            self.open_support_tickets,
            self.pending_transfers_in,
            self.pending_transfers_out,
            self.pending_dns_changes,
            self.pending_contact_updates,
            self.pending_payment_proofs,
            self.pending_internal_transfers,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invoice_affordances() {
        assert!(InvoiceStatus::PendingPayment.can_mark_paid());
        assert!(InvoiceStatus::Overdue.can_mark_paid());
        assert!(!InvoiceStatus::Paid.can_mark_paid());
        assert!(InvoiceStatus::Overdue.can_cancel());
        assert!(!InvoiceStatus::Cancelled.can_cancel());
        assert!(!InvoiceStatus::Paid.can_cancel());
    }

    #[test]
    fn decodes_invoice_with_dates() {
        let raw = json!({
            "id": 7,
            "invoice_number": "INV-2024-0007",
            "user_id": 3,
            "client_name": "Acme",
            "client_username": "acme",
            "domain_id": null,
            "domain_name": "N/A",
            "description": "Renewal",
            "amount": 12.5,
            "issue_date": "2024-04-01",
            "due_date": "2024-05-01",
            "status": "Paid",
            "payment_date": "2024-04-20",
            "notes": null
        });
        let invoice: Invoice = serde_json::from_value(raw).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.payment_date, NaiveDate::from_ymd_opt(2024, 4, 20));
    }

    #[test]
    fn summary_missing_counters_are_none() {
        let summary: DashboardSummary =
            serde_json::from_value(json!({"pending_registrations": 4})).unwrap();
        assert_eq!(summary.pending_for(RequestType::Register), Some(4));
        assert_eq!(summary.pending_for(RequestType::Renew), None);
        assert_eq!(summary.entries().len(), 13);
    }

    #[test]
    fn client_counts_total() {
        let counts = ClientPendingCounts {
            registrations: Some(2),
            lock_changes: Some(1),
            ..Default::default()
        };
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn invoice_status_parse() {
        assert_eq!("pending payment".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::PendingPayment);
        assert!("refunded".parse::<InvoiceStatus>().is_err());
    }
}
