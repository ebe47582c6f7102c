//! Request-like entities awaiting admin processing
//!
//! Covers both domain requests (register, renew, transfers, ...) and
//! support tickets, which share one lifecycle: submitted by a client,
//! mutated only through an admin status update.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Fixed enumeration of request types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// New domain registration
    Register,
    /// Domain renewal
    Renew,
    /// Toggle auto-renew on a domain
    AutoRenewChange,
    /// Toggle registrar lock on a domain
    LockChange,
    /// Inbound registrar transfer
    TransferIn,
    /// Outbound registrar transfer
    TransferOut,
    /// Move a domain between two clients of the platform
    InternalTransferRequest,
    /// DNS record change
    DnsChange,
    /// Registrant contact update
    ContactUpdate,
    /// Proof of payment for an invoice
    PaymentProof,
    /// Support ticket
    #[serde(alias = "support-ticket")]
    SupportTicket,
}

impl RequestType {
    /// Every request type, in admin tab order
    pub const ALL: [RequestType; 11] = [
        RequestType::Register,
        RequestType::Renew,
        RequestType::AutoRenewChange,
        RequestType::LockChange,
        RequestType::TransferIn,
        RequestType::TransferOut,
        RequestType::InternalTransferRequest,
        RequestType::DnsChange,
        RequestType::ContactUpdate,
        RequestType::PaymentProof,
        RequestType::SupportTicket,
    ];

    /// Wire name used in payloads and pending-list URLs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Renew => "renew",
            Self::AutoRenewChange => "auto_renew_change",
            Self::LockChange => "lock_change",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::InternalTransferRequest => "internal_transfer_request",
            Self::DnsChange => "dns_change",
            Self::ContactUpdate => "contact_update",
            Self::PaymentProof => "payment_proof",
            Self::SupportTicket => "support_ticket",
        }
    }

    /// Path segment of the status-update endpoint
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Register => "registrations",
            Self::Renew => "renewals",
            Self::AutoRenewChange => "auto-renew-changes",
            Self::LockChange => "lock-changes",
            Self::TransferIn => "transfers-in",
            Self::TransferOut => "transfers-out",
            Self::InternalTransferRequest => "internal-transfers",
            Self::DnsChange => "dns-changes",
            Self::ContactUpdate => "contact-updates",
            Self::PaymentProof => "payment-proofs",
            Self::SupportTicket => "support-tickets",
        }
    }

    /// Hyphenated slug used in card ids
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Renew => "renew",
            Self::AutoRenewChange => "auto-renew-change",
            Self::LockChange => "lock-change",
            Self::TransferIn => "transfer-in",
            Self::TransferOut => "transfer-out",
            Self::InternalTransferRequest => "internal-transfer-request",
            Self::DnsChange => "dns-change",
            Self::ContactUpdate => "contact-update",
            Self::PaymentProof => "payment-proof",
            Self::SupportTicket => "support-ticket",
        }
    }

    /// Category wording used in list placeholders ("No pending ... requests.")
    #[must_use]
    pub const fn category_label(self) -> &'static str {
        match self {
            Self::Register => "registrations",
            Self::Renew => "renewals",
            Self::AutoRenewChange => "auto renew",
            Self::LockChange => "lock change",
            Self::TransferIn => "transfers in",
            Self::TransferOut => "transfers out",
            Self::InternalTransferRequest => "internal transfers",
            Self::DnsChange => "dns changes",
            Self::ContactUpdate => "contact updates",
            Self::PaymentProof => "payment proofs",
            Self::SupportTicket => "support tickets",
        }
    }

    /// Human readable name ("Auto Renew Change")
    #[must_use]
    pub fn display_name(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether this type is a domain request (as opposed to a ticket)
    #[inline]
    #[must_use]
    pub fn is_domain_request(self) -> bool {
        self != Self::SupportTicket
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = ModelError;

    /// Accepts the wire name, the hyphenated slug or the update path segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle || t.slug() == needle || t.path_segment() == needle)
            .ok_or_else(|| ModelError::UnknownRequestType(s.to_string()))
    }
}

/// Every status string the platform uses, across all request types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Waiting for an admin decision
    #[serde(rename = "Pending Admin Approval")]
    PendingAdminApproval,
    /// Legacy spelling of the pending state
    #[serde(rename = "Pending")]
    Pending,
    /// Transfer-out waiting on the client
    #[serde(rename = "Awaiting Client Action")]
    AwaitingClientAction,
    /// Admin is working on it
    #[serde(rename = "Processing")]
    Processing,
    /// Transfer-in waiting for client info
    #[serde(rename = "Info Requested")]
    InfoRequested,
    /// DNS change waiting for client info
    #[serde(rename = "Needs Info")]
    NeedsInfo,
    /// Contact update waiting for client clarification
    #[serde(rename = "Needs Clarification")]
    NeedsClarification,
    /// Transfer-out auth code handed to the client
    #[serde(rename = "EPP Code Sent")]
    EppCodeSent,
    /// Admin approved
    #[serde(rename = "Approved")]
    Approved,
    /// Done
    #[serde(rename = "Completed")]
    Completed,
    /// Admin rejected
    #[serde(rename = "Rejected")]
    Rejected,
    /// Processing failed
    #[serde(rename = "Failed")]
    Failed,
    /// Client withdrew
    #[serde(rename = "Cancelled by Client")]
    CancelledByClient,
    /// Ticket open
    #[serde(rename = "Open")]
    Open,
    /// Ticket being handled
    #[serde(rename = "In Progress")]
    InProgress,
    /// Ticket resolved
    #[serde(rename = "Resolved")]
    Resolved,
    /// Ticket closed
    #[serde(rename = "Closed")]
    Closed,
}

impl RequestStatus {
    /// Every status
    pub const ALL: [RequestStatus; 17] = [
        RequestStatus::PendingAdminApproval,
        RequestStatus::Pending,
        RequestStatus::AwaitingClientAction,
        RequestStatus::Processing,
        RequestStatus::InfoRequested,
        RequestStatus::NeedsInfo,
        RequestStatus::NeedsClarification,
        RequestStatus::EppCodeSent,
        RequestStatus::Approved,
        RequestStatus::Completed,
        RequestStatus::Rejected,
        RequestStatus::Failed,
        RequestStatus::CancelledByClient,
        RequestStatus::Open,
        RequestStatus::InProgress,
        RequestStatus::Resolved,
        RequestStatus::Closed,
    ];

    /// Display / wire string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingAdminApproval => "Pending Admin Approval",
            Self::Pending => "Pending",
            Self::AwaitingClientAction => "Awaiting Client Action",
            Self::Processing => "Processing",
            Self::InfoRequested => "Info Requested",
            Self::NeedsInfo => "Needs Info",
            Self::NeedsClarification => "Needs Clarification",
            Self::EppCodeSent => "EPP Code Sent",
            Self::Approved => "Approved",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
            Self::Failed => "Failed",
            Self::CancelledByClient => "Cancelled by Client",
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// Terminal statuses drop the item from pending views.
    ///
    /// `Approved` is final for the two-step request types; the backend
    /// promotes it to `Completed` when it applies the change.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Approved
                | Self::Completed
                | Self::Rejected
                | Self::Failed
                | Self::CancelledByClient
                | Self::Closed
                | Self::Resolved
        )
    }

    /// Statuses that mean the requested change was applied
    #[inline]
    #[must_use]
    pub const fn is_completion(self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }

    /// CSS-style badge class, e.g. `status-pending-admin-approval`
    #[must_use]
    pub fn badge_class(self) -> String {
        format!("status-{}", self.as_str().to_lowercase().replace(' ', "-"))
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

/// Registry key: ids are only unique within a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    /// Request type
    pub request_type: RequestType,
    /// Id within the type
    pub id: u64,
}

impl RequestKey {
    /// Create key
    #[inline]
    #[must_use]
    pub const fn new(request_type: RequestType, id: u64) -> Self {
        Self { request_type, id }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.request_type, self.id)
    }
}

/// Reply on a support ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketReply {
    pub id: u64,
    pub ticket_id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    pub author_username: String,
    pub author_role: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TicketReply {
    /// Whether an admin wrote this reply
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.author_role == "admin"
    }
}

/// A client-initiated action awaiting processing
///
/// `data_summary` and `requested_data` are type-specific payloads that the
/// sync and transition logic treats as opaque; they are only read for display
/// and for resolving invalidation targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    #[serde(rename = "requestType")]
    pub request_type: RequestType,
    pub status: RequestStatus,
    #[serde(rename = "userId")]
    pub owner_id: u64,
    #[serde(rename = "requester_username", default)]
    pub owner_username: Option<String>,
    #[serde(rename = "userName", default)]
    pub owner_name: Option<String>,
    #[serde(rename = "domainName", default)]
    pub domain_name: Option<String>,
    #[serde(rename = "domainId", default)]
    pub domain_id: Option<u64>,
    #[serde(rename = "invoiceId", default)]
    pub invoice_id: Option<u64>,
    #[serde(rename = "dataSummary", default)]
    pub data_summary: Value,
    #[serde(rename = "requestedData", default)]
    pub requested_data: Value,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(rename = "requestDate", default)]
    pub request_date: Option<String>,

    // Ticket-only fields
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(rename = "relatedDomainName", default)]
    pub related_domain_name: Option<String>,
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub replies: Vec<TicketReply>,
}

impl Request {
    /// Create a bare request with the given identity and status
    #[must_use]
    pub fn new(id: u64, request_type: RequestType, status: RequestStatus, owner_id: u64) -> Self {
        Self {
            id,
            request_type,
            status,
            owner_id,
            owner_username: None,
            owner_name: None,
            domain_name: None,
            domain_id: None,
            invoice_id: None,
            data_summary: Value::Object(Map::new()),
            requested_data: Value::Null,
            admin_notes: None,
            request_date: None,
            subject: None,
            message: None,
            priority: None,
            related_domain_name: None,
            last_updated: None,
            replies: Vec::new(),
        }
    }

    /// With domain name
    #[inline]
    #[must_use]
    pub fn with_domain(mut self, name: impl Into<String>) -> Self {
        self.domain_name = Some(name.into());
        self
    }

    /// With requester username
    #[inline]
    #[must_use]
    pub fn with_owner_username(mut self, username: impl Into<String>) -> Self {
        self.owner_username = Some(username.into());
        self
    }

    /// With a data summary entry
    #[must_use]
    pub fn with_summary(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !self.data_summary.is_object() {
            self.data_summary = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.data_summary {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// With a requested-data entry
    #[must_use]
    pub fn with_requested(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !self.requested_data.is_object() {
            self.requested_data = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.requested_data {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// With ticket subject and message
    #[must_use]
    pub fn with_ticket_text(mut self, subject: impl Into<String>, message: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self.message = Some(message.into());
        self
    }

    /// Registry key
    #[inline]
    #[must_use]
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.request_type, self.id)
    }

    /// Raw summary value
    #[inline]
    #[must_use]
    pub fn summary(&self, key: &str) -> Option<&Value> {
        self.data_summary.get(key).filter(|v| !v.is_null())
    }

    /// Summary value rendered as display text
    #[must_use]
    pub fn summary_text(&self, key: &str) -> Option<String> {
        self.summary(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Summary value as a tri-state flag
    #[inline]
    #[must_use]
    pub fn summary_flag(&self, key: &str) -> Option<bool> {
        self.summary(key).and_then(Value::as_bool)
    }

    /// Destination client of an internal transfer, once the backend resolved it
    #[must_use]
    pub fn transfer_target_id(&self) -> Option<u64> {
        self.requested_data
            .get("target_client_id")
            .and_then(Value::as_u64)
    }
}

/// Body of `PUT /requests/{path}/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
    pub admin_notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusUpdate {
    /// Create update with notes and no extra fields
    #[must_use]
    pub fn new(status: RequestStatus, admin_notes: impl Into<String>) -> Self {
        Self {
            status,
            admin_notes: admin_notes.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra field (e.g. `epp_code`)
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Response of `PUT /requests/{path}/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub item: Request,
}

/// Response of a ticket reply
#[derive(Debug, Clone, Deserialize)]
pub struct TicketReplyOutcome {
    #[serde(default)]
    pub message: Option<String>,
    pub reply: TicketReply,
    pub ticket_status: RequestStatus,
}
