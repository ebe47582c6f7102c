//! Status Transition Table
//!
//! Declarative per-type lifecycle data:
//! - allowed and pending status sets
//! - ordered rows mapping current statuses to admin actions
//! - card title and detail field layout
//! - views invalidated when a transition lands
//!
//! Everything here is `'static` data; [`TransitionTable`] is a thin lookup
//! over it.

use crate::error::ModelError;
use crate::request::{Request, RequestStatus, RequestType};
use serde_json::Value;

use RequestStatus as S;

/// Visual weight of an action button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonStyle {
    Success,
    Danger,
    Info,
    Warning,
}

impl ButtonStyle {
    /// Button class suffix
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Success => "btn-success",
            Self::Danger => "btn-danger",
            Self::Info => "btn-info",
            Self::Warning => "btn-warning",
        }
    }
}

/// What the admin is asked for before an action is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotePrompt {
    /// Optional free-text note
    Notes,
    /// Optional note plus optional EPP auth code
    NotesAndEppCode,
    /// Yes/no confirmation; the note is generated
    Confirm,
}

impl NotePrompt {
    /// Whether the prompt carries an EPP code input
    #[inline]
    #[must_use]
    pub const fn wants_epp_code(self) -> bool {
        matches!(self, Self::NotesAndEppCode)
    }
}

/// A button offered to the admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdminAction {
    pub label: &'static str,
    pub target: RequestStatus,
    pub style: ButtonStyle,
    pub prompt: NotePrompt,
}

const fn action(label: &'static str, target: RequestStatus, style: ButtonStyle) -> AdminAction {
    AdminAction {
        label,
        target,
        style,
        prompt: NotePrompt::Notes,
    }
}

const fn confirm(label: &'static str, target: RequestStatus, style: ButtonStyle) -> AdminAction {
    AdminAction {
        label,
        target,
        style,
        prompt: NotePrompt::Confirm,
    }
}

/// Actions offered while the request is in any of `from`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRow {
    pub from: &'static [RequestStatus],
    pub actions: &'static [AdminAction],
}

/// Where a card title takes its subject from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    /// The request's domain name
    DomainName,
    /// A `dataSummary` key
    Summary(&'static str),
    /// `Invoice <number>` from the summary
    InvoiceNumber,
    /// Ticket subject, falling back to `ID <id>`
    Subject,
}

/// How a detail line is derived from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Summary value as text, `N/A` when absent
    Text(&'static str),
    /// Summary value followed by ` year(s)`
    Years(&'static str),
    /// `Yes (<n> yr)` / `No` from `ssl_requested` and `ssl_duration`
    Ssl,
    /// Tri-state summary flag rendered with per-state wording
    Toggle {
        key: &'static str,
        on: &'static str,
        off: &'static str,
        unknown: &'static str,
    },
    /// Boolean summary flag rendered with two wordings
    Presence {
        key: &'static str,
        yes: &'static str,
        no: &'static str,
    },
    /// EPP code sent, from status or `epp_code_provided`
    EppSent,
    /// Summary amount formatted as dollars
    Money(&'static str),
    /// Current owner username and id
    FromClient,
    /// Resolved destination client name and id
    ToClient,
    /// Related domain of a ticket, hidden when absent
    RelatedDomain,
    /// First 80 characters of a ticket message
    MessagePreview,
}

/// A labelled detail line on a request card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub source: FieldSource,
}

const fn field(label: &'static str, source: FieldSource) -> DetailField {
    DetailField { label, source }
}

impl DetailField {
    /// Render the value for `request`; `None` hides the line
    #[must_use]
    pub fn render(&self, request: &Request) -> Option<String> {
        let na = || "N/A".to_string();
        let value = match self.source {
            FieldSource::Text(key) => request.summary_text(key).unwrap_or_else(na),
            FieldSource::Years(key) => {
                format!("{} year(s)", request.summary_text(key).unwrap_or_else(na))
            }
            FieldSource::Ssl => {
                if request.summary_flag("ssl_requested").unwrap_or(false) {
                    let years = request.summary_text("ssl_duration").unwrap_or_else(na);
                    format!("Yes ({years} yr)")
                } else {
                    "No".to_string()
                }
            }
            FieldSource::Toggle {
                key,
                on,
                off,
                unknown,
            } => match request.summary_flag(key) {
                Some(true) => on.to_string(),
                Some(false) => off.to_string(),
                None => unknown.to_string(),
            },
            FieldSource::Presence { key, yes, no } => {
                if request.summary_flag(key).unwrap_or(false) {
                    yes.to_string()
                } else {
                    no.to_string()
                }
            }
            FieldSource::EppSent => {
                let sent = request.status == S::EppCodeSent
                    || request.summary_flag("epp_code_provided").unwrap_or(false);
                let text = if sent { "Yes" } else { "No" };
                text.to_string()
            }
            FieldSource::Money(key) => {
                let amount = match request.summary(key) {
                    Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                    Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
                    _ => 0.0,
                };
                format!("${amount:.2}")
            }
            FieldSource::FromClient => format!(
                "{} (ID: {})",
                request
                    .summary_text("current_owner_username")
                    .unwrap_or_else(na),
                request.owner_id
            ),
            FieldSource::ToClient => format!(
                "{} (ID: {})",
                request.summary_text("target_client_name").unwrap_or_else(na),
                request
                    .transfer_target_id()
                    .map_or_else(na, |id| id.to_string())
            ),
            FieldSource::RelatedDomain => request.related_domain_name.clone()?,
            FieldSource::MessagePreview => match request.message.as_deref() {
                Some(message) => format!("{}...", message.chars().take(80).collect::<String>()),
                None => "No message preview.".to_string(),
            },
        };
        Some(value)
    }
}

/// A view that must be refreshed after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Invalidation {
    /// The pending list of the request's own type
    OwnPendingList,
    DashboardCounts,
    RecentPending,
    DomainList,
    ClientList,
    InvoiceList,
    /// Detail view of the client owning the request
    OwnerClientDetail,
    /// Detail view of the client receiving an internal transfer
    TargetClientDetail,
    TicketList,
    /// Detail view of the ticket itself
    TicketDetail,
}

/// When an invalidation applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every successful transition
    Always,
    /// Only when the resulting status is `Approved` or `Completed`
    OnCompletion,
}

/// Invalidation guarded by a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationRule {
    pub trigger: Trigger,
    pub target: Invalidation,
}

const fn always(target: Invalidation) -> InvalidationRule {
    InvalidationRule {
        trigger: Trigger::Always,
        target,
    }
}

const fn on_completion(target: Invalidation) -> InvalidationRule {
    InvalidationRule {
        trigger: Trigger::OnCompletion,
        target,
    }
}

/// Static description of one request type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub request_type: RequestType,
    pub title_prefix: &'static str,
    pub title_source: TitleSource,
    /// Whether the card leads with the requesting client
    pub shows_requester: bool,
    pub fields: &'static [DetailField],
    pub allowed_statuses: &'static [RequestStatus],
    pub pending_statuses: &'static [RequestStatus],
    pub rows: &'static [TransitionRow],
    pub invalidations: &'static [InvalidationRule],
}

impl TypeDescriptor {
    /// Card title for `request`
    #[must_use]
    pub fn title(&self, request: &Request) -> String {
        let subject = match self.title_source {
            TitleSource::DomainName => request
                .domain_name
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            TitleSource::Summary(key) => request
                .summary_text(key)
                .unwrap_or_else(|| "N/A".to_string()),
            TitleSource::InvoiceNumber => format!(
                "Invoice {}",
                request
                    .summary_text("invoice_number")
                    .unwrap_or_else(|| "N/A".to_string())
            ),
            TitleSource::Subject => request
                .subject
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("ID {}", request.id)),
        };
        format!("{}: {subject}", self.title_prefix)
    }

    /// Actions for a current status; empty when no row matches
    #[must_use]
    pub fn actions(&self, status: RequestStatus) -> &'static [AdminAction] {
        self.rows
            .iter()
            .find(|row| row.from.contains(&status))
            .map_or(&[], |row| row.actions)
    }

    /// Whether `status` belongs to this type's lifecycle
    #[inline]
    #[must_use]
    pub fn allows(&self, status: RequestStatus) -> bool {
        self.allowed_statuses.contains(&status)
    }

    /// Whether a request in `status` shows on the pending list
    #[inline]
    #[must_use]
    pub fn is_pending(&self, status: RequestStatus) -> bool {
        self.pending_statuses.contains(&status)
    }
}

// Shared status sets

const PENDING: &[RequestStatus] = &[S::PendingAdminApproval, S::Pending];

const TWO_STEP_ALLOWED: &[RequestStatus] =
    &[S::PendingAdminApproval, S::Pending, S::Approved, S::Completed, S::Rejected];

const TWO_STEP_ROWS: &[TransitionRow] = &[TransitionRow {
    from: PENDING,
    actions: &[
        action("Approve", S::Approved, ButtonStyle::Success),
        action("Reject", S::Rejected, ButtonStyle::Danger),
    ],
}];

const BASE_INVALIDATIONS: &[InvalidationRule] = &[
    always(Invalidation::OwnPendingList),
    always(Invalidation::DashboardCounts),
    always(Invalidation::RecentPending),
];

const DOMAIN_INVALIDATIONS: &[InvalidationRule] = &[
    always(Invalidation::OwnPendingList),
    always(Invalidation::DashboardCounts),
    always(Invalidation::RecentPending),
    on_completion(Invalidation::DomainList),
];

const SSL_FIELDS: &[DetailField] = &[
    field("Duration", FieldSource::Years("duration")),
    field("SSL", FieldSource::Ssl),
];

const REGISTER: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::Register,
    title_prefix: "Register",
    title_source: TitleSource::DomainName,
    shows_requester: true,
    fields: SSL_FIELDS,
    allowed_statuses: TWO_STEP_ALLOWED,
    pending_statuses: PENDING,
    rows: TWO_STEP_ROWS,
    invalidations: DOMAIN_INVALIDATIONS,
};

const RENEW: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::Renew,
    title_prefix: "Renew",
    ..REGISTER
};

const AUTO_RENEW_CHANGE: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::AutoRenewChange,
    title_prefix: "Auto-Renew",
    title_source: TitleSource::DomainName,
    shows_requester: true,
    fields: &[field(
        "Request to",
        FieldSource::Toggle {
            key: "requested_status",
            on: "Enable Auto-Renew",
            off: "Disable Auto-Renew",
            unknown: "Unknown Auto-Renew",
        },
    )],
    allowed_statuses: TWO_STEP_ALLOWED,
    pending_statuses: PENDING,
    rows: TWO_STEP_ROWS,
    invalidations: BASE_INVALIDATIONS,
};

const LOCK_CHANGE: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::LockChange,
    title_prefix: "Domain Lock",
    fields: &[field(
        "Request to",
        FieldSource::Toggle {
            key: "requested_lock_status",
            on: "Lock Domain",
            off: "Unlock Domain",
            unknown: "Unknown State",
        },
    )],
    ..AUTO_RENEW_CHANGE
};

const TRANSFER_IN: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::TransferIn,
    title_prefix: "Transfer-In",
    title_source: TitleSource::DomainName,
    shows_requester: true,
    fields: &[field(
        "Auth Code",
        FieldSource::Presence {
            key: "auth_code_provided",
            yes: "Provided by client",
            no: "Not Provided by client",
        },
    )],
    allowed_statuses: &[
        S::PendingAdminApproval,
        S::Pending,
        S::Processing,
        S::InfoRequested,
        S::Completed,
        S::Failed,
        S::Rejected,
    ],
    pending_statuses: &[S::PendingAdminApproval, S::Pending, S::Processing, S::InfoRequested],
    rows: &[
        TransitionRow {
            from: PENDING,
            actions: &[
                action("Start Transfer", S::Processing, ButtonStyle::Info),
                action("Request Info", S::InfoRequested, ButtonStyle::Warning),
                action("Reject", S::Rejected, ButtonStyle::Danger),
            ],
        },
        TransitionRow {
            from: &[S::Processing],
            actions: &[
                action("Mark Completed", S::Completed, ButtonStyle::Success),
                action("Mark Failed", S::Failed, ButtonStyle::Danger),
            ],
        },
        TransitionRow {
            from: &[S::InfoRequested],
            actions: &[
                action("Mark Completed", S::Completed, ButtonStyle::Success),
                action("Mark Failed", S::Failed, ButtonStyle::Danger),
                action("Resume Processing", S::Processing, ButtonStyle::Info),
            ],
        },
    ],
    invalidations: DOMAIN_INVALIDATIONS,
};

const TRANSFER_OUT: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::TransferOut,
    title_prefix: "Transfer-Out",
    title_source: TitleSource::DomainName,
    shows_requester: true,
    fields: &[
        field("Destination", FieldSource::Text("destination_info")),
        field("Reason", FieldSource::Text("reason")),
        field("EPP Sent", FieldSource::EppSent),
    ],
    allowed_statuses: &[
        S::PendingAdminApproval,
        S::Pending,
        S::AwaitingClientAction,
        S::EppCodeSent,
        S::Completed,
        S::CancelledByClient,
        S::Rejected,
    ],
    pending_statuses: &[
        S::PendingAdminApproval,
        S::Pending,
        S::AwaitingClientAction,
        S::EppCodeSent,
    ],
    rows: &[
        TransitionRow {
            from: &[S::PendingAdminApproval, S::Pending, S::AwaitingClientAction],
            actions: &[
                AdminAction {
                    label: "Send EPP",
                    target: S::EppCodeSent,
                    style: ButtonStyle::Info,
                    prompt: NotePrompt::NotesAndEppCode,
                },
                action("Reject", S::Rejected, ButtonStyle::Danger),
            ],
        },
        TransitionRow {
            from: &[S::EppCodeSent],
            actions: &[
                action("Mark Transferred", S::Completed, ButtonStyle::Success),
                action("Client Cancelled", S::CancelledByClient, ButtonStyle::Warning),
            ],
        },
    ],
    invalidations: DOMAIN_INVALIDATIONS,
};

const INTERNAL_TRANSFER: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::InternalTransferRequest,
    title_prefix: "Internal Transfer",
    title_source: TitleSource::Summary("domain_name"),
    shows_requester: false,
    fields: &[
        field("Domain", FieldSource::Text("domain_name")),
        field("From Client", FieldSource::FromClient),
        field("To Client (Identifier)", FieldSource::Text("target_client_identifier")),
        field("To Client (Resolved)", FieldSource::ToClient),
    ],
    allowed_statuses: TWO_STEP_ALLOWED,
    pending_statuses: PENDING,
    rows: TWO_STEP_ROWS,
    invalidations: &[
        always(Invalidation::OwnPendingList),
        always(Invalidation::DashboardCounts),
        always(Invalidation::RecentPending),
        on_completion(Invalidation::DomainList),
        on_completion(Invalidation::ClientList),
        on_completion(Invalidation::OwnerClientDetail),
        on_completion(Invalidation::TargetClientDetail),
    ],
};

const DNS_CHANGE: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::DnsChange,
    title_prefix: "DNS Change",
    title_source: TitleSource::DomainName,
    shows_requester: true,
    fields: &[field("Description", FieldSource::Text("change_description"))],
    allowed_statuses: &[
        S::PendingAdminApproval,
        S::Pending,
        S::NeedsInfo,
        S::Processing,
        S::Completed,
        S::Rejected,
    ],
    pending_statuses: &[S::PendingAdminApproval, S::Pending, S::NeedsInfo, S::Processing],
    rows: &[
        TransitionRow {
            from: PENDING,
            actions: &[
                action("Process", S::Processing, ButtonStyle::Info),
                action("Complete", S::Completed, ButtonStyle::Success),
                action("Reject", S::Rejected, ButtonStyle::Danger),
                action("Needs Info", S::NeedsInfo, ButtonStyle::Warning),
            ],
        },
        TransitionRow {
            from: &[S::NeedsInfo],
            actions: &[
                action("Process", S::Processing, ButtonStyle::Info),
                action("Complete", S::Completed, ButtonStyle::Success),
                action("Reject", S::Rejected, ButtonStyle::Danger),
            ],
        },
        TransitionRow {
            from: &[S::Processing],
            actions: &[
                action("Mark Completed", S::Completed, ButtonStyle::Success),
                action("Reject", S::Rejected, ButtonStyle::Danger),
            ],
        },
    ],
    invalidations: BASE_INVALIDATIONS,
};

const CONTACT_UPDATE: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::ContactUpdate,
    title_prefix: "Contact Update",
    title_source: TitleSource::DomainName,
    shows_requester: true,
    fields: &[field("Changes", FieldSource::Text("changes_description"))],
    allowed_statuses: &[
        S::PendingAdminApproval,
        S::Pending,
        S::NeedsClarification,
        S::Processing,
        S::Completed,
        S::Rejected,
    ],
    pending_statuses: &[
        S::PendingAdminApproval,
        S::Pending,
        S::NeedsClarification,
        S::Processing,
    ],
    rows: &[
        TransitionRow {
            from: PENDING,
            actions: &[
                action("Process", S::Processing, ButtonStyle::Info),
                action("Complete", S::Completed, ButtonStyle::Success),
                action("Reject", S::Rejected, ButtonStyle::Danger),
                action("Needs Clarification", S::NeedsClarification, ButtonStyle::Warning),
            ],
        },
        TransitionRow {
            from: &[S::NeedsClarification],
            actions: &[
                action("Process", S::Processing, ButtonStyle::Info),
                action("Complete", S::Completed, ButtonStyle::Success),
                action("Reject", S::Rejected, ButtonStyle::Danger),
            ],
        },
        TransitionRow {
            from: &[S::Processing],
            actions: &[
                action("Mark Completed", S::Completed, ButtonStyle::Success),
                action("Reject", S::Rejected, ButtonStyle::Danger),
            ],
        },
    ],
    invalidations: BASE_INVALIDATIONS,
};

const PAYMENT_PROOF: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::PaymentProof,
    title_prefix: "Payment Proof",
    title_source: TitleSource::InvoiceNumber,
    shows_requester: true,
    fields: &[
        field("Invoice Amount", FieldSource::Money("invoice_amount")),
        field("Client Notes", FieldSource::Text("payment_notes")),
    ],
    allowed_statuses: TWO_STEP_ALLOWED,
    pending_statuses: PENDING,
    rows: &[TransitionRow {
        from: PENDING,
        actions: &[
            action("Approve Payment", S::Approved, ButtonStyle::Success),
            action("Reject Proof", S::Rejected, ButtonStyle::Danger),
        ],
    }],
    invalidations: &[
        always(Invalidation::OwnPendingList),
        always(Invalidation::DashboardCounts),
        always(Invalidation::RecentPending),
        on_completion(Invalidation::InvoiceList),
        on_completion(Invalidation::OwnerClientDetail),
    ],
};

const SUPPORT_TICKET: TypeDescriptor = TypeDescriptor {
    request_type: RequestType::SupportTicket,
    title_prefix: "Ticket",
    title_source: TitleSource::Subject,
    shows_requester: true,
    fields: &[
        field("Related Domain", FieldSource::RelatedDomain),
        field("Message", FieldSource::MessagePreview),
    ],
    allowed_statuses: &[S::Open, S::InProgress, S::Resolved, S::Closed],
    pending_statuses: &[S::Open, S::InProgress],
    rows: &[
        TransitionRow {
            from: &[S::Open],
            actions: &[
                confirm("Mark In Progress", S::InProgress, ButtonStyle::Info),
                confirm("Mark Resolved", S::Resolved, ButtonStyle::Success),
                confirm("Close Ticket", S::Closed, ButtonStyle::Danger),
            ],
        },
        TransitionRow {
            from: &[S::InProgress],
            actions: &[
                confirm("Mark Resolved", S::Resolved, ButtonStyle::Success),
                confirm("Close Ticket", S::Closed, ButtonStyle::Danger),
            ],
        },
        TransitionRow {
            from: &[S::Resolved],
            actions: &[
                confirm("Close Ticket", S::Closed, ButtonStyle::Danger),
                confirm("Reopen Ticket", S::Open, ButtonStyle::Warning),
            ],
        },
        TransitionRow {
            from: &[S::Closed],
            actions: &[confirm("Reopen Ticket", S::Open, ButtonStyle::Warning)],
        },
    ],
    invalidations: &[
        always(Invalidation::OwnPendingList),
        always(Invalidation::DashboardCounts),
        always(Invalidation::RecentPending),
        always(Invalidation::TicketList),
        always(Invalidation::TicketDetail),
    ],
};

static DESCRIPTORS: [TypeDescriptor; 11] = [
    REGISTER,
    RENEW,
    AUTO_RENEW_CHANGE,
    LOCK_CHANGE,
    TRANSFER_IN,
    TRANSFER_OUT,
    INTERNAL_TRANSFER,
    DNS_CHANGE,
    CONTACT_UPDATE,
    PAYMENT_PROOF,
    SUPPORT_TICKET,
];

/// Lookup over the static per-type descriptors
#[derive(Debug, Clone, Copy)]
pub struct TransitionTable {
    descriptors: &'static [TypeDescriptor],
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TransitionTable {
    /// The platform's lifecycle table
    #[must_use]
    pub fn standard() -> Self {
        Self {
            descriptors: &DESCRIPTORS,
        }
    }

    /// Descriptor for a type
    #[must_use]
    pub fn descriptor(&self, request_type: RequestType) -> &'static TypeDescriptor {
        // indexed in declaration order of `RequestType`
        &self.descriptors[request_type as usize]
    }

    /// Admin actions for a type in a status; empty for terminal or unknown states
    #[must_use]
    pub fn actions(&self, request_type: RequestType, status: RequestStatus) -> &'static [AdminAction] {
        self.descriptor(request_type).actions(status)
    }

    /// Find the action that moves `from` to `target`
    #[must_use]
    pub fn action_for(
        &self,
        request_type: RequestType,
        from: RequestStatus,
        target: RequestStatus,
    ) -> Option<&'static AdminAction> {
        self.actions(request_type, from)
            .iter()
            .find(|a| a.target == target)
    }

    /// Whether a status is in the type's allowed set
    #[must_use]
    pub fn is_allowed_status(&self, request_type: RequestType, status: RequestStatus) -> bool {
        self.descriptor(request_type).allows(status)
    }

    /// Check a status against the type's allowed set
    ///
    /// # Errors
    /// [`ModelError::StatusNotAllowed`] when the status is outside the set.
    pub fn validate_status(
        &self,
        request_type: RequestType,
        status: RequestStatus,
    ) -> Result<(), ModelError> {
        if self.is_allowed_status(request_type, status) {
            Ok(())
        } else {
            Err(ModelError::StatusNotAllowed {
                request_type,
                status,
            })
        }
    }

    /// Views to refresh after a transition of `request_type` into `resulting`
    #[must_use]
    pub fn invalidations(
        &self,
        request_type: RequestType,
        resulting: RequestStatus,
    ) -> Vec<Invalidation> {
        self.descriptor(request_type)
            .invalidations
            .iter()
            .filter(|rule| match rule.trigger {
                Trigger::Always => true,
                Trigger::OnCompletion => resulting.is_completion(),
            })
            .map(|rule| rule.target)
            .collect()
    }
}
