//! Pure view models
//!
//! Every function here is a pure function of registry state and the
//! transition table. Nothing reads back from rendered output.

use crate::registry::RequestRegistry;
use registrar_model::{
    ButtonStyle, DashboardSummary, Invoice, Notification, NotePrompt, Request, RequestKey,
    RequestStatus, RequestType, TicketReply, TransitionTable,
};

/// Placeholder when the counters could not be loaded
pub const MISSING_COUNT: &str = "N/A";

/// A button on a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    /// Status the button moves to; `None` for navigation buttons
    pub target: Option<RequestStatus>,
    pub style: ButtonStyle,
    pub prompt: Option<NotePrompt>,
    pub disabled: bool,
}

/// One request as a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCard {
    pub card_id: String,
    pub key: RequestKey,
    pub title: String,
    pub requester: Option<String>,
    pub requested: Option<String>,
    pub fields: Vec<(String, String)>,
    pub status: RequestStatus,
    pub status_class: String,
    pub admin_notes: Option<String>,
    pub buttons: Vec<ActionButton>,
}

impl RequestCard {
    /// Labels of the status buttons, in order
    #[must_use]
    pub fn transition_labels(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .filter(|b| b.target.is_some())
            .map(|b| b.label.as_str())
            .collect()
    }
}

/// Render a request card
///
/// Status buttons are exactly the table's actions for the current status.
/// While an action on the request is in flight every button is disabled.
#[must_use]
pub fn request_card(request: &Request, table: &TransitionTable, in_flight: bool, overview: bool) -> RequestCard {
    let descriptor = table.descriptor(request.request_type);
    let card_id = format!(
        "request-card-{}{}-{}",
        if overview { "overview-" } else { "" },
        request.request_type.slug(),
        request.id
    );

    let requester = descriptor.shows_requester.then(|| {
        let who = request
            .owner_username
            .as_deref()
            .or(request.owner_name.as_deref())
            .unwrap_or("N/A");
        format!("{who} (ID: {})", request.owner_id)
    });

    let fields = descriptor
        .fields
        .iter()
        .filter_map(|field| field.render(request).map(|value| (field.label.to_string(), value)))
        .collect();

    let mut buttons: Vec<ActionButton> = descriptor
        .actions(request.status)
        .iter()
        .map(|action| ActionButton {
            label: action.label.to_string(),
            target: Some(action.target),
            style: action.style,
            prompt: Some(action.prompt),
            disabled: in_flight,
        })
        .collect();
    if request.request_type == RequestType::SupportTicket {
        buttons.push(ActionButton {
            label: "View Ticket".to_string(),
            target: None,
            style: ButtonStyle::Info,
            prompt: None,
            disabled: in_flight,
        });
    }

    RequestCard {
        card_id,
        key: request.key(),
        title: descriptor.title(request),
        requester,
        requested: request.request_date.clone(),
        fields,
        status: request.status,
        status_class: request.status.badge_class(),
        admin_notes: request.admin_notes.clone().filter(|n| !n.trim().is_empty()),
        buttons,
    }
}

/// A pending list: cards or a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Cards(Vec<RequestCard>),
    Empty(String),
}

impl ListView {
    #[must_use]
    pub fn cards(&self) -> &[RequestCard] {
        match self {
            Self::Cards(cards) => cards,
            Self::Empty(_) => &[],
        }
    }

    /// Find a card by request id
    #[must_use]
    pub fn card(&self, id: u64) -> Option<&RequestCard> {
        self.cards().iter().find(|c| c.key.id == id)
    }
}

/// Render the pending list for `request_type`
#[must_use]
pub fn pending_list(
    registry: &RequestRegistry,
    request_type: RequestType,
    in_flight: &[RequestKey],
) -> ListView {
    let items = registry.get(request_type);
    if items.is_empty() {
        return ListView::Empty(format!(
            "No pending {} requests.",
            request_type.category_label()
        ));
    }
    ListView::Cards(
        items
            .iter()
            .map(|r| request_card(r, registry.table(), in_flight.contains(&r.key()), false))
            .collect(),
    )
}

/// Dashboard overview of the most recent pending requests, at most `limit`
/// cards
#[must_use]
pub fn recent_overview(registry: &RequestRegistry, in_flight: &[RequestKey], limit: usize) -> ListView {
    let items = registry.recent();
    if items.is_empty() {
        return ListView::Empty("No recent pending requests.".to_string());
    }
    ListView::Cards(
        items
            .iter()
            .take(limit)
            .map(|r| request_card(r, registry.table(), in_flight.contains(&r.key()), true))
            .collect(),
    )
}

/// Labelled dashboard counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub label: &'static str,
    pub value: String,
}

/// Dashboard counters; `N/A` where the summary is missing a value or was
/// never loaded
#[must_use]
pub fn dashboard_counters(summary: Option<&DashboardSummary>) -> Vec<Counter> {
    let fallback = DashboardSummary::default();
    summary
        .unwrap_or(&fallback)
        .entries()
        .into_iter()
        .map(|(label, value)| Counter {
            label,
            value: value.map_or_else(|| MISSING_COUNT.to_string(), |v| v.to_string()),
        })
        .collect()
}

/// Invoice table row
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub invoice_id: u64,
    pub invoice_number: String,
    pub client: String,
    pub domain: String,
    pub amount: String,
    pub issue_date: String,
    pub due_date: String,
    pub status: String,
    pub buttons: Vec<ActionButton>,
    pub paid_label: Option<String>,
}

/// Render one invoice row
///
/// Paid invoices carry a "Paid on" label instead of buttons.
#[must_use]
pub fn invoice_row(invoice: &Invoice, in_flight: bool) -> InvoiceRow {
    let date = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "N/A".to_string(), |d| d.to_string());

    let mut buttons = Vec::new();
    if invoice.status.can_mark_paid() {
        buttons.push(ActionButton {
            label: "Mark Paid".to_string(),
            target: None,
            style: ButtonStyle::Success,
            prompt: Some(NotePrompt::Confirm),
            disabled: in_flight,
        });
    }
    if invoice.status.can_cancel() {
        buttons.push(ActionButton {
            label: "Cancel".to_string(),
            target: None,
            style: ButtonStyle::Danger,
            prompt: Some(NotePrompt::Confirm),
            disabled: in_flight,
        });
    }

    let paid_label = (invoice.status == registrar_model::InvoiceStatus::Paid)
        .then(|| format!("Paid on {}", date(invoice.payment_date)));

    InvoiceRow {
        invoice_id: invoice.id,
        invoice_number: invoice.invoice_number.clone(),
        client: invoice
            .client_username
            .clone()
            .or_else(|| invoice.client_name.clone())
            .unwrap_or_else(|| format!("User {}", invoice.user_id)),
        domain: invoice.domain_name.clone().unwrap_or_else(|| "N/A".to_string()),
        amount: format!("${:.2}", invoice.amount),
        issue_date: date(invoice.issue_date),
        due_date: date(invoice.due_date),
        status: invoice.status.to_string(),
        buttons,
        paid_label,
    }
}

/// One reply in the ticket thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyView {
    pub author: String,
    pub from_admin: bool,
    pub message: String,
    pub timestamp: String,
}

/// Ticket detail modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDetailView {
    pub ticket_id: u64,
    pub subject: String,
    pub status: RequestStatus,
    pub status_class: String,
    pub priority: String,
    pub related_domain: Option<String>,
    pub message: String,
    pub replies: Vec<ReplyView>,
    pub buttons: Vec<ActionButton>,
    pub can_reply: bool,
}

fn reply_view(reply: &TicketReply) -> ReplyView {
    ReplyView {
        author: format!("{} ({})", reply.author_username, reply.author_role),
        from_admin: reply.is_admin(),
        message: reply.message.clone(),
        timestamp: reply.timestamp.clone().unwrap_or_default(),
    }
}

/// Render the ticket detail modal
#[must_use]
pub fn ticket_detail(ticket: &Request, table: &TransitionTable, in_flight: bool) -> TicketDetailView {
    let buttons = table
        .actions(RequestType::SupportTicket, ticket.status)
        .iter()
        .map(|action| ActionButton {
            label: action.label.to_string(),
            target: Some(action.target),
            style: action.style,
            prompt: Some(action.prompt),
            disabled: in_flight,
        })
        .collect();

    TicketDetailView {
        ticket_id: ticket.id,
        subject: ticket.subject.clone().unwrap_or_else(|| "(no subject)".to_string()),
        status: ticket.status,
        status_class: ticket.status.badge_class(),
        priority: ticket.priority.clone().unwrap_or_else(|| "Medium".to_string()),
        related_domain: ticket.related_domain_name.clone(),
        message: ticket.message.clone().unwrap_or_default(),
        replies: ticket.replies.iter().map(reply_view).collect(),
        buttons,
        can_reply: ticket.status != RequestStatus::Closed,
    }
}

/// Bell badge; hidden at zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBadge {
    pub text: Option<String>,
}

impl NotificationBadge {
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.text.is_some()
    }
}

#[must_use]
pub fn notification_badge(unread_count: u64) -> NotificationBadge {
    let text = match unread_count {
        0 => None,
        1..=9 => Some(unread_count.to_string()),
        _ => Some("9+".to_string()),
    };
    NotificationBadge { text }
}

/// One row of the notification panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItemView {
    pub id: u64,
    pub message: String,
    pub icon: &'static str,
    pub unread: bool,
    pub timestamp: String,
    pub link: Option<String>,
}

/// Notification panel: rows or a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationList {
    Items(Vec<NotificationItemView>),
    Empty(String),
}

impl NotificationList {
    #[must_use]
    pub fn items(&self) -> &[NotificationItemView] {
        match self {
            Self::Items(items) => items,
            Self::Empty(_) => &[],
        }
    }
}

/// Panel rows, or a placeholder when there are none
#[must_use]
pub fn notification_items(items: &[Notification]) -> NotificationList {
    if items.is_empty() {
        return NotificationList::Empty("No notifications.".to_string());
    }
    NotificationList::Items(
        items
            .iter()
            .map(|n| NotificationItemView {
                id: n.id,
                message: n.message.clone(),
                icon: n.kind().icon(),
                unread: !n.is_read,
                timestamp: n.timestamp.clone().unwrap_or_default(),
                link: n.link.clone(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use registrar_model::InvoiceStatus;

    fn register(id: u64) -> Request {
        Request::new(id, RequestType::Register, RequestStatus::PendingAdminApproval, 3)
            .with_domain("example.com")
            .with_owner_username("alice")
            .with_summary("years", 2)
    }

    #[test]
    fn card_buttons_follow_table() {
        let table = TransitionTable::standard();
        let card = request_card(&register(42), &table, false, false);
        assert_eq!(card.card_id, "request-card-register-42");
        assert_eq!(card.transition_labels(), vec!["Approve", "Reject"]);
        assert_eq!(card.requester.as_deref(), Some("alice (ID: 3)"));
        assert!(card.buttons.iter().all(|b| !b.disabled));

        let busy = request_card(&register(42), &table, true, true);
        assert_eq!(busy.card_id, "request-card-overview-register-42");
        assert!(busy.buttons.iter().all(|b| b.disabled));
    }

    #[test]
    fn ticket_card_adds_view_button() {
        let table = TransitionTable::standard();
        let ticket = Request::new(8, RequestType::SupportTicket, RequestStatus::Open, 3)
            .with_ticket_text("Help", "DNS broken");
        let card = request_card(&ticket, &table, false, false);
        assert_eq!(card.buttons.last().map(|b| b.label.as_str()), Some("View Ticket"));
        assert_eq!(
            card.transition_labels().len(),
            table.actions(RequestType::SupportTicket, RequestStatus::Open).len()
        );
    }

    #[test]
    fn empty_pending_list_placeholder() {
        let registry = RequestRegistry::new(TransitionTable::standard());
        assert_eq!(
            pending_list(&registry, RequestType::DnsChange, &[]),
            ListView::Empty("No pending dns changes requests.".to_string())
        );
    }

    #[test]
    fn overview_honours_configured_limit() {
        let registry = RequestRegistry::new(TransitionTable::standard());
        registry.set_recent((1..=8).map(register).collect()).unwrap();
        assert_eq!(recent_overview(&registry, &[], 10).cards().len(), 8);
        assert_eq!(recent_overview(&registry, &[], 3).cards().len(), 3);
        assert_eq!(
            recent_overview(&registry, &[], 7).cards()[6].card_id,
            "request-card-overview-register-7"
        );
    }

    #[test]
    fn counters_fall_back_to_na() {
        let counters = dashboard_counters(None);
        assert!(counters.iter().all(|c| c.value == MISSING_COUNT));

        let summary = DashboardSummary {
            pending_registrations: Some(4),
            ..DashboardSummary::default()
        };
        let counters = dashboard_counters(Some(&summary));
        assert_eq!(counters[0], Counter { label: "Pending Registrations", value: "4".into() });
        assert_eq!(counters[1].value, MISSING_COUNT);
    }

    #[test]
    fn paid_invoice_shows_label_not_buttons() {
        let invoice = Invoice {
            id: 7,
            invoice_number: "INV-7".into(),
            user_id: 3,
            client_name: None,
            client_username: Some("alice".into()),
            domain_name: Some("example.com".into()),
            description: "Registration".into(),
            amount: 12.5,
            issue_date: None,
            due_date: None,
            status: InvoiceStatus::PendingPayment,
            payment_date: None,
            notes: None,
        };
        let row = invoice_row(&invoice, false);
        let labels: Vec<_> = row.buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Mark Paid", "Cancel"]);
        assert_eq!(row.amount, "$12.50");
        assert!(row.paid_label.is_none());

        let paid = Invoice {
            status: InvoiceStatus::Paid,
            payment_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
            ..invoice
        };
        let row = invoice_row(&paid, false);
        assert!(row.buttons.is_empty());
        assert_eq!(row.paid_label.as_deref(), Some("Paid on 2024-05-01"));
    }

    #[test]
    fn badge_caps_at_nine() {
        assert!(!notification_badge(0).is_visible());
        assert_eq!(notification_badge(9).text.as_deref(), Some("9"));
        assert_eq!(notification_badge(10).text.as_deref(), Some("9+"));
    }

    #[test]
    fn notification_rows() {
        let empty = notification_items(&[]);
        assert_eq!(empty, NotificationList::Empty("No notifications.".to_string()));
        assert!(empty.items().is_empty());
        let panel = notification_items(&[Notification {
            id: 1,
            message: "Your request was approved".into(),
            notification_type: Some("request_update".into()),
            is_read: false,
            timestamp: None,
            link: None,
        }]);
        let rows = panel.items();
        assert_eq!(rows[0].icon, "CheckCircle2");
        assert!(rows[0].unread);
    }

    #[test]
    fn closed_ticket_cannot_be_replied_to() {
        let table = TransitionTable::standard();
        let ticket = Request::new(8, RequestType::SupportTicket, RequestStatus::Closed, 3);
        let view = ticket_detail(&ticket, &table, false);
        assert!(!view.can_reply);
        assert_eq!(view.buttons.len(), table.actions(RequestType::SupportTicket, RequestStatus::Closed).len());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn any_type() -> impl Strategy<Value = RequestType> {
            (0..RequestType::ALL.len()).prop_map(|i| RequestType::ALL[i])
        }

        fn any_status() -> impl Strategy<Value = RequestStatus> {
            (0..RequestStatus::ALL.len()).prop_map(|i| RequestStatus::ALL[i])
        }

        proptest! {
            #[test]
            fn card_buttons_mirror_the_table(t in any_type(), s in any_status(), busy in any::<bool>()) {
                let table = TransitionTable::standard();
                let request = Request::new(1, t, s, 3);
                let card = request_card(&request, &table, busy, false);

                let targets: Vec<RequestStatus> = card.buttons.iter().filter_map(|b| b.target).collect();
                let expected: Vec<RequestStatus> = table.actions(t, s).iter().map(|a| a.target).collect();
                prop_assert_eq!(targets, expected);
                if busy {
                    prop_assert!(card.buttons.iter().all(|b| b.disabled));
                }
            }

            #[test]
            fn badge_caps_at_nine(count in 0u64..1000) {
                let badge = notification_badge(count);
                prop_assert_eq!(badge.is_visible(), count > 0);
                if count > 9 {
                    prop_assert_eq!(badge.text.as_deref(), Some("9+"));
                }
            }
        }
    }
}
