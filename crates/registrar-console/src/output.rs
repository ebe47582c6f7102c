//! Plain-text rendering of view models

use registrar_model::ErrorReport;
use registrar_sync::views::{
    Counter, InvoiceRow, ListView, NotificationBadge, NotificationList, RequestCard,
    TicketDetailView,
};
use registrar_sync::DispatchOutcome;
use std::fmt::Write;

/// Counters as aligned `label: value` lines
#[must_use]
pub fn counters(counters: &[Counter]) -> String {
    let width = counters.iter().map(|c| c.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for counter in counters {
        let _ = writeln!(out, "{:<width$}  {}", format!("{}:", counter.label), counter.value, width = width + 1);
    }
    out
}

/// One card as an indented block
#[must_use]
pub fn card(card: &RequestCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", card.card_id, card.title);
    if let Some(requester) = &card.requester {
        let _ = writeln!(out, "    Requester: {requester}");
    }
    if let Some(requested) = &card.requested {
        let _ = writeln!(out, "    Requested: {requested}");
    }
    for (label, value) in &card.fields {
        let _ = writeln!(out, "    {label}: {value}");
    }
    let _ = writeln!(out, "    Status: {}", card.status);
    if let Some(notes) = &card.admin_notes {
        let _ = writeln!(out, "    Admin notes: {notes}");
    }
    if !card.buttons.is_empty() {
        let labels: Vec<&str> = card.buttons.iter().map(|b| b.label.as_str()).collect();
        let busy = if card.buttons.iter().all(|b| b.disabled) { " (busy)" } else { "" };
        let _ = writeln!(out, "    Actions: {}{busy}", labels.join(" | "));
    }
    out
}

/// A card list, or its placeholder
#[must_use]
pub fn list(view: &ListView) -> String {
    match view {
        ListView::Empty(placeholder) => format!("{placeholder}\n"),
        ListView::Cards(cards) => cards.iter().map(card).collect::<Vec<_>>().join("\n"),
    }
}

/// Invoice table
#[must_use]
pub fn invoices(rows: &[InvoiceRow]) -> String {
    if rows.is_empty() {
        return "No invoices.\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let _ = write!(
            out,
            "#{} {}  {}  {}  {}  issued {}  due {}  {}",
            row.invoice_id,
            row.invoice_number,
            row.client,
            row.domain,
            row.amount,
            row.issue_date,
            row.due_date,
            row.status,
        );
        if let Some(label) = &row.paid_label {
            let _ = write!(out, "  ({label})");
        } else if !row.buttons.is_empty() {
            let labels: Vec<&str> = row.buttons.iter().map(|b| b.label.as_str()).collect();
            let _ = write!(out, "  [{}]", labels.join(" | "));
        }
        out.push('\n');
    }
    out
}

/// Ticket with its thread
#[must_use]
pub fn ticket(view: &TicketDetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ticket #{}: {}", view.ticket_id, view.subject);
    let _ = writeln!(out, "Status: {}  Priority: {}", view.status, view.priority);
    if let Some(domain) = &view.related_domain {
        let _ = writeln!(out, "Domain: {domain}");
    }
    let _ = writeln!(out, "\n{}\n", view.message);
    for reply in &view.replies {
        let marker = if reply.from_admin { ">" } else { "<" };
        let _ = writeln!(out, "{marker} {} {}", reply.author, reply.timestamp);
        let _ = writeln!(out, "  {}", reply.message);
    }
    if !view.buttons.is_empty() {
        let labels: Vec<&str> = view.buttons.iter().map(|b| b.label.as_str()).collect();
        let _ = writeln!(out, "Actions: {}", labels.join(" | "));
    }
    if !view.can_reply {
        out.push_str("Replies are closed.\n");
    }
    out
}

/// Badge line followed by the panel rows
#[must_use]
pub fn notifications(badge: &NotificationBadge, panel: &NotificationList) -> String {
    let mut out = format!("Unread: {}\n", badge.text.as_deref().unwrap_or("0"));
    match panel {
        NotificationList::Empty(placeholder) => {
            let _ = writeln!(out, "{placeholder}");
        }
        NotificationList::Items(rows) => {
            for row in rows {
                let flag = if row.unread { '*' } else { ' ' };
                let _ = write!(out, "{flag} {:>4}  [{}] {}", row.id, row.icon, row.message);
                if !row.timestamp.is_empty() {
                    let _ = write!(out, "  ({})", row.timestamp);
                }
                out.push('\n');
            }
        }
    }
    out
}

/// Summary of an applied status change
#[must_use]
pub fn outcome(outcome: &DispatchOutcome) -> String {
    let mut out = format!(
        "{} #{} is now {}",
        outcome.request.request_type.display_name(),
        outcome.request.id,
        outcome.request.status
    );
    if outcome.removed_from_pending {
        out.push_str(" (removed from pending)");
    }
    out.push('\n');
    for scope in &outcome.failed_refreshes {
        let _ = writeln!(out, "warning: could not refresh {scope}");
    }
    out
}

/// Error report with its field errors
#[must_use]
pub fn error_report(report: &ErrorReport) -> String {
    let mut out = if report.status == 0 {
        format!("error: {}\n", report.message)
    } else {
        format!("error ({}): {}\n", report.status, report.message)
    };
    for (field, messages) in &report.errors {
        for message in messages {
            let _ = writeln!(out, "  {field}: {message}");
        }
    }
    out
}
