//! Executing parsed commands against a session

use crate::cli::Action;
use crate::output;
use anyhow::Context;
use registrar_model::{ErrorReport, RequestStatus, RequestType};
use registrar_sync::{views, DispatchOutcome, NoteForm, RefreshScope, Session};
use serde_json::{Map, Value};
use std::future::Future;
use std::io::Write;

fn failed(report: &ErrorReport) -> anyhow::Error {
    anyhow::anyhow!(output::error_report(report).trim_end().to_string())
}

/// Run one command, writing human readable output to `out`
///
/// # Errors
/// Backend failures are returned with their rendered error report.
pub async fn run<W: Write>(session: &Session, action: Action, out: &mut W) -> anyhow::Result<()> {
    match action {
        Action::Summary => summary(session, out).await,
        Action::Pending(request_type) => {
            let scope = RefreshScope::PendingList(request_type);
            session
                .enter_section(scope)
                .await
                .with_context(|| format!("loading {scope}"))?;
            let in_flight = session.dispatcher().in_flight_keys();
            let view = views::pending_list(session.registry(), request_type, &in_flight);
            write!(out, "{}", output::list(&view))?;
            Ok(())
        }
        Action::SetStatus {
            request_type,
            id,
            status,
            notes,
            epp_code,
        } => {
            let result = set_status(session, request_type, id, status, &notes, epp_code).await?;
            write!(out, "{}", output::outcome(&result))?;
            Ok(())
        }
        Action::Invoices => {
            session
                .enter_section(RefreshScope::InvoiceList)
                .await
                .context("loading invoices")?;
            let dispatcher = session.dispatcher();
            let rows: Vec<_> = session
                .registry()
                .invoices()
                .iter()
                .map(|invoice| views::invoice_row(invoice, dispatcher.is_invoice_in_flight(invoice.id)))
                .collect();
            write!(out, "{}", output::invoices(&rows))?;
            Ok(())
        }
        Action::MarkPaid(id) => {
            let invoice = session
                .dispatcher()
                .mark_invoice_paid(id)
                .await
                .map_err(|err| failed(&err.report()))?;
            writeln!(out, "Invoice {} is now {}", invoice.invoice_number, invoice.status)?;
            Ok(())
        }
        Action::CancelInvoice(id) => {
            let invoice = session
                .dispatcher()
                .cancel_invoice(id)
                .await
                .map_err(|err| failed(&err.report()))?;
            writeln!(out, "Invoice {} is now {}", invoice.invoice_number, invoice.status)?;
            Ok(())
        }
        Action::Tickets => {
            session
                .enter_section(RefreshScope::TicketList)
                .await
                .context("loading tickets")?;
            let tickets = session.registry().tickets();
            if tickets.is_empty() {
                writeln!(out, "No support tickets.")?;
                return Ok(());
            }
            let table = session.registry().table();
            let cards: Vec<_> = tickets
                .iter()
                .map(|t| views::request_card(t, table, session.dispatcher().is_in_flight(t.key()), false))
                .collect();
            write!(out, "{}", output::list(&views::ListView::Cards(cards)))?;
            Ok(())
        }
        Action::Ticket(id) => show_ticket(session, id, out).await,
        Action::Reply { id, message } => {
            session
                .enter_section(RefreshScope::TicketDetail(id))
                .await
                .with_context(|| format!("loading ticket #{id}"))?;
            session
                .dispatcher()
                .reply_to_ticket(id, &message)
                .await
                .map_err(|err| failed(&err.report()))?;
            show_ticket(session, id, out).await
        }
        Action::Notifications { .. } => {
            let center = session.notifications();
            center.open_panel().await.map_err(|err| failed(&err.report()))?;
            print_notifications(session, out)
        }
        Action::MarkRead(target) => {
            let center = session.notifications();
            center.fetch().await.map_err(|err| failed(&err.report()))?;
            match target {
                Some(id) => {
                    let link = center.mark_read(id).await.map_err(|err| failed(&err.report()))?;
                    match link {
                        Some(link) => writeln!(out, "Marked #{id} read ({link})")?,
                        None => writeln!(out, "Marked #{id} read")?,
                    }
                }
                None => {
                    center.mark_all_read().await.map_err(|err| failed(&err.report()))?;
                    writeln!(out, "All notifications marked read")?;
                }
            }
            writeln!(out, "Unread: {}", center.unread_count())?;
            Ok(())
        }
        Action::Logout => {
            session.logout().await.map_err(|err| failed(&err.report()))?;
            writeln!(out, "Logged out")?;
            Ok(())
        }
    }
}

async fn summary<W: Write>(session: &Session, out: &mut W) -> anyhow::Result<()> {
    // counters fall back to N/A when the summary cannot be loaded
    if let Err(err) = session.enter_section(RefreshScope::DashboardCounts).await {
        tracing::warn!(error = %err, "dashboard summary unavailable");
    }
    let counters = views::dashboard_counters(session.registry().summary().as_ref());
    write!(out, "{}", output::counters(&counters))?;

    session
        .enter_section(RefreshScope::RecentPending)
        .await
        .context("loading recent pending requests")?;
    let in_flight = session.dispatcher().in_flight_keys();
    writeln!(out, "\nRecent pending requests:")?;
    let overview = views::recent_overview(session.registry(), &in_flight, session.config().overview_limit);
    write!(out, "{}", output::list(&overview))?;
    Ok(())
}

/// Status change through the same form a button would open when the move
/// is one of the listed actions; otherwise a direct dispatch
async fn set_status(
    session: &Session,
    request_type: RequestType,
    id: u64,
    status: RequestStatus,
    notes: &str,
    epp_code: Option<String>,
) -> anyhow::Result<DispatchOutcome> {
    let scope = RefreshScope::PendingList(request_type);
    session
        .enter_section(scope)
        .await
        .with_context(|| format!("loading {scope}"))?;

    let registry = session.registry();
    let action = registry.find_by_id(request_type, id).and_then(|request| {
        registry
            .table()
            .action_for(request_type, request.status, status)
            .map(|action| NoteForm::for_action(&request, action))
    });

    let result = match action {
        Some(form) => {
            let mut form = form.with_notes(notes);
            if let Some(code) = epp_code {
                form = form.with_epp_code(code);
            }
            session.dispatcher().submit_note_form(&form).await
        }
        None => {
            tracing::debug!(%request_type, id, %status, "no listed action, dispatching directly");
            let mut extra = Map::new();
            if let Some(code) = epp_code.filter(|c| !c.trim().is_empty()) {
                extra.insert("epp_code".to_string(), Value::String(code.trim().to_string()));
            }
            session
                .dispatcher()
                .dispatch(id, request_type, status, notes.trim(), extra)
                .await
        }
    };
    result.map_err(|err| failed(&err.report()))
}

async fn show_ticket<W: Write>(session: &Session, id: u64, out: &mut W) -> anyhow::Result<()> {
    let scope = RefreshScope::TicketDetail(id);
    session
        .enter_section(scope)
        .await
        .with_context(|| format!("loading ticket #{id}"))?;
    let ticket = session
        .registry()
        .ticket_detail()
        .with_context(|| format!("ticket #{id} not found"))?;
    let busy = session.dispatcher().is_in_flight(ticket.key());
    let view = views::ticket_detail(&ticket, session.registry().table(), busy);
    write!(out, "{}", output::ticket(&view))?;
    session.leave_section(scope);
    Ok(())
}

fn print_notifications<W: Write>(session: &Session, out: &mut W) -> anyhow::Result<()> {
    let center = session.notifications();
    let badge = views::notification_badge(center.unread_count());
    let state = center.snapshot();
    let text = output::notifications(&badge, &views::notification_items(&state.items));
    write!(out, "{text}")?;
    Ok(())
}

/// Print notifications, then again on every change until `shutdown`
/// resolves
///
/// # Errors
/// Fails when the initial load fails or output cannot be written.
pub async fn watch_notifications<W, F>(session: &Session, out: &mut W, shutdown: F) -> anyhow::Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    let center = session.notifications();
    let mut changes = center.watch();
    center.open_panel().await.map_err(|err| failed(&err.report()))?;
    let _ = changes.borrow_and_update();
    print_notifications(session, out)?;
    out.flush()?;

    session.start_polling();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let _ = changes.borrow_and_update();
                writeln!(out)?;
                print_notifications(session, out)?;
                out.flush()?;
            }
        }
    }
    session.poller().stop().await;
    center.close_panel();
    Ok(())
}
