//! Admin actions end to end over the scripted backend

use pretty_assertions::assert_eq;
use registrar_model::{ApiError, InvoiceStatus, RequestStatus, RequestType};
use registrar_sync::views::{self, ListView};
use registrar_sync::{DispatchError, NoteForm, RefreshScope, ScopeFilter, SyncEvent};
use registrar_test_utils::{
    client, invoice, pending_request, register_request, scripted_session, ticket, Endpoint,
    ScriptedBackend,
};
use serde_json::{Map, Value};
use std::time::Duration;

#[tokio::test]
async fn approving_a_registration_drops_it_and_the_counter() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_request(register_request(42));
    backend.seed_request(register_request(43));
    backend.seed_client(client(1, "alice"));
    let session = scripted_session(&backend);

    session.enter_section(RefreshScope::PendingList(RequestType::Register)).await.unwrap();
    session.enter_section(RefreshScope::DashboardCounts).await.unwrap();
    session.enter_section(RefreshScope::ClientDetail(1)).await.unwrap();
    let before = session.registry().summary().unwrap();
    assert_eq!(before.pending_registrations, Some(2));

    let outcome = session
        .dispatcher()
        .dispatch(42, RequestType::Register, RequestStatus::Approved, "Looks good", Map::new())
        .await
        .unwrap();
    assert!(outcome.removed_from_pending);
    assert!(outcome.failed_refreshes.is_empty());

    let (_, id, update) = backend.status_updates().pop().unwrap();
    assert_eq!(id, 42);
    assert_eq!(update.status, RequestStatus::Approved);
    assert_eq!(update.admin_notes, "Looks good");

    let list = views::pending_list(session.registry(), RequestType::Register, &[]);
    assert!(list.card(42).is_none());
    assert!(list.card(43).is_some());

    let after = session.registry().summary().unwrap();
    assert_eq!(after.pending_registrations, Some(1));

    // the open client view keeps the item with its new status
    let approved = session.registry().find_by_id(RequestType::Register, 42);
    assert_eq!(approved.map(|r| r.status), Some(RequestStatus::Approved));
}

#[tokio::test]
async fn backend_rejection_leaves_registry_untouched() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_request(register_request(42));
    let session = scripted_session(&backend);
    session.enter_section(RefreshScope::PendingList(RequestType::Register)).await.unwrap();
    let before = session.registry().get(RequestType::Register);

    backend.fail_next(Endpoint::UpdateStatus, ApiError::http(400, "Request is no longer pending."));
    backend.clear_calls();
    let err = session
        .dispatcher()
        .dispatch(42, RequestType::Register, RequestStatus::Rejected, "", Map::new())
        .await
        .unwrap_err();

    assert_eq!(err, DispatchError::Api(ApiError::http(400, "Request is no longer pending.")));
    assert_eq!(err.report().message, "Request is no longer pending.");
    assert_eq!(session.registry().get(RequestType::Register), before);
    // no refresh fan-out after a failure
    assert_eq!(backend.calls(), vec![Endpoint::UpdateStatus]);
}

#[tokio::test]
async fn status_outside_lifecycle_never_reaches_backend() {
    let backend = ScriptedBackend::new().shared();
    let session = scripted_session(&backend);

    let err = session
        .dispatcher()
        .dispatch(1, RequestType::Register, RequestStatus::EppCodeSent, "", Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Invalid(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn second_dispatch_while_in_flight_fails_fast() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_request(register_request(42));
    backend.delay_next(Endpoint::UpdateStatus, Duration::from_millis(50));
    let session = scripted_session(&backend);
    let dispatcher = session.dispatcher();

    let first = dispatcher.dispatch(42, RequestType::Register, RequestStatus::Approved, "", Map::new());
    let second = async {
        tokio::task::yield_now().await;
        let key = register_request(42).key();
        let busy = dispatcher.is_in_flight(key);
        let card = views::request_card(&register_request(42), session.registry().table(), busy, false);
        let result = dispatcher
            .dispatch(42, RequestType::Register, RequestStatus::Rejected, "", Map::new())
            .await;
        (card, result)
    };

    let (first, (card, second)) = tokio::join!(first, second);
    assert!(first.is_ok());
    assert!(card.buttons.iter().all(|b| b.disabled));
    assert!(second.unwrap_err().is_in_flight());
    assert_eq!(backend.status_updates().len(), 1);
    assert!(!dispatcher.is_in_flight(register_request(42).key()));
}

#[tokio::test]
async fn epp_code_travels_only_with_send_epp() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_request(pending_request(9, RequestType::TransferOut));
    let session = scripted_session(&backend);
    session
        .enter_section(RefreshScope::PendingList(RequestType::TransferOut))
        .await
        .unwrap();

    let request = session.registry().find_by_id(RequestType::TransferOut, 9).unwrap();
    let send_epp = *session
        .registry()
        .table()
        .action_for(RequestType::TransferOut, request.status, RequestStatus::EppCodeSent)
        .unwrap();

    // empty notes and EPP code are both accepted
    let outcome = session
        .dispatcher()
        .submit_note_form(&NoteForm::for_action(&request, &send_epp).with_notes("   "))
        .await
        .unwrap();
    assert_eq!(outcome.request.status, RequestStatus::EppCodeSent);
    let (_, _, update) = backend.status_updates().pop().unwrap();
    assert_eq!(update.admin_notes, "");
    assert!(update.extra.is_empty());
    assert!(!outcome.removed_from_pending);
    assert_eq!(
        session.registry().find_by_id(RequestType::TransferOut, 9).map(|r| r.status),
        Some(RequestStatus::EppCodeSent)
    );
}

#[tokio::test]
async fn epp_code_is_sent_when_typed() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_request(pending_request(9, RequestType::TransferOut));
    let session = scripted_session(&backend);
    let request = pending_request(9, RequestType::TransferOut);
    let send_epp = *session
        .registry()
        .table()
        .action_for(RequestType::TransferOut, request.status, RequestStatus::EppCodeSent)
        .unwrap();

    let form = NoteForm::for_action(&request, &send_epp)
        .with_notes(" sent ")
        .with_epp_code("AUTH-9");
    session.dispatcher().submit_note_form(&form).await.unwrap();

    let (_, _, update) = backend.status_updates().pop().unwrap();
    assert_eq!(update.admin_notes, "sent");
    assert_eq!(update.extra.get("epp_code"), Some(&Value::String("AUTH-9".into())));
}

#[tokio::test]
async fn ticket_status_change_refreshes_ticket_views() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_request(ticket(8, RequestStatus::Open));
    let session = scripted_session(&backend);
    session.enter_section(RefreshScope::TicketList).await.unwrap();
    session.enter_section(RefreshScope::TicketDetail(8)).await.unwrap();
    let mut events = session.orchestrator().subscribe(ScopeFilter::Tickets);
    backend.clear_calls();

    session
        .dispatcher()
        .change_ticket_status(8, RequestStatus::InProgress)
        .await
        .unwrap();
    // list and pending tickets come from one fetch
    assert_eq!(backend.call_count(Endpoint::Tickets), 1);

    let (_, _, update) = backend.status_updates().pop().unwrap();
    assert_eq!(update.admin_notes, "Status changed to In Progress by admin.");

    let scopes: Vec<RefreshScope> = events
        .drain()
        .into_iter()
        .filter(|e| matches!(e, SyncEvent::Refreshed { .. }))
        .map(|e| e.scope())
        .collect();
    assert!(scopes.contains(&RefreshScope::TicketList));
    assert!(scopes.contains(&RefreshScope::TicketDetail(8)));
    assert_eq!(
        session.registry().ticket_detail().map(|t| t.status),
        Some(RequestStatus::InProgress)
    );
}

#[tokio::test]
async fn ticket_reply_moves_open_ticket_in_progress() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_request(ticket(8, RequestStatus::Open));
    let session = scripted_session(&backend);
    session.enter_section(RefreshScope::TicketDetail(8)).await.unwrap();

    assert_eq!(
        session.dispatcher().reply_to_ticket(8, "   ").await.unwrap_err(),
        DispatchError::EmptyReply
    );
    assert_eq!(backend.call_count(Endpoint::ReplyToTicket), 0);

    let reply = session.dispatcher().reply_to_ticket(8, " On it ").await.unwrap();
    assert_eq!(reply.message, "On it");

    let detail = session.registry().ticket_detail().unwrap();
    assert_eq!(detail.status, RequestStatus::InProgress);
    assert_eq!(detail.replies.len(), 1);
    let view = views::ticket_detail(&detail, session.registry().table(), false);
    assert!(view.replies[0].from_admin);
}

#[tokio::test]
async fn marking_invoice_paid_swaps_buttons_for_label() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_invoice(invoice(7, InvoiceStatus::PendingPayment));
    backend.seed_client(client(1, "alice"));
    let session = scripted_session(&backend);
    session.enter_section(RefreshScope::InvoiceList).await.unwrap();

    let row = views::invoice_row(&session.registry().find_invoice(7).unwrap(), false);
    assert_eq!(row.buttons.len(), 2);

    let paid = session.dispatcher().mark_invoice_paid(7).await.unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);

    let row = views::invoice_row(&session.registry().find_invoice(7).unwrap(), false);
    assert!(row.buttons.is_empty());
    assert_eq!(row.paid_label, Some(format!("Paid on {}", backend.today())));
    assert!(backend.call_count(Endpoint::Invoices) >= 2);
    assert_eq!(backend.call_count(Endpoint::PendingRequests), 1);

    let err = session.dispatcher().cancel_invoice(7).await.unwrap_err();
    assert_eq!(err.report().status, 400);
    assert_eq!(session.registry().find_invoice(7).map(|i| i.status), Some(InvoiceStatus::Paid));
}

#[tokio::test]
async fn terminal_action_leaves_empty_placeholder() {
    let backend = ScriptedBackend::new().shared();
    backend.seed_request(pending_request(3, RequestType::DnsChange));
    let session = scripted_session(&backend);
    session
        .enter_section(RefreshScope::PendingList(RequestType::DnsChange))
        .await
        .unwrap();

    session
        .dispatcher()
        .dispatch(3, RequestType::DnsChange, RequestStatus::Rejected, "bad record", Map::new())
        .await
        .unwrap();

    assert_eq!(
        views::pending_list(session.registry(), RequestType::DnsChange, &[]),
        ListView::Empty("No pending dns changes requests.".to_string())
    );
}
