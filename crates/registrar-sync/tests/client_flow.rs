//! Client submissions, notifications and session teardown

use pretty_assertions::assert_eq;
use registrar_model::{RequestStatus, RequestType, TransitionTable};
use registrar_sync::views;
use registrar_sync::{
    ClientRequests, RefreshScope, RequestRegistry, SyncOrchestrator, FIELD_DOMAIN, FIELD_TARGET_CLIENT,
};
use registrar_test_utils::{
    client, domain, notification, register_request, scripted_session, Endpoint, ScriptedBackend,
};
use std::sync::Arc;
use std::time::Duration;

fn backend_with_domain() -> Arc<ScriptedBackend> {
    let backend = ScriptedBackend::new().with_client_user(1).shared();
    backend.seed_client(client(1, "alice"));
    backend.seed_client(client(2, "bob"));
    backend.seed_domain(domain(5, "example.com", 1));
    backend
}

#[tokio::test]
async fn unknown_transfer_target_is_a_field_error() {
    let backend = backend_with_domain();
    let session = scripted_session(&backend);

    let surface = session
        .client_requests()
        .submit_internal_transfer(Some(5), "acme")
        .await
        .unwrap_err();

    assert_eq!(
        surface.field(FIELD_TARGET_CLIENT),
        ["Target client not found or inactive.".to_string()]
    );
    assert!(surface.banner.is_none());
    assert_eq!(surface.status, 404);
    assert_eq!(backend.transfer_submissions()[0].target_client_identifier, "acme");
}

#[tokio::test]
async fn missing_inputs_stay_local() {
    let backend = backend_with_domain();
    let session = scripted_session(&backend);

    let surface = session
        .client_requests()
        .submit_internal_transfer(None, "  ")
        .await
        .unwrap_err();
    assert!(!surface.field(FIELD_DOMAIN).is_empty());
    assert!(!surface.field(FIELD_TARGET_CLIENT).is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn accepted_transfer_refreshes_client_counts() {
    let backend = backend_with_domain();
    let session = scripted_session(&backend);

    let request = session
        .client_requests()
        .submit_internal_transfer(Some(5), " bob ")
        .await
        .unwrap();
    assert_eq!(request.request_type, RequestType::InternalTransferRequest);
    assert_eq!(request.status, RequestStatus::PendingAdminApproval);
    assert_eq!(request.transfer_target_id(), Some(2));

    let counts = session.registry().client_counts().unwrap();
    assert_eq!(counts.pending_internal_transfers, Some(1));

    // a second one for the same domain is refused by the backend
    let surface = session
        .client_requests()
        .submit_internal_transfer(Some(5), "bob")
        .await
        .unwrap_err();
    assert_eq!(surface.banner.as_deref(), Some("Request already pending."));
    assert_eq!(surface.status, 409);
}

#[tokio::test]
async fn submission_succeeds_when_counts_cannot_refresh() {
    let backend = backend_with_domain();
    let registry = Arc::new(RequestRegistry::new(TransitionTable::standard()));
    // no client backend, so the counts refresh fails locally
    let orchestrator = Arc::new(SyncOrchestrator::new(Arc::clone(&registry)));
    let requests = ClientRequests::new(backend.clone(), orchestrator);

    let request = requests.request_lock_change(5, true).await.unwrap();
    assert_eq!(request.request_type, RequestType::LockChange);
    assert_eq!(backend.call_count(Endpoint::LockChange), 1);
    assert_eq!(backend.call_count(Endpoint::PendingCounts), 0);
    assert!(registry.client_counts().is_none());
}

#[tokio::test]
async fn lock_change_in_current_state_is_a_banner() {
    let backend = backend_with_domain();
    let session = scripted_session(&backend);

    let surface = session
        .client_requests()
        .request_lock_change(5, false)
        .await
        .unwrap_err();
    assert_eq!(surface.banner.as_deref(), Some("Domain is already unlocked."));

    let request = session.client_requests().request_lock_change(5, true).await.unwrap();
    assert_eq!(request.summary_flag("requested_lock_status"), Some(true));
    assert_eq!(session.registry().client_counts().unwrap().lock_changes, Some(1));
}

#[tokio::test]
async fn notifications_panel_round_trip() {
    let backend = backend_with_domain();
    backend.seed_notification(notification(1, "invoice_new", "Invoice INV-7 issued"));
    backend.seed_notification(notification(2, "request_update", "Your transfer was rejected"));
    let session = scripted_session(&backend);
    let center = session.notifications();

    center.open_panel().await.unwrap();
    assert_eq!(views::notification_badge(center.unread_count()).text.as_deref(), Some("2"));
    let panel = views::notification_items(&center.snapshot().items);
    assert_eq!(panel.items()[1].icon, "XCircle");

    center.mark_read(1).await.unwrap();
    assert_eq!(center.unread_count(), 1);
    center.mark_all_read().await.unwrap();
    assert!(!views::notification_badge(center.unread_count()).is_visible());

    let calls = backend.call_count(Endpoint::MarkRead);
    center.mark_all_read().await.unwrap();
    assert_eq!(backend.call_count(Endpoint::MarkRead), calls);
}

#[tokio::test]
async fn logout_stops_polling_and_clears_state() {
    let backend = backend_with_domain();
    backend.seed_request(register_request(42));
    let session = scripted_session(&backend);

    session
        .enter_section(RefreshScope::PendingList(RequestType::Register))
        .await
        .unwrap();
    session.start_polling_every(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(session.poller().is_running());
    assert!(backend.call_count(Endpoint::Notifications) >= 1);

    session.logout().await.unwrap();
    assert!(!session.poller().is_running());
    assert!(!session.registry().is_loaded(RequestType::Register));
    assert_eq!(backend.call_count(Endpoint::Logout), 1);

    let polls = backend.call_count(Endpoint::Notifications);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(backend.call_count(Endpoint::Notifications), polls);
}
