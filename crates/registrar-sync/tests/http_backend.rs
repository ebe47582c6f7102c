//! HttpBackend against a local warp server

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use registrar_model::{ApiError, MarkReadTarget, RequestStatus, RequestType, StatusUpdate};
use registrar_sync::{
    AdminBackend, ClientBackend, ConsoleConfig, HttpBackend, InternalTransferSubmission,
    NotificationBackend,
};
use registrar_test_utils::{pending_request, register_request, request_json};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::http::StatusCode;
use warp::Filter;

type Captured = Arc<Mutex<Vec<Value>>>;

fn routes(
    captured: Captured,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let pending = warp::path!("api" / "admin" / "requests" / String / "pending")
        .and(warp::get())
        .map(|kind: String| {
            let items = if kind == "register" {
                vec![request_json(&register_request(42))]
            } else {
                Vec::new()
            };
            warp::reply::json(&items)
        });

    let status_capture = captured.clone();
    let status = warp::path!("api" / "admin" / "requests" / String / u64 / "status")
        .and(warp::put())
        .and(warp::body::json())
        .map(move |segment: String, id: u64, body: Value| {
            status_capture.lock().push(json!({ "segment": segment, "body": body.clone() }));
            let mut item = request_json(&pending_request(id, RequestType::TransferOut));
            item["status"] = body["status"].clone();
            item["admin_notes"] = body["admin_notes"].clone();
            warp::reply::json(&json!({ "message": "Status updated.", "item": item }))
        });

    let summary = warp::path!("api" / "admin" / "dashboard-summary").map(|| {
        warp::reply::with_status(
            warp::reply::json(&json!({ "error": "Database unavailable" })),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    });

    let transfer = warp::path!("api" / "domain-requests" / "internal-transfer")
        .and(warp::post())
        .map(|| {
            warp::reply::with_status(
                warp::reply::json(&json!({
                    "error": "Invalid input",
                    "errors": { "targetClientIdentifier": "Unknown client." }
                })),
                StatusCode::BAD_REQUEST,
            )
        });

    let mark_capture = captured;
    let mark_read = warp::path!("api" / "notifications" / "mark-read")
        .and(warp::post())
        .and(warp::body::json())
        .map(move |body: Value| {
            mark_capture.lock().push(body);
            warp::reply::json(&json!({ "unread_count": 0 }))
        });

    let feed = warp::path!("api" / "notifications")
        .and(warp::get())
        .and(warp::header::optional::<String>("cookie"))
        .map(|cookie: Option<String>| {
            if cookie.is_some_and(|c| c.contains("session=abc")) {
                warp::reply::with_status(
                    warp::reply::json(&json!({
                        "notifications": [
                            { "id": 1, "message": "Invoice INV-7 issued", "notification_type": "invoice_new", "is_read": false }
                        ],
                        "unread_count": 1
                    })),
                    StatusCode::OK,
                )
            } else {
                warp::reply::with_status(
                    warp::reply::json(&json!({ "error": "Authentication required." })),
                    StatusCode::UNAUTHORIZED,
                )
            }
        });

    let invoices = warp::path!("api" / "admin" / "invoices").map(|| "<html>login</html>");

    pending
        .or(status)
        .or(summary)
        .or(transfer)
        .or(mark_read)
        .or(feed)
        .or(invoices)
}

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    captured: Captured,
}

impl TestServer {
    fn start() -> Self {
        let captured = Captured::default();
        let (tx, rx) = oneshot::channel::<()>();
        let (addr, server) = warp::serve(routes(captured.clone())).bind_with_graceful_shutdown(
            ([127, 0, 0, 1], 0),
            async move {
                let _ = rx.await;
            },
        );
        Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(tx),
            handle: Some(tokio::spawn(server)),
            captured,
        }
    }

    fn backend(&self) -> HttpBackend {
        let config = ConsoleConfig::new()
            .with_base_url(self.base_url.clone())
            .with_session_cookie("session=abc")
            .with_request_timeout_secs(2);
        HttpBackend::new(config).unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[tokio::test]
async fn pending_list_decodes_backend_json() {
    let server = TestServer::start();
    let backend = server.backend();

    let items = backend.pending_requests(RequestType::Register).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, 42);
    assert_eq!(items[0].status, RequestStatus::PendingAdminApproval);
    assert!(backend.pending_requests(RequestType::Renew).await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn status_update_sends_notes_and_extra_fields() {
    let server = TestServer::start();
    let backend = server.backend();

    let update = StatusUpdate::new(RequestStatus::EppCodeSent, "code sent by email")
        .with_extra("epp_code", "AUTH-123");
    let item = backend
        .update_status(RequestType::TransferOut, 9, &update)
        .await
        .unwrap();
    assert_eq!(item.status, RequestStatus::EppCodeSent);
    assert_eq!(item.admin_notes.as_deref(), Some("code sent by email"));

    let captured = server.captured.lock().clone();
    assert_eq!(
        captured,
        vec![json!({
            "segment": "transfer-out",
            "body": {
                "status": "EPP Code Sent",
                "admin_notes": "code sent by email",
                "epp_code": "AUTH-123"
            }
        })]
    );

    server.stop().await;
}

#[tokio::test]
async fn server_error_carries_backend_message() {
    let server = TestServer::start();
    let err = server.backend().dashboard_summary().await.unwrap_err();
    assert_eq!(err, ApiError::http(500, "Database unavailable"));
    assert!(!err.is_client_error());
    server.stop().await;
}

#[tokio::test]
async fn validation_errors_keep_field_map() {
    let server = TestServer::start();
    let submission = InternalTransferSubmission {
        domain_id: 5,
        target_client_identifier: "acme".to_string(),
    };
    let err = server
        .backend()
        .submit_internal_transfer(&submission)
        .await
        .unwrap_err();

    assert_eq!(err.status(), 400);
    let fields = err.field_errors().unwrap();
    assert_eq!(fields["targetClientIdentifier"], vec!["Unknown client.".to_string()]);
    server.stop().await;
}

#[tokio::test]
async fn mark_all_read_posts_all_marker() {
    let server = TestServer::start();
    let unread = server.backend().mark_read(MarkReadTarget::All).await.unwrap();
    assert_eq!(unread, 0);
    assert_eq!(server.captured.lock().clone(), vec![json!({ "ids": "all" })]);
    server.stop().await;
}

#[tokio::test]
async fn session_cookie_is_sent() {
    let server = TestServer::start();
    let feed = server.backend().notifications().await.unwrap();
    assert_eq!(feed.unread_count, 1);

    let anonymous = HttpBackend::new(ConsoleConfig::new().with_base_url(server.base_url.clone())).unwrap();
    let err = anonymous.notifications().await.unwrap_err();
    assert_eq!(err.status(), 401);
    assert_eq!(err.message(), "Authentication required.");
    server.stop().await;
}

#[tokio::test]
async fn non_json_success_is_a_network_error() {
    let server = TestServer::start();
    let err = server.backend().invoices().await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.status(), 0);
    server.stop().await;
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ConsoleConfig::new()
        .with_base_url(format!("http://127.0.0.1:{port}"))
        .with_request_timeout_secs(1);
    let err = HttpBackend::new(config).unwrap().recent_pending().await.unwrap_err();
    assert!(err.is_network());
    assert!(err.report().message.starts_with("Network error"));
}
