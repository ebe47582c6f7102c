//! reqwest implementation of the backend traits
//!
//! JSON over HTTP with a cookie session. Non-2xx bodies are classified by
//! [`ApiError::from_response`]; transport failures and undecodable 2xx
//! bodies become [`ApiError::Network`].

use crate::backend::{
    AdminBackend, ClientBackend, DomainEnvelope, InternalTransferSubmission, InvoiceEnvelope,
    NotificationBackend, RequestEnvelope, SessionBackend,
};
use crate::config::ConsoleConfig;
use async_trait::async_trait;
use registrar_model::{
    ApiError, Client, ClientDetail, ClientPendingCounts, DashboardSummary, Domain, DomainDetail,
    Invoice, MarkReadRequest, MarkReadResponse, MarkReadTarget, NotificationFeed, Request,
    RequestType, StatusUpdate, StatusUpdateResponse, TicketReplyOutcome,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::json;

/// HTTP backend for both admin and client sessions
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: ConsoleConfig,
}

impl HttpBackend {
    /// Build a backend from configuration
    ///
    /// # Errors
    /// Returns [`ApiError::Network`] when the session cookie is not a valid
    /// header value or the TLS backend fails to initialise.
    pub fn new(config: ConsoleConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = config.session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::network(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::network(format!("build http client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Configuration this backend was built with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|err| {
            tracing::warn!(error = %err, "backend request failed");
            ApiError::network(err.to_string())
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::network(err.to_string()))?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            tracing::debug!(%url, status = status.as_u16(), error = %err, "backend returned error");
            return Err(err);
        }

        serde_json::from_slice(&body)
            .map_err(|err| ApiError::network(format!("response from {url} not valid JSON: {err}")))
    }

    async fn admin_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.admin_url(path);
        tracing::debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn admin_post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let url = self.config.admin_url(path);
        tracing::debug!(%url, "POST");
        self.send(self.client.post(url).json(&body)).await
    }

    async fn api_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.api_url(path);
        tracing::debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn api_post<T: DeserializeOwned, B: serde::Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.config.api_url(path);
        tracing::debug!(%url, "POST");
        self.send(self.client.post(url).json(body)).await
    }
}

#[async_trait]
impl AdminBackend for HttpBackend {
    async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        self.admin_get("dashboard-summary").await
    }

    async fn recent_pending(&self) -> Result<Vec<Request>, ApiError> {
        self.admin_get("requests/recent-pending").await
    }

    async fn pending_requests(&self, request_type: RequestType) -> Result<Vec<Request>, ApiError> {
        self.admin_get(&format!("requests/{}/pending", request_type.as_str()))
            .await
    }

    async fn tickets(&self) -> Result<Vec<Request>, ApiError> {
        self.admin_get("requests/support-tickets/all").await
    }

    async fn ticket_detail(&self, ticket_id: u64) -> Result<Request, ApiError> {
        self.admin_get(&format!("support-tickets/{ticket_id}/details"))
            .await
    }

    async fn update_status(
        &self,
        request_type: RequestType,
        id: u64,
        update: &StatusUpdate,
    ) -> Result<Request, ApiError> {
        let url = self.config.admin_url(&format!(
            "requests/{}/{id}/status",
            request_type.path_segment()
        ));
        tracing::debug!(%url, status = %update.status, "PUT");
        let response: StatusUpdateResponse = self.send(self.client.put(url).json(update)).await?;
        Ok(response.item)
    }

    async fn reply_to_ticket(
        &self,
        ticket_id: u64,
        message: &str,
    ) -> Result<TicketReplyOutcome, ApiError> {
        self.admin_post(
            &format!("support-tickets/{ticket_id}/reply"),
            json!({ "message": message }),
        )
        .await
    }

    async fn domains(&self) -> Result<Vec<Domain>, ApiError> {
        self.admin_get("all-domains").await
    }

    async fn domain_detail(&self, domain_id: u64) -> Result<DomainDetail, ApiError> {
        self.admin_get(&format!("domain/{domain_id}/details")).await
    }

    async fn reassign_domain(&self, domain_id: u64, new_user_id: u64) -> Result<Domain, ApiError> {
        let envelope: DomainEnvelope = self
            .admin_post(
                &format!("domains/{domain_id}/reassign"),
                json!({ "new_user_id": new_user_id }),
            )
            .await?;
        Ok(envelope.domain)
    }

    async fn clients(&self) -> Result<Vec<Client>, ApiError> {
        self.admin_get("clients").await
    }

    async fn client_detail(&self, client_id: u64) -> Result<ClientDetail, ApiError> {
        self.admin_get(&format!("client/{client_id}/details")).await
    }

    async fn invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        self.admin_get("invoices").await
    }

    async fn mark_invoice_paid(&self, invoice_id: u64) -> Result<Invoice, ApiError> {
        let envelope: InvoiceEnvelope = self
            .admin_post(&format!("invoices/{invoice_id}/mark-paid"), json!({}))
            .await?;
        Ok(envelope.invoice)
    }

    async fn cancel_invoice(&self, invoice_id: u64) -> Result<Invoice, ApiError> {
        let envelope: InvoiceEnvelope = self
            .admin_post(&format!("invoices/{invoice_id}/cancel"), json!({}))
            .await?;
        Ok(envelope.invoice)
    }
}

#[async_trait]
impl ClientBackend for HttpBackend {
    async fn pending_counts(&self) -> Result<ClientPendingCounts, ApiError> {
        self.api_get("client/pending-request-counts").await
    }

    async fn client_tickets(&self) -> Result<Vec<Request>, ApiError> {
        self.api_get("support-tickets").await
    }

    async fn submit_internal_transfer(
        &self,
        submission: &InternalTransferSubmission,
    ) -> Result<Request, ApiError> {
        let envelope: RequestEnvelope = self
            .api_post("domain-requests/internal-transfer", submission)
            .await?;
        Ok(envelope.request)
    }

    async fn request_auto_renew_change(&self, domain_id: u64, enable: bool) -> Result<Request, ApiError> {
        let envelope: RequestEnvelope = self
            .api_post(
                &format!("domain-requests/auto-renew-change/{domain_id}"),
                &json!({ "requestedAutoRenewStatus": enable }),
            )
            .await?;
        Ok(envelope.request)
    }

    async fn request_lock_change(&self, domain_id: u64, lock: bool) -> Result<Request, ApiError> {
        let envelope: RequestEnvelope = self
            .api_post(
                &format!("domain-requests/lock-change/{domain_id}"),
                &json!({ "requestedLockStatus": lock }),
            )
            .await?;
        Ok(envelope.request)
    }
}

#[async_trait]
impl NotificationBackend for HttpBackend {
    async fn notifications(&self) -> Result<NotificationFeed, ApiError> {
        self.api_get("notifications").await
    }

    async fn mark_read(&self, target: MarkReadTarget) -> Result<u64, ApiError> {
        let response: MarkReadResponse = self
            .api_post("notifications/mark-read", &MarkReadRequest { ids: target })
            .await?;
        Ok(response.unread_count)
    }
}

#[async_trait]
impl SessionBackend for HttpBackend {
    async fn logout(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api_post("auth/logout", &json!({})).await?;
        Ok(())
    }
}
