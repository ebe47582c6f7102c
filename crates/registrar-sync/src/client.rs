//! Client-side submissions
//!
//! Domain requests a signed-in client files for admin review. Failures are
//! returned as an [`ErrorSurface`]: per-field messages for the form inputs
//! that have an error slot, anything else as a banner.

use crate::backend::{ClientBackend, InternalTransferSubmission};
use crate::events::RefreshScope;
use crate::orchestrator::SyncOrchestrator;
use registrar_model::{ApiError, FieldErrors, Request};
use std::fmt;
use std::sync::Arc;

/// Form field carrying the domain being transferred
pub const FIELD_DOMAIN: &str = "domainId";
/// Form field carrying the receiving client's username or email
pub const FIELD_TARGET_CLIENT: &str = "targetClientIdentifier";

const TRANSFER_FIELDS: [&str; 2] = [FIELD_DOMAIN, FIELD_TARGET_CLIENT];

/// Where a failed submission should be shown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSurface {
    /// Messages attached to specific inputs
    pub fields: FieldErrors,
    /// Message for the form-level banner
    pub banner: Option<String>,
    /// HTTP status, 0 for local or network failures
    pub status: u16,
}

impl ErrorSurface {
    /// Banner-only surface
    #[must_use]
    pub fn banner(message: impl Into<String>, status: u16) -> Self {
        Self {
            fields: FieldErrors::new(),
            banner: Some(message.into()),
            status,
        }
    }

    /// Add a message for `field`
    #[must_use]
    pub fn with_field(mut self, field: &str, message: impl Into<String>) -> Self {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
        self
    }

    /// Messages for one field
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    #[inline]
    #[must_use]
    pub fn has_field_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Route a backend error onto the form's error slots
    ///
    /// Keys of the structured `errors` map win; a bare message is matched
    /// against known phrasing; whatever is left goes to the banner.
    #[must_use]
    pub fn route(err: &ApiError, known_fields: &[&str]) -> Self {
        let mut surface = Self {
            status: err.status(),
            ..Self::default()
        };

        if let Some(errors) = err.field_errors() {
            for (field, messages) in errors {
                if known_fields.contains(&field.as_str()) {
                    surface.fields.insert(field.clone(), messages.clone());
                } else {
                    let joined = messages.join(" ");
                    surface.banner = Some(match surface.banner.take() {
                        Some(existing) => format!("{existing} {joined}"),
                        None => joined,
                    });
                }
            }
            if surface.has_field_errors() || surface.banner.is_some() {
                return surface;
            }
        }

        let message = if err.is_network() {
            err.report().message
        } else {
            err.message().to_string()
        };
        match hinted_field(&message).filter(|f| known_fields.contains(f)) {
            Some(field) => surface.with_field(field, message),
            None => {
                surface.banner = Some(message);
                surface
            }
        }
    }
}

impl fmt::Display for ErrorSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect();
        if let Some(banner) = &self.banner {
            parts.insert(0, banner.clone());
        }
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ErrorSurface {}

fn hinted_field(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    if lower.contains("target client") {
        Some(FIELD_TARGET_CLIENT)
    } else if lower.contains("domain not found") {
        Some(FIELD_DOMAIN)
    } else {
        None
    }
}

/// Submission flows for a client session
pub struct ClientRequests {
    backend: Arc<dyn ClientBackend>,
    orchestrator: Arc<SyncOrchestrator>,
}

impl fmt::Debug for ClientRequests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRequests").finish_non_exhaustive()
    }
}

impl ClientRequests {
    #[must_use]
    pub fn new(backend: Arc<dyn ClientBackend>, orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self {
            backend,
            orchestrator,
        }
    }

    /// Ask for a domain to be moved to another client account
    ///
    /// # Errors
    /// Missing inputs are reported without contacting the backend. Backend
    /// errors are routed by [`ErrorSurface::route`].
    pub async fn submit_internal_transfer(
        &self,
        domain_id: Option<u64>,
        target_identifier: &str,
    ) -> Result<Request, ErrorSurface> {
        let target = target_identifier.trim();
        let mut local = ErrorSurface::default();
        if domain_id.is_none() {
            local = local.with_field(FIELD_DOMAIN, "Please select a domain.");
        }
        if target.is_empty() {
            local = local.with_field(FIELD_TARGET_CLIENT, "Target client username or email is required.");
        }
        let Some(domain_id) = domain_id.filter(|_| !local.has_field_errors()) else {
            return Err(local);
        };

        let submission = InternalTransferSubmission {
            domain_id,
            target_client_identifier: target.to_string(),
        };
        let request = self
            .backend
            .submit_internal_transfer(&submission)
            .await
            .map_err(|err| {
                tracing::warn!(domain_id, error = %err, "internal transfer rejected");
                ErrorSurface::route(&err, &TRANSFER_FIELDS)
            })?;

        tracing::info!(domain_id, request_id = request.id, "internal transfer submitted");
        self.refresh_counts().await;
        Ok(request)
    }

    /// Ask for auto-renew to be switched on or off
    ///
    /// # Errors
    /// Backend errors as a banner.
    pub async fn request_auto_renew_change(&self, domain_id: u64, enable: bool) -> Result<Request, ErrorSurface> {
        let request = self
            .backend
            .request_auto_renew_change(domain_id, enable)
            .await
            .map_err(|err| ErrorSurface::route(&err, &[]))?;
        tracing::info!(domain_id, enable, request_id = request.id, "auto-renew change requested");
        self.refresh_counts().await;
        Ok(request)
    }

    /// Ask for the registrar lock to be set or cleared
    ///
    /// # Errors
    /// Backend errors as a banner.
    pub async fn request_lock_change(&self, domain_id: u64, lock: bool) -> Result<Request, ErrorSurface> {
        let request = self
            .backend
            .request_lock_change(domain_id, lock)
            .await
            .map_err(|err| ErrorSurface::route(&err, &[]))?;
        tracing::info!(domain_id, lock, request_id = request.id, "lock change requested");
        self.refresh_counts().await;
        Ok(request)
    }

    /// Tickets filed by the signed-in client
    ///
    /// # Errors
    /// Backend errors as a banner.
    pub async fn tickets(&self) -> Result<Vec<Request>, ErrorSurface> {
        self.backend
            .client_tickets()
            .await
            .map_err(|err| ErrorSurface::route(&err, &[]))
    }

    async fn refresh_counts(&self) {
        // the counts badge is best effort, the submission already succeeded
        if let Err(err) = self.orchestrator.refresh(RefreshScope::ClientPendingCounts).await {
            tracing::debug!(error = %err, "client pending counts refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn structured_errors_go_to_matching_fields() {
        let mut errors = BTreeMap::new();
        errors.insert(FIELD_TARGET_CLIENT.to_string(), vec!["Unknown client.".to_string()]);
        errors.insert("other".to_string(), vec!["Try again.".to_string()]);
        let err = ApiError::validation(400, "Invalid input", errors);

        let surface = ErrorSurface::route(&err, &TRANSFER_FIELDS);
        assert_eq!(surface.field(FIELD_TARGET_CLIENT), ["Unknown client.".to_string()]);
        assert_eq!(surface.banner.as_deref(), Some("Try again."));
        assert_eq!(surface.status, 400);
    }

    #[test]
    fn message_hints_pick_a_field() {
        let err = ApiError::http(404, "Target client not found or inactive.");
        let surface = ErrorSurface::route(&err, &TRANSFER_FIELDS);
        assert_eq!(
            surface.field(FIELD_TARGET_CLIENT),
            ["Target client not found or inactive.".to_string()]
        );
        assert!(surface.banner.is_none());

        let err = ApiError::http(404, "Domain not found or not owned by you.");
        let surface = ErrorSurface::route(&err, &TRANSFER_FIELDS);
        assert!(!surface.field(FIELD_DOMAIN).is_empty());
    }

    #[test]
    fn unmatched_messages_become_banner() {
        let err = ApiError::http(409, "Request already pending.");
        let surface = ErrorSurface::route(&err, &TRANSFER_FIELDS);
        assert!(!surface.has_field_errors());
        assert_eq!(surface.banner.as_deref(), Some("Request already pending."));

        let hinted_without_slot = ApiError::http(404, "Target client not found or inactive.");
        let surface = ErrorSurface::route(&hinted_without_slot, &[]);
        assert!(surface.banner.is_some());
    }

    #[test]
    fn display_lists_banner_then_fields() {
        let surface = ErrorSurface::banner("Failed", 400).with_field(FIELD_DOMAIN, "Pick one.");
        assert_eq!(surface.to_string(), "Failed; domainId: Pick one.");
    }
}
