//! Polled user notifications

use serde::{Deserialize, Serialize};

/// A notification row as served by `GET /notifications`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl Notification {
    /// Icon class for this notification
    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        NotificationKind::classify(self.notification_type.as_deref(), &self.message)
    }
}

/// Display classification of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Ticket reply or ticket status change
    Ticket,
    /// Invoice issued or updated
    Invoice,
    /// Domain nearing expiry
    DomainExpiry,
    /// Request update whose message reports approval or completion
    RequestApproved,
    /// Request update whose message reports rejection or failure
    RequestRejected,
    /// Any other request update
    RequestUpdate,
    /// Untyped or unrecognised
    General,
}

impl NotificationKind {
    /// Classify from the backend type tag, falling back to the message for
    /// request updates.
    #[must_use]
    pub fn classify(notification_type: Option<&str>, message: &str) -> Self {
        let Some(tag) = notification_type else {
            return Self::General;
        };

        if tag.contains("ticket_reply") || tag.contains("ticket_status") {
            Self::Ticket
        } else if tag.contains("invoice") {
            Self::Invoice
        } else if tag.contains("domain_expiry") {
            Self::DomainExpiry
        } else if tag.contains("request_update")
            || tag.contains("new_request")
            || tag.ends_with("_status_update")
            || tag.ends_with("_submitted")
        {
            let lowered = message.to_lowercase();
            if lowered.contains("approved") || lowered.contains("completed") {
                Self::RequestApproved
            } else if lowered.contains("rejected") || lowered.contains("failed") {
                Self::RequestRejected
            } else {
                Self::RequestUpdate
            }
        } else {
            Self::General
        }
    }

    /// Icon name used by the front end icon set
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Ticket => "MessageSquare",
            Self::Invoice => "FileText",
            Self::DomainExpiry => "CalendarClock",
            Self::RequestApproved => "CheckCircle2",
            Self::RequestRejected => "XCircle",
            Self::RequestUpdate => "BellRing",
            Self::General => "Info",
        }
    }
}

/// `GET /notifications` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFeed {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub unread_count: u64,
}

/// Which notifications to mark as read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MarkReadTarget {
    /// Specific ids
    Ids(Vec<u64>),
    /// Every notification of the user; serialises as `"all"`
    #[serde(serialize_with = "serialize_all")]
    All,
}

fn serialize_all<S: serde::Serializer>(serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("all")
}

/// Body of `POST /notifications/mark-read`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkReadRequest {
    pub ids: MarkReadTarget,
}

/// Response of `POST /notifications/mark-read`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MarkReadResponse {
    #[serde(default)]
    pub unread_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_by_tag_and_message() {
        assert_eq!(NotificationKind::classify(Some("ticket_reply_client"), "x"), NotificationKind::Ticket);
        assert_eq!(NotificationKind::classify(Some("new_invoice"), "x"), NotificationKind::Invoice);
        assert_eq!(NotificationKind::classify(Some("domain_expiry_30"), "x"), NotificationKind::DomainExpiry);
        assert_eq!(
            NotificationKind::classify(Some("register_status_update"), "Your registration was Approved"),
            NotificationKind::RequestApproved
        );
        assert_eq!(
            NotificationKind::classify(Some("request_update"), "Transfer failed"),
            NotificationKind::RequestRejected
        );
        assert_eq!(NotificationKind::classify(Some("new_request"), "submitted"), NotificationKind::RequestUpdate);
        assert_eq!(NotificationKind::classify(None, "hello"), NotificationKind::General);
    }

    #[test]
    fn mark_read_body_shapes() {
        let ids = MarkReadRequest { ids: MarkReadTarget::Ids(vec![1, 2]) };
        assert_eq!(serde_json::to_value(&ids).unwrap(), json!({"ids": [1, 2]}));

        let all = MarkReadRequest { ids: MarkReadTarget::All };
        assert_eq!(serde_json::to_value(&all).unwrap(), json!({"ids": "all"}));
    }

    #[test]
    fn feed_defaults_when_fields_missing() {
        let feed: NotificationFeed = serde_json::from_value(json!({})).unwrap();
        assert!(feed.notifications.is_empty());
        assert_eq!(feed.unread_count, 0);
    }
}
