//! Registrar Model - request lifecycle types
//!
//! Pure data for the registrar console:
//! - Request and ticket entities with their status enums
//! - The declarative Status Transition Table
//! - Invoices, domains, clients and dashboard counters
//! - Notifications
//! - The backend error taxonomy
//!
//! # Example
//!
//! ```rust
//! use registrar_model::{RequestStatus, RequestType, TransitionTable};
//!
//! let table = TransitionTable::standard();
//! let actions = table.actions(RequestType::Register, RequestStatus::PendingAdminApproval);
//! assert_eq!(actions.len(), 2);
//! assert_eq!(actions[0].target, RequestStatus::Approved);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod entities;
pub mod error;
pub mod notification;
pub mod request;
pub mod transition;

pub use entities::{
    Client, ClientDetail, ClientPendingCounts, DashboardSummary, Domain, DomainDetail, Invoice,
    InvoiceStatus,
};
pub use error::{ApiError, ErrorReport, FieldErrors, ModelError};
pub use notification::{
    MarkReadRequest, MarkReadResponse, MarkReadTarget, Notification, NotificationFeed,
    NotificationKind,
};
pub use request::{
    Request, RequestKey, RequestStatus, RequestType, StatusUpdate, StatusUpdateResponse,
    TicketReply, TicketReplyOutcome,
};
pub use transition::{
    AdminAction, ButtonStyle, DetailField, FieldSource, Invalidation, NotePrompt, TitleSource,
    TransitionRow, TransitionTable, Trigger, TypeDescriptor,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with registrar entities
    pub use crate::{
        AdminAction, ApiError, Invalidation, Invoice, InvoiceStatus, Notification, Request,
        RequestKey, RequestStatus, RequestType, TransitionTable,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
