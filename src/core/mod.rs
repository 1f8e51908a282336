//! Core domain types
//!
//! Tickets are the only records with a lifecycle. Notes, audit entries and
//! notifications reference a ticket by identity only and are never embedded
//! in it.

mod audit;
mod builders;
mod id;
mod note;
mod notification;
mod role;
mod ticket;
mod user;

pub use audit::{AuditAction, TicketLogEntry};
pub use builders::TicketBuilder;
pub use id::{LogEntryId, NoteId, NotificationId, TicketId, UserId};
pub use note::Note;
pub use notification::{Notification, NotificationType};
pub use role::{Actor, Capability, Role};
pub use ticket::{NewTicket, Priority, Status, Ticket, TicketPatch, TicketType};
pub use user::UserProfile;

/// Department used when a ticket is filed without one
pub const DEFAULT_DEPARTMENT: &str = "General";

/// Default upper bound on ticket subject length, in characters
pub const DEFAULT_SUBJECT_MAX_LENGTH: usize = 200;
