use super::TicketQuery;
use crate::core::{
    Note, NoteId, Notification, NotificationId, Ticket, TicketId, TicketLogEntry, TicketPatch,
    UserId, UserProfile,
};
use crate::error::Result;
use async_trait::async_trait;

/// Result of an atomic, version-checked ticket update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketUpdate {
    /// The patch was applied; `before` is exactly the record that was replaced
    Applied { before: Ticket, after: Ticket },
    /// The stored version no longer matches the expected one
    Stale { current_version: u64 },
    Missing,
}

/// Repository trait for ticket storage operations
///
/// This trait defines the interface for storing and retrieving tickets,
/// allowing for different storage implementations.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Saves a new ticket
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()>;

    /// Loads a ticket by ID
    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// Finds tickets matching a query, newest first
    async fn find_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>>;

    /// Applies a patch if the stored version equals `expected_version`
    ///
    /// The comparison and the write happen under one lock, and the stored
    /// version is bumped on success.
    async fn update_ticket(
        &self,
        id: &TicketId,
        patch: &TicketPatch,
        expected_version: u64,
    ) -> Result<TicketUpdate>;

    /// Deletes a ticket by ID, returning it if it existed
    async fn delete_ticket(&self, id: &TicketId) -> Result<Option<Ticket>>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert_note(&self, note: &Note) -> Result<()>;

    async fn get_note(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Notes of a ticket in the order they were written
    async fn notes_for_ticket(&self, ticket: &TicketId) -> Result<Vec<Note>>;

    async fn delete_note(&self, id: &NoteId) -> Result<Option<Note>>;
}

/// Append-only store for audit entries
///
/// There is intentionally no update or delete operation.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append_entry(&self, entry: &TicketLogEntry) -> Result<()>;

    /// Entries of a ticket, newest first
    async fn entries_for_ticket(&self, ticket: &TicketId) -> Result<Vec<TicketLogEntry>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> Result<()>;

    async fn get_notification(&self, id: &NotificationId) -> Result<Option<Notification>>;

    /// One page of a recipient's notifications, newest first, plus their total count
    async fn notifications_for(
        &self,
        recipient: &UserId,
        limit: usize,
        skip: usize,
    ) -> Result<(Vec<Notification>, usize)>;

    async fn count_unread(&self, recipient: &UserId) -> Result<usize>;

    async fn mark_read(&self, id: &NotificationId) -> Result<Option<Notification>>;

    /// Marks every unread notification of the recipient read, returning how many changed
    async fn mark_all_read(&self, recipient: &UserId) -> Result<usize>;

    /// Records the email outcome: `Ok` sets `email_sent`, `Err` sets `email_error`
    async fn record_email_outcome(
        &self,
        id: &NotificationId,
        outcome: std::result::Result<(), String>,
    ) -> Result<()>;

    async fn delete_notification(&self, id: &NotificationId) -> Result<Option<Notification>>;
}

/// Lookup of user profiles, owned by the external user-management system
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: &UserId) -> Result<Option<UserProfile>>;
}

/// Combined record store trait
pub trait RecordStore:
    TicketRepository + NoteRepository + AuditRepository + NotificationRepository + UserDirectory
{
}

/// Implementation of RecordStore for types that implement every repository
impl<T> RecordStore for T where
    T: TicketRepository + NoteRepository + AuditRepository + NotificationRepository + UserDirectory
{
}
