//! In-memory record store
//!
//! Backs the demo server and the test suite. All collections live behind a
//! single lock, so each repository call is atomic with respect to the others.

use super::{
    AuditRepository, NoteRepository, NotificationRepository, TicketQuery, TicketRepository,
    TicketUpdate, UserDirectory,
};
use crate::core::{
    Note, NoteId, Notification, NotificationId, Ticket, TicketId, TicketLogEntry, TicketPatch,
    UserId, UserProfile,
};
use crate::error::{HelpdeskError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Collections {
    tickets: Vec<Ticket>,
    notes: Vec<Note>,
    log: Vec<TicketLogEntry>,
    notifications: Vec<Notification>,
    users: HashMap<UserId, UserProfile>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose user directory is pre-populated
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        let users = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            inner: RwLock::new(Collections {
                users,
                ..Collections::default()
            }),
        }
    }

    pub async fn ticket_count(&self) -> usize {
        self.inner.read().await.tickets.len()
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.tickets.iter().any(|t| t.id == ticket.id) {
            return Err(HelpdeskError::storage(format!(
                "duplicate ticket id {}",
                ticket.id
            )));
        }
        inner.tickets.push(ticket.clone());
        Ok(())
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        let inner = self.inner.read().await;
        Ok(inner.tickets.iter().find(|t| t.id == *id).cloned())
    }

    async fn find_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
        let inner = self.inner.read().await;
        Ok(query.apply(inner.tickets.iter()))
    }

    async fn update_ticket(
        &self,
        id: &TicketId,
        patch: &TicketPatch,
        expected_version: u64,
    ) -> Result<TicketUpdate> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.tickets.iter_mut().find(|t| t.id == *id) else {
            return Ok(TicketUpdate::Missing);
        };

        if stored.version != expected_version {
            return Ok(TicketUpdate::Stale {
                current_version: stored.version,
            });
        }

        let before = stored.clone();
        stored.apply(patch);
        stored.version += 1;
        stored.updated_at = Utc::now();

        Ok(TicketUpdate::Applied {
            before,
            after: stored.clone(),
        })
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        let mut inner = self.inner.write().await;
        let position = inner.tickets.iter().position(|t| t.id == *id);
        Ok(position.map(|i| inner.tickets.remove(i)))
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn insert_note(&self, note: &Note) -> Result<()> {
        self.inner.write().await.notes.push(note.clone());
        Ok(())
    }

    async fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let inner = self.inner.read().await;
        Ok(inner.notes.iter().find(|n| n.id == *id).cloned())
    }

    async fn notes_for_ticket(&self, ticket: &TicketId) -> Result<Vec<Note>> {
        let inner = self.inner.read().await;
        Ok(inner
            .notes
            .iter()
            .filter(|n| n.ticket == *ticket)
            .cloned()
            .collect())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let mut inner = self.inner.write().await;
        let position = inner.notes.iter().position(|n| n.id == *id);
        Ok(position.map(|i| inner.notes.remove(i)))
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn append_entry(&self, entry: &TicketLogEntry) -> Result<()> {
        self.inner.write().await.log.push(entry.clone());
        Ok(())
    }

    async fn entries_for_ticket(&self, ticket: &TicketId) -> Result<Vec<TicketLogEntry>> {
        let inner = self.inner.read().await;
        // Reverse first so equal timestamps keep newest-appended first
        let mut entries: Vec<TicketLogEntry> = inner
            .log
            .iter()
            .rev()
            .filter(|e| e.ticket == *ticket)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert_notification(&self, notification: &Notification) -> Result<()> {
        self.inner
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn get_notification(&self, id: &NotificationId) -> Result<Option<Notification>> {
        let inner = self.inner.read().await;
        Ok(inner.notifications.iter().find(|n| n.id == *id).cloned())
    }

    async fn notifications_for(
        &self,
        recipient: &UserId,
        limit: usize,
        skip: usize,
    ) -> Result<(Vec<Notification>, usize)> {
        let inner = self.inner.read().await;
        let mut owned: Vec<&Notification> = inner
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient == *recipient)
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = owned.len();
        let page = owned.into_iter().skip(skip).take(limit).cloned().collect();
        Ok((page, total))
    }

    async fn count_unread(&self, recipient: &UserId) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(inner
            .notifications
            .iter()
            .filter(|n| n.recipient == *recipient && !n.is_read)
            .count())
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<Option<Notification>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .notifications
            .iter_mut()
            .find(|n| n.id == *id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let mut modified = 0;
        for n in inner
            .notifications
            .iter_mut()
            .filter(|n| n.recipient == *recipient && !n.is_read)
        {
            n.is_read = true;
            modified += 1;
        }
        Ok(modified)
    }

    async fn record_email_outcome(
        &self,
        id: &NotificationId,
        outcome: std::result::Result<(), String>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let notification = inner
            .notifications
            .iter_mut()
            .find(|n| n.id == *id)
            .ok_or_else(|| HelpdeskError::notification_not_found(id))?;
        match outcome {
            Ok(()) => {
                notification.email_sent = true;
                notification.email_error = None;
            },
            Err(message) => {
                notification.email_sent = false;
                notification.email_error = Some(message);
            },
        }
        Ok(())
    }

    async fn delete_notification(&self, id: &NotificationId) -> Result<Option<Notification>> {
        let mut inner = self.inner.write().await;
        let position = inner.notifications.iter().position(|n| n.id == *id);
        Ok(position.map(|i| inner.notifications.remove(i)))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: &UserId) -> Result<Option<UserProfile>> {
        Ok(self.inner.read().await.users.get(id).cloned())
    }
}
