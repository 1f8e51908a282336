//! Best-effort notification dispatch
//!
//! The in-app record is written before `dispatch` returns, so the caller's
//! response always agrees with what the recipient will see. Email delivery
//! runs on a tracked background task bounded by the configured timeout; its
//! outcome is written back onto the record and never reaches the caller.

use crate::config::EmailConfig;
use crate::core::{
    Note, Notification, NotificationId, NotificationType, Ticket, TicketId, UserId,
};
use crate::email::{EmailMessage, EmailSender, is_valid_address};
use crate::error::{DispatchError, HelpdeskError, Result};
use crate::storage::{NotificationRepository, UserDirectory};
use crate::templates::{EmailContext, render_email};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// Something a recipient should be told about
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub recipient: UserId,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_user: Option<UserId>,
    /// Snapshot used for the email body and the record's ticket reference
    pub ticket: Option<Ticket>,
    pub note: Option<Note>,
}

impl NotificationEvent {
    #[must_use]
    pub fn new(
        recipient: UserId,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            related_user: None,
            ticket: None,
            note: None,
        }
    }

    #[must_use]
    pub fn about_ticket(mut self, ticket: &Ticket) -> Self {
        self.ticket = Some(ticket.clone());
        self
    }

    #[must_use]
    pub const fn related_to(mut self, user: UserId) -> Self {
        self.related_user = Some(user);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: &Note) -> Self {
        self.note = Some(note.clone());
        self
    }

    /// Confirmation to the creator of a new ticket
    #[must_use]
    pub fn ticket_created(ticket: &Ticket) -> Self {
        Self::new(
            ticket.created_by,
            NotificationType::TicketCreated,
            "Ticket Created Successfully",
            format!("Your ticket #{} has been created", ticket.id),
        )
        .about_ticket(ticket)
    }

    /// Status change, sent to the ticket creator
    #[must_use]
    pub fn status_changed(ticket: &Ticket, changed_by: UserId) -> Self {
        Self::new(
            ticket.created_by,
            NotificationType::TicketUpdated,
            "Ticket Status Updated",
            format!("Your ticket #{} status changed to {}", ticket.id, ticket.status),
        )
        .about_ticket(ticket)
        .related_to(changed_by)
    }

    #[must_use]
    pub fn ticket_assigned(ticket: &Ticket, assignee: UserId, assigned_by: UserId) -> Self {
        Self::new(
            assignee,
            NotificationType::TicketAssigned,
            "Ticket Assigned",
            format!("You have been assigned to ticket #{}", ticket.id),
        )
        .about_ticket(ticket)
        .related_to(assigned_by)
    }

    /// External note, sent to the ticket creator
    #[must_use]
    pub fn note_on_your_ticket(ticket: &Ticket, note: &Note) -> Self {
        Self::new(
            ticket.created_by,
            NotificationType::NoteAdded,
            "New Note on Your Ticket",
            format!("A new note has been added to ticket #{}", ticket.id),
        )
        .about_ticket(ticket)
        .related_to(note.user)
        .with_note(note)
    }

    /// Note written by the end user, sent to the assigned agent
    #[must_use]
    pub fn note_on_assigned_ticket(
        ticket: &Ticket,
        note: &Note,
        assignee: UserId,
        author_name: &str,
    ) -> Self {
        Self::new(
            assignee,
            NotificationType::NoteAdded,
            "New Note on Assigned Ticket",
            format!("{author_name} added a note to ticket #{}", ticket.id),
        )
        .about_ticket(ticket)
        .related_to(note.user)
        .with_note(note)
    }

    fn ticket_id(&self) -> Option<TicketId> {
        self.ticket.as_ref().map(|t| t.id)
    }

    fn to_notification(&self) -> Notification {
        let mut notification =
            Notification::new(self.recipient, self.kind, &self.title, &self.message);
        if let Some(ticket) = &self.ticket {
            notification = notification
                .for_ticket(ticket.id)
                .with_metadata("ticketSubject", &ticket.subject)
                .with_metadata("ticketStatus", ticket.status.to_string());
        }
        if let Some(user) = self.related_user {
            notification = notification.related_to(user);
        }
        if let Some(note) = &self.note {
            notification = notification.with_metadata("noteId", note.id.to_string());
        }
        notification
    }
}

/// One page of a recipient's notifications
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total: usize,
}

/// Creates notification records and delivers their emails
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserDirectory>,
    email: Arc<dyn EmailSender>,
    config: EmailConfig,
    page_size: usize,
    tasks: TaskTracker,
}

impl NotificationDispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserDirectory>,
        email: Arc<dyn EmailSender>,
        config: EmailConfig,
        page_size: usize,
    ) -> Self {
        Self {
            notifications,
            users,
            email,
            config,
            page_size,
            tasks: TaskTracker::new(),
        }
    }

    /// Persist the notification and start email delivery in the background
    ///
    /// Only the record write can fail here; delivery failures are written
    /// onto the record by the background task.
    pub async fn dispatch(
        &self,
        event: NotificationEvent,
    ) -> std::result::Result<Notification, DispatchError> {
        let notification = event.to_notification();
        self.notifications
            .insert_notification(&notification)
            .await?;

        tracing::debug!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient,
            kind = %notification.kind,
            ticket_id = ?event.ticket_id(),
            "notification created"
        );

        if self.config.enabled {
            self.spawn_email(notification.clone(), event);
        }
        Ok(notification)
    }

    /// Dispatch, logging and discarding any failure
    pub async fn notify(&self, event: NotificationEvent) {
        let recipient = event.recipient;
        let kind = event.kind;
        if let Err(e) = self.dispatch(event).await {
            tracing::warn!(
                recipient_id = %recipient,
                kind = %kind,
                error = %e,
                "notification dropped"
            );
        }
    }

    fn spawn_email(&self, notification: Notification, event: NotificationEvent) {
        let delivery = EmailDelivery {
            notifications: Arc::clone(&self.notifications),
            users: Arc::clone(&self.users),
            email: Arc::clone(&self.email),
            config: self.config.clone(),
        };
        self.tasks.spawn(delivery.run(notification, event));
    }

    /// Wait for every in-flight email task to finish
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Number of email tasks still running
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Newest-first page of the actor's notifications; `limit` falls back to the page size
    pub async fn list(
        &self,
        actor: UserId,
        limit: Option<usize>,
        skip: usize,
    ) -> Result<NotificationPage> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(self.page_size);
        let (notifications, total) = self
            .notifications
            .notifications_for(&actor, limit, skip)
            .await?;
        Ok(NotificationPage {
            notifications,
            total,
        })
    }

    pub async fn unread_count(&self, actor: UserId) -> Result<usize> {
        self.notifications.count_unread(&actor).await
    }

    async fn owned(&self, id: NotificationId, actor: UserId, verb: &str) -> Result<Notification> {
        let notification = self
            .notifications
            .get_notification(&id)
            .await?
            .ok_or_else(|| HelpdeskError::notification_not_found(id))?;
        if !notification.is_owned_by(actor) {
            return Err(HelpdeskError::forbidden(format!(
                "Not authorized to {verb} this notification"
            )));
        }
        Ok(notification)
    }

    pub async fn mark_read(&self, id: NotificationId, actor: UserId) -> Result<Notification> {
        self.owned(id, actor, "mark").await?;
        self.notifications
            .mark_read(&id)
            .await?
            .ok_or_else(|| HelpdeskError::notification_not_found(id))
    }

    /// Mark every unread notification of the actor read, returning how many changed
    pub async fn mark_all_read(&self, actor: UserId) -> Result<usize> {
        let modified = self.notifications.mark_all_read(&actor).await?;
        tracing::debug!(actor_id = %actor, modified, "notifications marked read");
        Ok(modified)
    }

    pub async fn delete(&self, id: NotificationId, actor: UserId) -> Result<Notification> {
        self.owned(id, actor, "delete").await?;
        self.notifications
            .delete_notification(&id)
            .await?
            .ok_or_else(|| HelpdeskError::notification_not_found(id))
    }
}

struct EmailDelivery {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserDirectory>,
    email: Arc<dyn EmailSender>,
    config: EmailConfig,
}

impl EmailDelivery {
    async fn run(self, notification: Notification, event: NotificationEvent) {
        let outcome = match self.deliver(&notification, &event).await {
            Ok(()) => {
                tracing::debug!(notification_id = %notification.id, "notification email sent");
                Ok(())
            },
            Err(e) => {
                tracing::warn!(
                    notification_id = %notification.id,
                    recipient_id = %notification.recipient,
                    error = %e,
                    "notification email failed"
                );
                Err(e.to_string())
            },
        };

        if let Err(e) = self
            .notifications
            .record_email_outcome(&notification.id, outcome)
            .await
        {
            tracing::warn!(
                notification_id = %notification.id,
                error = %e,
                "failed to record email outcome"
            );
        }
    }

    async fn deliver(
        &self,
        notification: &Notification,
        event: &NotificationEvent,
    ) -> std::result::Result<(), DispatchError> {
        let recipient = self
            .users
            .find_user(&notification.recipient)
            .await?
            .ok_or_else(|| DispatchError::RecipientNotFound(notification.recipient.to_string()))?;

        if !is_valid_address(&recipient.email) {
            return Err(DispatchError::Email(format!(
                "invalid recipient address '{}'",
                recipient.email
            )));
        }

        let mut context =
            EmailContext::new(&recipient.name, &notification.title, &notification.message);
        if let Some(ticket) = &event.ticket {
            context = context.with_ticket(ticket.clone(), self.config.ticket_link(ticket.id));
        }
        if let Some(note) = &event.note {
            context = context.with_note(note);
        }

        let message = EmailMessage {
            to: recipient.email,
            subject: notification.title.clone(),
            html: render_email(notification.kind, &context)?,
        };

        tokio::time::timeout(self.config.timeout(), self.email.send(&message))
            .await
            .unwrap_or(Err(DispatchError::Timeout(self.config.timeout_secs)))
    }
}
