use super::{AuditLogger, NotificationDispatcher, NotificationEvent};
use crate::core::{Actor, AuditAction, Note, NoteId, Role, Ticket, TicketId, UserId};
use crate::error::{HelpdeskError, Result};
use crate::policy;
use crate::storage::{NoteRepository, TicketRepository, UserDirectory};
use serde_json::json;
use std::sync::Arc;

/// Ticket annotations with staff-only visibility
pub struct NoteService {
    tickets: Arc<dyn TicketRepository>,
    notes: Arc<dyn NoteRepository>,
    users: Arc<dyn UserDirectory>,
    audit: AuditLogger,
    notifier: Arc<NotificationDispatcher>,
}

impl NoteService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        notes: Arc<dyn NoteRepository>,
        users: Arc<dyn UserDirectory>,
        audit: AuditLogger,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            tickets,
            notes,
            users,
            audit,
            notifier,
        }
    }

    async fn load_ticket(&self, id: TicketId) -> Result<Ticket> {
        self.tickets
            .get_ticket(&id)
            .await?
            .ok_or_else(|| HelpdeskError::ticket_not_found(id))
    }

    /// Add a note to a ticket
    ///
    /// The internal flag is honoured only for staff authors. External notes
    /// notify the ticket creator, and notes written by an end user also
    /// notify the assignee.
    pub async fn add(
        &self,
        ticket_id: TicketId,
        text: &str,
        internal: bool,
        actor: &Actor,
    ) -> Result<Note> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HelpdeskError::validation("Note text is required"));
        }

        let ticket = self.load_ticket(ticket_id).await?;
        policy::ensure_can_annotate(actor, &ticket)?;

        let note = Note::new(ticket.id, actor, text, internal);
        if ticket.is_closed() && !note.is_internal {
            return Err(HelpdeskError::validation(
                "Cannot add a note to a closed ticket",
            ));
        }

        self.notes.insert_note(&note).await?;
        tracing::info!(
            ticket_id = %ticket.id,
            note_id = %note.id,
            actor_id = %actor.id,
            internal = note.is_internal,
            "note added"
        );

        let action = if note.is_internal {
            AuditAction::InternalNoteAdded
        } else {
            AuditAction::NoteAdded
        };
        self.audit
            .record_after_commit(
                ticket.id,
                action,
                actor.id,
                None,
                Some(json!({ "text": note.text, "isInternal": note.is_internal })),
            )
            .await;

        if !note.is_internal {
            self.notify_note_added(&ticket, &note, actor).await;
        }

        Ok(note)
    }

    async fn notify_note_added(&self, ticket: &Ticket, note: &Note, actor: &Actor) {
        self.notifier
            .notify(NotificationEvent::note_on_your_ticket(ticket, note))
            .await;

        let Some(assignee) = ticket.assigned_to else {
            return;
        };
        if actor.role != Role::User {
            return;
        }
        if !self.resolves(assignee).await {
            tracing::warn!(
                ticket_id = %ticket.id,
                assignee_id = %assignee,
                "assignee not found, skipping note notification"
            );
            return;
        }

        let author_name = self.display_name(actor.id).await;
        self.notifier
            .notify(NotificationEvent::note_on_assigned_ticket(
                ticket,
                note,
                assignee,
                &author_name,
            ))
            .await;
    }

    async fn resolves(&self, user: UserId) -> bool {
        matches!(self.users.find_user(&user).await, Ok(Some(_)))
    }

    async fn display_name(&self, user: UserId) -> String {
        match self.users.find_user(&user).await {
            Ok(Some(profile)) => profile.name,
            _ => "A user".to_string(),
        }
    }

    /// Notes of a ticket in written order, internal notes hidden from end users
    pub async fn list(&self, ticket_id: TicketId, actor: &Actor) -> Result<Vec<Note>> {
        let ticket = self.load_ticket(ticket_id).await?;
        policy::ensure_can_view(actor, &ticket)?;

        let notes = self.notes.notes_for_ticket(&ticket.id).await?;
        Ok(notes
            .into_iter()
            .filter(|note| policy::can_view_note(actor, note))
            .collect())
    }

    /// Delete a note, recording its text in the audit trail first
    pub async fn delete(&self, ticket_id: TicketId, note_id: NoteId, actor: &Actor) -> Result<Note> {
        let note = self
            .notes
            .get_note(&note_id)
            .await?
            .ok_or_else(|| HelpdeskError::note_not_found(note_id))?;

        if note.ticket != ticket_id {
            return Err(HelpdeskError::validation(
                "Note does not belong to this ticket",
            ));
        }
        if !policy::can_delete_note(actor, &note) {
            return Err(HelpdeskError::forbidden("Not authorized to delete this note"));
        }

        self.audit
            .record_after_commit(
                ticket_id,
                AuditAction::NoteDeleted,
                actor.id,
                None,
                Some(json!({ "text": note.text, "noteId": note.id })),
            )
            .await;

        let deleted = self
            .notes
            .delete_note(&note_id)
            .await?
            .ok_or_else(|| HelpdeskError::note_not_found(note_id))?;
        tracing::info!(ticket_id = %ticket_id, note_id = %note_id, actor_id = %actor.id, "note deleted");
        Ok(deleted)
    }
}
