use super::{AuditLogger, NotificationDispatcher, NotificationEvent};
use crate::config::TicketConfig;
use crate::core::{
    Actor, AuditAction, NewTicket, Status, Ticket, TicketBuilder, TicketId, TicketLogEntry,
    TicketPatch, UserId,
};
use crate::error::{HelpdeskError, Result};
use crate::policy;
use crate::storage::{TicketFilter, TicketQuery, TicketRepository, TicketUpdate, UserDirectory};
use serde_json::json;
use std::sync::Arc;

/// Attempts at a version-checked update before reporting a conflict
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Ticket lifecycle orchestration
///
/// Every operation authorizes through [`policy`] before touching the store.
/// Audit entries and notifications are written after the mutation commits
/// and cannot undo it.
pub struct TicketService {
    tickets: Arc<dyn TicketRepository>,
    users: Arc<dyn UserDirectory>,
    audit: AuditLogger,
    notifier: Arc<NotificationDispatcher>,
    config: TicketConfig,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        users: Arc<dyn UserDirectory>,
        audit: AuditLogger,
        notifier: Arc<NotificationDispatcher>,
        config: TicketConfig,
    ) -> Self {
        Self {
            tickets,
            users,
            audit,
            notifier,
            config,
        }
    }

    fn validate_subject(&self, subject: &str) -> Result<()> {
        if subject.trim().is_empty() {
            return Err(HelpdeskError::validation("Subject is required"));
        }
        if subject.chars().count() > self.config.subject_max_length {
            return Err(HelpdeskError::validation(format!(
                "Subject cannot exceed {} characters",
                self.config.subject_max_length
            )));
        }
        Ok(())
    }

    fn validate_patch(&self, patch: &TicketPatch) -> Result<()> {
        if let Some(subject) = &patch.subject {
            self.validate_subject(subject)?;
        }
        if patch
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            return Err(HelpdeskError::validation("Description cannot be empty"));
        }
        if patch.department.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(HelpdeskError::validation("Department cannot be empty"));
        }
        Ok(())
    }

    /// File a new ticket on behalf of the actor
    pub async fn create(&self, data: NewTicket, actor: &Actor) -> Result<Ticket> {
        if !policy::can_create_ticket(actor) {
            return Err(HelpdeskError::forbidden(format!(
                "Role {} cannot create tickets",
                actor.role
            )));
        }
        self.validate_subject(&data.subject)?;
        if data.description.trim().is_empty() {
            return Err(HelpdeskError::validation("Description is required"));
        }

        let department = data
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.config.default_department)
            .to_string();

        let ticket = TicketBuilder::new()
            .subject(data.subject.trim())
            .description(data.description.trim())
            .status(Status::Open)
            .priority(data.priority.unwrap_or_default())
            .ticket_type(data.ticket_type.unwrap_or_default())
            .department(department)
            .created_by(actor.id)
            .build();

        self.tickets.insert_ticket(&ticket).await?;
        tracing::info!(
            ticket_id = %ticket.id,
            actor_id = %actor.id,
            department = %ticket.department,
            "ticket created"
        );

        self.audit
            .record_after_commit(
                ticket.id,
                AuditAction::TicketCreated,
                actor.id,
                None,
                serde_json::to_value(&ticket).ok(),
            )
            .await;
        self.notifier
            .notify(NotificationEvent::ticket_created(&ticket))
            .await;

        Ok(ticket)
    }

    /// Tickets visible to the actor, narrowed by the caller's filter, newest first
    pub async fn list(&self, filter: TicketFilter, actor: &Actor) -> Result<Vec<Ticket>> {
        let query = TicketQuery::new(policy::scope_filter(actor), filter);
        self.tickets.find_tickets(&query).await
    }

    async fn load(&self, id: TicketId) -> Result<Ticket> {
        self.tickets
            .get_ticket(&id)
            .await?
            .ok_or_else(|| HelpdeskError::ticket_not_found(id))
    }

    pub async fn get(&self, id: TicketId, actor: &Actor) -> Result<Ticket> {
        let ticket = self.load(id).await?;
        policy::ensure_can_view(actor, &ticket)?;
        Ok(ticket)
    }

    /// Apply a partial update
    ///
    /// The write is conditional on the version that was authorized, so the
    /// audit diff always describes the record actually replaced. A concurrent
    /// writer causes a re-read and re-check, up to [`MAX_UPDATE_ATTEMPTS`].
    pub async fn update(&self, id: TicketId, patch: TicketPatch, actor: &Actor) -> Result<Ticket> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let current = self.load(id).await?;
            self.validate_patch(&patch)?;
            policy::can_update(actor, &current, &patch)?;

            match self
                .tickets
                .update_ticket(&id, &patch, current.version)
                .await?
            {
                TicketUpdate::Applied { before, after } => {
                    tracing::info!(
                        ticket_id = %id,
                        actor_id = %actor.id,
                        version = after.version,
                        "ticket updated"
                    );
                    self.record_changes(&before, &after, &patch, actor).await;
                    return Ok(after);
                },
                TicketUpdate::Stale { current_version } => {
                    tracing::debug!(
                        ticket_id = %id,
                        attempt,
                        expected = current.version,
                        current_version,
                        "stale ticket version, retrying"
                    );
                },
                TicketUpdate::Missing => return Err(HelpdeskError::ticket_not_found(id)),
            }
        }

        tracing::warn!(ticket_id = %id, actor_id = %actor.id, "ticket update kept conflicting");
        Err(HelpdeskError::Conflict(format!(
            "Ticket {id} was modified concurrently, please retry"
        )))
    }

    /// Audit and notify status and assignment changes; other fields are silent
    async fn record_changes(
        &self,
        before: &Ticket,
        after: &Ticket,
        patch: &TicketPatch,
        actor: &Actor,
    ) {
        if patch.status.is_some() && before.status != after.status {
            self.audit
                .record_after_commit(
                    after.id,
                    AuditAction::StatusUpdated,
                    actor.id,
                    Some(json!({ "status": before.status })),
                    Some(json!({ "status": after.status })),
                )
                .await;
            self.notifier
                .notify(NotificationEvent::status_changed(after, actor.id))
                .await;
        }

        if patch.assigned_to.is_some() && before.assigned_to != after.assigned_to {
            self.audit
                .record_after_commit(
                    after.id,
                    AuditAction::TicketAssigned,
                    actor.id,
                    Some(json!({ "assignedTo": before.assigned_to })),
                    Some(json!({ "assignedTo": after.assigned_to })),
                )
                .await;
            if let Some(assignee) = after.assigned_to {
                self.notify_assignee(after, assignee, actor.id).await;
            }
        }
    }

    async fn notify_assignee(&self, ticket: &Ticket, assignee: UserId, assigned_by: UserId) {
        match self.users.find_user(&assignee).await {
            Ok(Some(_)) => {
                self.notifier
                    .notify(NotificationEvent::ticket_assigned(ticket, assignee, assigned_by))
                    .await;
            },
            Ok(None) => tracing::error!(
                ticket_id = %ticket.id,
                assignee_id = %assignee,
                "assigned agent not found, skipping notification"
            ),
            Err(e) => tracing::error!(
                ticket_id = %ticket.id,
                assignee_id = %assignee,
                error = %e,
                "assignee lookup failed, skipping notification"
            ),
        }
    }

    /// Close a ticket; any role allowed to update may close directly
    pub async fn close(&self, id: TicketId, actor: &Actor) -> Result<Ticket> {
        self.update(id, TicketPatch::status(Status::Closed), actor)
            .await
    }

    /// Delete a ticket; notes, audit entries and notifications are left in place
    pub async fn remove(&self, id: TicketId, actor: &Actor) -> Result<Ticket> {
        if !policy::can_delete(actor) {
            return Err(HelpdeskError::forbidden("Not authorized to delete tickets"));
        }
        let removed = self
            .tickets
            .delete_ticket(&id)
            .await?
            .ok_or_else(|| HelpdeskError::ticket_not_found(id))?;
        tracing::info!(ticket_id = %id, actor_id = %actor.id, "ticket deleted");
        Ok(removed)
    }

    /// Audit trail of a ticket, newest first
    pub async fn history(&self, id: TicketId, actor: &Actor) -> Result<Vec<TicketLogEntry>> {
        let ticket = self.load(id).await?;
        if !policy::can_view_history(actor) {
            return Err(HelpdeskError::forbidden(
                "Not authorized to view ticket history",
            ));
        }
        self.audit.list_for(ticket.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailConfig;
    use crate::core::{NotificationType, Priority, TicketType};
    use crate::test_utils::TestDesk;

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let desk = TestDesk::new();
        let ticket = desk
            .helpdesk
            .tickets
            .create(NewTicket::new("  Printer jam ", "Tray 2"), &desk.user)
            .await
            .unwrap();

        assert_eq!(ticket.subject, "Printer jam");
        assert_eq!(ticket.status, Status::Open);
        assert_eq!(ticket.priority, Priority::Medium);
        assert_eq!(ticket.ticket_type, TicketType::Incident);
        assert_eq!(ticket.department, "General");
        assert_eq!(ticket.created_by, desk.user.id);
        assert_eq!(ticket.assigned_to, None);

        let log = desk.helpdesk.audit.list_for(ticket.id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, AuditAction::TicketCreated);
        assert_eq!(log[0].new_value.as_ref().unwrap()["subject"], "Printer jam");

        let inbox = desk.notifications_for(desk.user.id).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationType::TicketCreated);
        assert_eq!(inbox[0].title, "Ticket Created Successfully");
    }

    #[tokio::test]
    async fn test_create_validation_and_role_gate() {
        let desk = TestDesk::new();
        let tickets = &desk.helpdesk.tickets;

        let err = tickets
            .create(NewTicket::new("", "desc"), &desk.user)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Validation(_)));

        let err = tickets
            .create(NewTicket::new("subject", "  "), &desk.user)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Validation(_)));

        let err = tickets
            .create(NewTicket::new("x".repeat(201), "desc"), &desk.user)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Validation(_)));

        let err = tickets
            .create(NewTicket::new("subject", "desc"), &desk.agent)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_not_found_then_forbidden() {
        let desk = TestDesk::new();
        let tickets = &desk.helpdesk.tickets;

        let err = tickets.get(TicketId::new(), &desk.user).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let foreign = desk.ticket_by(&desk.manager).await;
        let err = tickets.get(foreign.id, &desk.user).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        assert!(tickets.get(foreign.id, &desk.agent).await.is_ok());
    }

    #[tokio::test]
    async fn test_agent_priority_forbidden_description_silent() {
        let desk = TestDesk::new();
        let ticket = desk
            .helpdesk
            .tickets
            .create(
                NewTicket::new("Slow VPN", "since Monday").with_priority(Priority::Low),
                &desk.user,
            )
            .await
            .unwrap();
        let tickets = &desk.helpdesk.tickets;

        let err = tickets
            .update(ticket.id, TicketPatch::priority(Priority::High), &desk.agent)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden(_)));

        let updated = tickets
            .update(ticket.id, TicketPatch::description("since Friday"), &desk.agent)
            .await
            .unwrap();
        assert_eq!(updated.description, "since Friday");
        assert_eq!(updated.version, ticket.version + 1);

        let log = desk.helpdesk.audit.list_for(ticket.id).await.unwrap();
        assert_eq!(log.len(), 1, "only the creation entry");
    }

    #[tokio::test]
    async fn test_close_logs_status_and_notifies_creator() {
        let desk = TestDesk::new();
        let ticket = desk.ticket_by(&desk.user).await;
        let before = desk.notifications_for(desk.user.id).await.len();

        let closed = desk.helpdesk.tickets.close(ticket.id, &desk.agent).await.unwrap();
        assert_eq!(closed.status, Status::Closed);

        let log = desk.helpdesk.audit.list_for(ticket.id).await.unwrap();
        let status_entries: Vec<_> = log
            .iter()
            .filter(|e| e.action == AuditAction::StatusUpdated)
            .collect();
        assert_eq!(status_entries.len(), 1);
        assert_eq!(status_entries[0].old_value, Some(json!({"status": "Open"})));
        assert_eq!(status_entries[0].new_value, Some(json!({"status": "Closed"})));
        assert_eq!(status_entries[0].performed_by, desk.agent.id);

        let inbox = desk.notifications_for(desk.user.id).await;
        assert_eq!(inbox.len(), before + 1);
        assert_eq!(inbox[0].kind, NotificationType::TicketUpdated);
        assert_eq!(
            inbox[0].message,
            format!("Your ticket #{} status changed to Closed", ticket.id)
        );
    }

    #[tokio::test]
    async fn test_restating_status_is_not_logged() {
        let desk = TestDesk::new();
        let ticket = desk.ticket_by(&desk.user).await;
        desk.helpdesk
            .tickets
            .update(ticket.id, TicketPatch::status(Status::Open), &desk.user)
            .await
            .unwrap();
        assert_eq!(desk.helpdesk.audit.list_for(ticket.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assignment_logged_and_notified() {
        let desk = TestDesk::new();
        let ticket = desk.ticket_by(&desk.user).await;
        let tickets = &desk.helpdesk.tickets;

        tickets
            .update(ticket.id, TicketPatch::assign(Some(desk.agent.id)), &desk.manager)
            .await
            .unwrap();
        let inbox = desk.notifications_for(desk.agent.id).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationType::TicketAssigned);
        assert_eq!(inbox[0].ticket, Some(ticket.id));

        // Unassigning is logged but nobody is notified
        tickets
            .update(ticket.id, TicketPatch::assign(None), &desk.admin)
            .await
            .unwrap();
        let log = desk.helpdesk.audit.list_for(ticket.id).await.unwrap();
        assert_eq!(log[0].action, AuditAction::TicketAssigned);
        assert_eq!(log[0].old_value, Some(json!({"assignedTo": desk.agent.id})));
        assert_eq!(log[0].new_value, Some(json!({"assignedTo": null})));
        assert_eq!(desk.notifications_for(desk.agent.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_assignee_skips_notification() {
        let desk = TestDesk::new();
        let ticket = desk.ticket_by(&desk.user).await;
        let ghost = UserId::new();

        let updated = desk
            .helpdesk
            .tickets
            .update(ticket.id, TicketPatch::assign(Some(ghost)), &desk.admin)
            .await
            .unwrap();
        assert_eq!(updated.assigned_to, Some(ghost));
        assert!(desk.notifications_for(ghost).await.is_empty());

        let log = desk.helpdesk.audit.list_for(ticket.id).await.unwrap();
        assert_eq!(log[0].action, AuditAction::TicketAssigned);
    }

    #[tokio::test]
    async fn test_agent_cannot_self_assign() {
        let desk = TestDesk::new();
        let ticket = desk.ticket_by(&desk.user).await;
        let err = desk
            .helpdesk
            .tickets
            .update(ticket.id, TicketPatch::assign(Some(desk.agent.id)), &desk.agent)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_remove_gates_and_does_not_cascade() {
        let desk = TestDesk::new();
        let ticket = desk.ticket_by(&desk.user).await;
        desk.helpdesk
            .notes
            .add(ticket.id, "note", false, &desk.user)
            .await
            .unwrap();
        let tickets = &desk.helpdesk.tickets;

        for actor in [&desk.user, &desk.agent, &desk.manager] {
            let err = tickets.remove(ticket.id, actor).await.unwrap_err();
            assert!(matches!(err, HelpdeskError::Forbidden(_)));
        }

        tickets.remove(ticket.id, &desk.super_admin).await.unwrap();
        let err = tickets.remove(ticket.id, &desk.admin).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { .. }));

        // Children outlive the ticket
        assert!(!desk.helpdesk.audit.list_for(ticket.id).await.unwrap().is_empty());
        assert!(!desk.notifications_for(desk.user.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_history_gates() {
        let desk = TestDesk::new();
        let ticket = desk.ticket_by(&desk.user).await;
        let tickets = &desk.helpdesk.tickets;

        let err = tickets.history(TicketId::new(), &desk.agent).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { .. }));

        for actor in [&desk.user, &desk.manager] {
            let err = tickets.history(ticket.id, actor).await.unwrap_err();
            assert!(matches!(err, HelpdeskError::Forbidden(_)));
        }
        for actor in [&desk.agent, &desk.admin, &desk.super_admin] {
            assert_eq!(tickets.history(ticket.id, actor).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_list_scoping() {
        let desk = TestDesk::new();
        let mine = desk.ticket_by(&desk.user).await;
        let _theirs = desk.ticket_by(&desk.manager).await;

        let listed = desk
            .helpdesk
            .tickets
            .list(TicketFilter::default(), &desk.user)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);

        let all = desk
            .helpdesk
            .tickets
            .list(TicketFilter::default(), &desk.admin)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_persistent_version_conflict_fails_with_conflict() {
        let desk = TestDesk::contended();
        let ticket = desk.ticket_by(&desk.user).await;

        let err = desk
            .helpdesk
            .tickets
            .close(ticket.id, &desk.agent)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert!(err.is_recoverable());
        assert_eq!(desk.helpdesk.audit.list_for(ticket.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_broken_side_effects_do_not_fail_mutations() {
        let desk = TestDesk::with_broken_side_effects();
        let ticket = desk.ticket_by(&desk.user).await;

        let closed = desk.helpdesk.tickets.close(ticket.id, &desk.agent).await.unwrap();
        assert!(closed.is_closed());
        assert_eq!(
            desk.helpdesk.tickets.get(ticket.id, &desk.user).await.unwrap().status,
            Status::Closed
        );
        assert!(desk.helpdesk.audit.list_for(ticket.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_of_missing_ticket_is_not_found_before_validation() {
        let desk = TestDesk::new();
        let patch = TicketPatch {
            subject: Some("   ".to_string()),
            ..TicketPatch::default()
        };

        let err = desk
            .helpdesk
            .tickets
            .update(TicketId::new(), patch.clone(), &desk.admin)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { .. }));

        let ticket = desk.ticket_by(&desk.user).await;
        let err = desk
            .helpdesk
            .tickets
            .update(ticket.id, patch, &desk.admin)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Validation(_)));
    }

    #[tokio::test]
    async fn test_email_outcomes_recorded_on_notification() {
        let desk = TestDesk::new();
        let first = desk.ticket_by(&desk.user).await;
        desk.helpdesk.shutdown().await;

        let inbox = desk.notifications_for(desk.user.id).await;
        assert!(inbox[0].email_sent);
        let sent = desk.emails.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "uma@example.com");
        let link = format!("{}/tickets/{}", EmailConfig::default().client_url, first.id);
        assert!(sent[0].html.contains(&format!("href=\"{link}\"")));

        desk.emails.fail_with("smtp down");
        let second = desk.ticket_by(&desk.user).await;
        desk.helpdesk.shutdown().await;

        let inbox = desk.notifications_for(desk.user.id).await;
        let failed = inbox.iter().find(|n| n.ticket == Some(second.id)).unwrap();
        assert!(!failed.email_sent);
        assert!(!failed.is_read);
        assert_eq!(failed.email_error.as_deref(), Some("email delivery failed: smtp down"));
    }
}
