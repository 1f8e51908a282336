use crate::core::{AuditAction, TicketId, TicketLogEntry, UserId};
use crate::error::Result;
use crate::storage::AuditRepository;
use serde_json::Value;
use std::sync::Arc;

/// Append-only writer and reader of the ticket audit trail
#[derive(Clone)]
pub struct AuditLogger {
    repo: Arc<dyn AuditRepository>,
}

impl AuditLogger {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    /// Append one entry
    pub async fn record(
        &self,
        ticket: TicketId,
        action: AuditAction,
        performed_by: UserId,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) -> Result<TicketLogEntry> {
        let entry = TicketLogEntry::new(ticket, action, performed_by, old_value, new_value);
        self.repo.append_entry(&entry).await?;
        tracing::debug!(
            ticket_id = %ticket,
            actor_id = %performed_by,
            action = %action,
            "audit entry recorded"
        );
        Ok(entry)
    }

    /// Append one entry on behalf of a mutation that has already committed
    ///
    /// A failed append is logged and dropped; the mutation stands.
    pub async fn record_after_commit(
        &self,
        ticket: TicketId,
        action: AuditAction,
        performed_by: UserId,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) {
        if let Err(e) = self
            .record(ticket, action, performed_by, old_value, new_value)
            .await
        {
            tracing::error!(
                ticket_id = %ticket,
                actor_id = %performed_by,
                action = %action,
                error = %e,
                "failed to append audit entry, trail has a gap"
            );
        }
    }

    /// Entries of a ticket, newest first
    pub async fn list_for(&self, ticket: TicketId) -> Result<Vec<TicketLogEntry>> {
        self.repo.entries_for_ticket(&ticket).await
    }
}
