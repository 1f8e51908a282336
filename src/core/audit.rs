use super::{LogEntryId, TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kinds of change recorded in a ticket's audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "Ticket Created")]
    TicketCreated,
    #[serde(rename = "Status Updated")]
    StatusUpdated,
    #[serde(rename = "Ticket Assigned")]
    TicketAssigned,
    #[serde(rename = "Note Added")]
    NoteAdded,
    #[serde(rename = "Internal Note Added")]
    InternalNoteAdded,
    #[serde(rename = "Note Deleted")]
    NoteDeleted,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TicketCreated => "Ticket Created",
            Self::StatusUpdated => "Status Updated",
            Self::TicketAssigned => "Ticket Assigned",
            Self::NoteAdded => "Note Added",
            Self::InternalNoteAdded => "Internal Note Added",
            Self::NoteDeleted => "Note Deleted",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry of a ticket's audit trail
///
/// `old_value`/`new_value` hold partial snapshots containing only the fields
/// that changed, keyed by their wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLogEntry {
    pub id: LogEntryId,
    pub ticket: TicketId,
    pub action: AuditAction,
    pub performed_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl TicketLogEntry {
    #[must_use]
    pub fn new(
        ticket: TicketId,
        action: AuditAction,
        performed_by: UserId,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            ticket,
            action,
            performed_by,
            old_value,
            new_value,
            created_at: Utc::now(),
        }
    }
}
