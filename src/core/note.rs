use super::{Actor, NoteId, TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An annotation on a ticket
///
/// `is_internal` implies `is_staff`. The constructor derives both flags from
/// the author's role, so a client-supplied internal flag is never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub ticket: TicketId,
    /// Author
    pub user: UserId,
    pub text: String,
    pub is_staff: bool,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl Note {
    #[must_use]
    pub fn new(ticket: TicketId, author: &Actor, text: impl Into<String>, internal: bool) -> Self {
        let is_staff = author.role.is_staff();
        Self {
            id: NoteId::new(),
            ticket,
            user: author.id,
            text: text.into(),
            is_staff,
            is_internal: internal && is_staff,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;

    #[test]
    fn test_user_cannot_create_internal_note() {
        let user = Actor::new(UserId::new(), Role::User);
        let note = Note::new(TicketId::new(), &user, "hello", true);
        assert!(!note.is_staff);
        assert!(!note.is_internal);
    }

    #[test]
    fn test_staff_internal_flag_is_honoured() {
        let agent = Actor::new(UserId::new(), Role::Agent);
        let note = Note::new(TicketId::new(), &agent, "checked logs", true);
        assert!(note.is_staff);
        assert!(note.is_internal);

        let note = Note::new(TicketId::new(), &agent, "reply", false);
        assert!(!note.is_internal);
    }
}
