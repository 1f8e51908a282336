use super::{NotificationId, TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    TicketCreated,
    TicketAssigned,
    TicketUpdated,
    NoteAdded,
    /// Reserved: nothing raises SLA breaches yet
    SlaBreach,
}

impl NotificationType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TicketCreated => "TICKET_CREATED",
            Self::TicketAssigned => "TICKET_ASSIGNED",
            Self::TicketUpdated => "TICKET_UPDATED",
            Self::NoteAdded => "NOTE_ADDED",
            Self::SlaBreach => "SLA_BREACH",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-app notification with the outcome of its email delivery attempt
///
/// After creation only the read flag and the email outcome ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub ticket: Option<TicketId>,
    pub related_user: Option<UserId>,
    pub is_read: bool,
    pub email_sent: bool,
    pub email_error: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(
        recipient: UserId,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            ticket: None,
            related_user: None,
            is_read: false,
            email_sent: false,
            email_error: None,
            metadata: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn for_ticket(mut self, ticket: TicketId) -> Self {
        self.ticket = Some(ticket);
        self
    }

    #[must_use]
    pub const fn related_to(mut self, user: UserId) -> Self {
        self.related_user = Some(user);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.recipient == user
    }
}
