use crate::core::{Priority, Status, Ticket, UserId};
use crate::policy::TicketScope;
use serde::Deserialize;

/// Caller-supplied ticket filters
///
/// Every set field must match; filters can only narrow a role's scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<UserId>,
}

impl TicketFilter {
    /// Check if a ticket matches all filter criteria
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(status) = self.status {
            if ticket.status != status {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if ticket.priority != priority {
                return false;
            }
        }

        if let Some(assignee) = self.assigned_to {
            if ticket.assigned_to != Some(assignee) {
                return false;
            }
        }

        true
    }
}

/// Role scope combined with caller filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub scope: TicketScope,
    pub filter: TicketFilter,
}

impl TicketQuery {
    #[must_use]
    pub const fn new(scope: TicketScope, filter: TicketFilter) -> Self {
        Self { scope, filter }
    }

    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.scope.matches(ticket) && self.filter.matches(ticket)
    }

    /// Filter and sort tickets newest first
    ///
    /// `tickets` is in insertion order; equal timestamps keep the later
    /// insertion first.
    #[must_use]
    pub fn apply<'a>(&self, tickets: impl IntoIterator<Item = &'a Ticket>) -> Vec<Ticket> {
        let mut matched: Vec<Ticket> = tickets
            .into_iter()
            .filter(|ticket| self.matches(ticket))
            .cloned()
            .collect();
        matched.reverse();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }
}
