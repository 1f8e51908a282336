use super::{Priority, Status, Ticket, TicketId, TicketType, UserId, DEFAULT_DEPARTMENT};
use chrono::{DateTime, Utc};

/// Builder for creating Ticket instances
#[derive(Default)]
pub struct TicketBuilder {
    id: Option<TicketId>,
    subject: Option<String>,
    description: Option<String>,
    status: Option<Status>,
    priority: Option<Priority>,
    ticket_type: Option<TicketType>,
    department: Option<String>,
    created_by: Option<UserId>,
    assigned_to: Option<UserId>,
    created_at: Option<DateTime<Utc>>,
}

impl TicketBuilder {
    /// Create a new ticket builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ticket ID
    #[must_use]
    pub const fn id(mut self, id: TicketId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status
    #[must_use]
    pub const fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the priority
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn ticket_type(mut self, ticket_type: TicketType) -> Self {
        self.ticket_type = Some(ticket_type);
        self
    }

    #[must_use]
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Set the creator
    #[must_use]
    pub const fn created_by(mut self, user: UserId) -> Self {
        self.created_by = Some(user);
        self
    }

    /// Set assignee
    #[must_use]
    pub const fn assigned_to(mut self, user: UserId) -> Self {
        self.assigned_to = Some(user);
        self
    }

    /// Set `created_at` timestamp
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Build the ticket
    pub fn build(self) -> Ticket {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Ticket {
            id: self.id.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            ticket_type: self.ticket_type.unwrap_or_default(),
            department: self
                .department
                .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
            created_by: self.created_by.unwrap_or_default(),
            assigned_to: self.assigned_to,
            created_at,
            updated_at: created_at,
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_builder() {
        let creator = UserId::new();
        let ticket = TicketBuilder::new()
            .subject("VPN down")
            .description("Cannot reach the office network")
            .priority(Priority::High)
            .department("IT")
            .created_by(creator)
            .build();

        assert_eq!(ticket.subject, "VPN down");
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.status, Status::Open);
        assert_eq!(ticket.department, "IT");
        assert_eq!(ticket.created_by, creator);
        assert_eq!(ticket.created_at, ticket.updated_at);
        assert!(ticket.assigned_to.is_none());
    }

    #[test]
    fn test_builder_defaults_department() {
        let ticket = TicketBuilder::new().build();
        assert_eq!(ticket.department, DEFAULT_DEPARTMENT);
        assert_eq!(ticket.ticket_type, TicketType::Incident);
    }
}
