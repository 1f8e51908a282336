//! Access control decisions
//!
//! Stateless functions over an [`Actor`] and the record being touched. Role
//! gates come from the RBAC matrix in [`crate::core::Capability`]; ownership
//! rules are applied here.
//!
//! Fetching a single ticket by id is deliberately looser than listing: staff
//! may open any ticket by id even when it falls outside their list scope.

use crate::core::{Actor, Capability, Note, Role, Ticket, TicketPatch, UserId};
use crate::error::{HelpdeskError, Result};

/// Predicate narrowing ticket listings to what an actor may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketScope {
    /// Tickets created by this user
    CreatedBy(UserId),
    /// Tickets assigned to the agent, plus unassigned tickets of their department
    AgentQueue {
        agent: UserId,
        department: Option<String>,
    },
    /// Every ticket of a department
    Department(Option<String>),
    Unrestricted,
}

impl TicketScope {
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        match self {
            Self::CreatedBy(user) => ticket.created_by == *user,
            Self::AgentQueue { agent, department } => {
                ticket.assigned_to == Some(*agent)
                    || (ticket.assigned_to.is_none()
                        && department.as_deref() == Some(ticket.department.as_str()))
            },
            Self::Department(department) => department.as_deref() == Some(ticket.department.as_str()),
            Self::Unrestricted => true,
        }
    }
}

/// Scope filter applied before any listing
#[must_use]
pub fn scope_filter(actor: &Actor) -> TicketScope {
    match actor.role {
        Role::User => TicketScope::CreatedBy(actor.id),
        Role::Agent => TicketScope::AgentQueue {
            agent: actor.id,
            department: actor.department.clone(),
        },
        Role::Manager => TicketScope::Department(actor.department.clone()),
        Role::Admin | Role::SuperAdmin => TicketScope::Unrestricted,
    }
}

fn owns(actor: &Actor, ticket: &Ticket) -> bool {
    ticket.created_by == actor.id
}

#[must_use]
pub fn can_view(actor: &Actor, ticket: &Ticket) -> bool {
    actor.can(Capability::AccessOthersTickets) || owns(actor, ticket)
}

pub fn ensure_can_view(actor: &Actor, ticket: &Ticket) -> Result<()> {
    if can_view(actor, ticket) {
        Ok(())
    } else {
        Err(HelpdeskError::forbidden("Not authorized to view this ticket"))
    }
}

#[must_use]
pub fn can_create_ticket(actor: &Actor) -> bool {
    actor.can(Capability::CreateTicket)
}

/// Check that `patch` is a legal mutation of `ticket` for `actor`
///
/// Fields the role may not change are rejected only when the patch actually
/// changes them; restating the current value is allowed.
pub fn can_update(actor: &Actor, ticket: &Ticket, patch: &TicketPatch) -> Result<()> {
    if !can_view(actor, ticket) {
        return Err(HelpdeskError::forbidden("Not authorized to update this ticket"));
    }

    if let Some(priority) = patch.priority {
        if priority != ticket.priority && !actor.can(Capability::ChangePriority) {
            return Err(HelpdeskError::forbidden(format!(
                "Role {} cannot change ticket priority",
                actor.role
            )));
        }
    }

    if let Some(assignee) = patch.assigned_to {
        if assignee != ticket.assigned_to && !actor.can(Capability::AssignTicket) {
            return Err(HelpdeskError::forbidden(format!(
                "Role {} cannot assign tickets",
                actor.role
            )));
        }
    }

    Ok(())
}

#[must_use]
pub fn can_delete(actor: &Actor) -> bool {
    actor.can(Capability::DeleteTicket)
}

#[must_use]
pub fn can_view_history(actor: &Actor) -> bool {
    actor.can(Capability::ViewHistory)
}

#[must_use]
pub fn can_view_note(actor: &Actor, note: &Note) -> bool {
    !note.is_internal || actor.can(Capability::ViewInternalNotes)
}

#[must_use]
pub fn can_create_internal_note(actor: &Actor) -> bool {
    actor.can(Capability::CreateInternalNote)
}

/// Users may annotate only their own tickets; staff may annotate any
pub fn ensure_can_annotate(actor: &Actor, ticket: &Ticket) -> Result<()> {
    if can_view(actor, ticket) {
        Ok(())
    } else {
        Err(HelpdeskError::forbidden("Not authorized to add notes to this ticket"))
    }
}

#[must_use]
pub fn can_delete_note(actor: &Actor, note: &Note) -> bool {
    note.user == actor.id || actor.can(Capability::DeleteAnyNote)
}
