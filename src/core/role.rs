use super::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of roles an authenticated actor can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// End user filing tickets
    User,
    /// Support agent working a department queue
    Agent,
    /// Department manager
    Manager,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::User,
        Self::Agent,
        Self::Manager,
        Self::Admin,
        Self::SuperAdmin,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Manager => "manager",
            Self::Admin => "admin",
            Self::SuperAdmin => "super-admin",
        }
    }

    /// Every role except `User` counts as staff
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        !matches!(self, Self::User)
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Look up this role's row in the RBAC matrix
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        capability.granted_to().contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            "super-admin" | "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(format!(
                "Invalid role: {s}. Must be one of: user, agent, manager, admin, super-admin"
            )),
        }
    }
}

/// Role-gated capabilities
///
/// Ownership rules (a user acting on their own ticket, an author deleting
/// their own note) are layered on top of this matrix by the policy module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CreateTicket,
    /// Fetch or mutate tickets created by someone else
    AccessOthersTickets,
    ChangePriority,
    AssignTicket,
    DeleteTicket,
    ViewHistory,
    ViewInternalNotes,
    CreateInternalNote,
    DeleteAnyNote,
}

use Role::{Admin, Agent, Manager, SuperAdmin, User};

/// Role x capability matrix
const RBAC_MATRIX: &[(Capability, &[Role])] = &[
    (Capability::CreateTicket, &[User, Manager, Admin, SuperAdmin]),
    (Capability::AccessOthersTickets, &[Agent, Manager, Admin, SuperAdmin]),
    (Capability::ChangePriority, &[User, Manager, Admin, SuperAdmin]),
    (Capability::AssignTicket, &[User, Manager, Admin, SuperAdmin]),
    (Capability::DeleteTicket, &[Admin, SuperAdmin]),
    (Capability::ViewHistory, &[Agent, Admin, SuperAdmin]),
    (Capability::ViewInternalNotes, &[Agent, Manager, Admin, SuperAdmin]),
    (Capability::CreateInternalNote, &[Agent, Manager, Admin, SuperAdmin]),
    (Capability::DeleteAnyNote, &[Admin, SuperAdmin]),
];

impl Capability {
    /// Roles holding this capability
    #[must_use]
    pub fn granted_to(self) -> &'static [Role] {
        RBAC_MATRIX
            .iter()
            .find(|(capability, _)| *capability == self)
            .map_or(&[], |(_, roles)| *roles)
    }
}

/// An authenticated caller, as supplied by the external authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
    pub department: Option<String>,
}

impl Actor {
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            department: None,
        }
    }

    #[must_use]
    pub fn in_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("AGENT".parse::<Role>(), Ok(Role::Agent));
        assert_eq!("super-admin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"super-admin\"");
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
    }

    #[test]
    fn test_every_capability_has_a_matrix_row() {
        let all = [
            Capability::CreateTicket,
            Capability::AccessOthersTickets,
            Capability::ChangePriority,
            Capability::AssignTicket,
            Capability::DeleteTicket,
            Capability::ViewHistory,
            Capability::ViewInternalNotes,
            Capability::CreateInternalNote,
            Capability::DeleteAnyNote,
        ];
        for capability in all {
            assert!(
                !capability.granted_to().is_empty(),
                "{capability:?} is granted to nobody"
            );
        }
    }

    #[test]
    fn test_matrix_rows() {
        assert!(!Role::Agent.can(Capability::CreateTicket));
        assert!(Role::Manager.can(Capability::CreateTicket));
        assert!(!Role::Manager.can(Capability::ViewHistory));
        assert!(Role::Agent.can(Capability::ViewHistory));
        assert!(!Role::User.can(Capability::ViewInternalNotes));
        assert!(!Role::Agent.can(Capability::ChangePriority));
        assert!(!Role::Agent.can(Capability::AssignTicket));
        for role in Role::ALL {
            assert_eq!(role.can(Capability::DeleteTicket), role.is_admin());
            assert_eq!(role.can(Capability::CreateInternalNote), role.is_staff());
        }
    }
}
