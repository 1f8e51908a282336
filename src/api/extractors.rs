//! Request extractors
//!
//! Authentication happens upstream. The gateway forwards the verified
//! identity in the `x-user-id`, `x-user-role` and optional
//! `x-user-department` headers.

use super::response::ApiError;
use crate::core::{Actor, NoteId, NotificationId, Role, TicketId, UserId};
use crate::error::HelpdeskError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_DEPARTMENT_HEADER: &str = "x-user-department";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(&parts.headers, USER_ID_HEADER)
            .ok_or_else(|| HelpdeskError::unauthenticated("User not authenticated"))?;
        let id = UserId::parse_str(id)
            .map_err(|_| HelpdeskError::unauthenticated("Invalid user identity"))?;

        let role = header(&parts.headers, USER_ROLE_HEADER)
            .ok_or_else(|| HelpdeskError::unauthenticated("User role missing"))?
            .parse::<Role>()
            .map_err(HelpdeskError::unauthenticated)?;

        let department = header(&parts.headers, USER_DEPARTMENT_HEADER).map(str::to_string);

        Ok(Self(Actor {
            id,
            role,
            department,
        }))
    }
}

pub fn parse_ticket_id(raw: &str) -> Result<TicketId, ApiError> {
    TicketId::parse_str(raw)
        .map_err(|_| ApiError(HelpdeskError::validation(format!("Invalid ticket id: {raw}"))))
}

pub fn parse_note_id(raw: &str) -> Result<NoteId, ApiError> {
    NoteId::parse_str(raw)
        .map_err(|_| ApiError(HelpdeskError::validation(format!("Invalid note id: {raw}"))))
}

pub fn parse_notification_id(raw: &str) -> Result<NotificationId, ApiError> {
    NotificationId::parse_str(raw).map_err(|_| {
        ApiError(HelpdeskError::validation(format!(
            "Invalid notification id: {raw}"
        )))
    })
}
