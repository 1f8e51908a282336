use crate::api::AppState;
use crate::api::extractors::{CurrentActor, parse_ticket_id};
use crate::api::response::{ApiError, ApiResponse, ApiResult};
use crate::core::{NewTicket, Ticket, TicketLogEntry, TicketPatch};
use crate::error::HelpdeskError;
use crate::storage::TicketFilter;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use serde_json::{Value, json};

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError(HelpdeskError::validation(rejection.body_text()))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    body: Result<Json<NewTicket>, JsonRejection>,
) -> ApiResult<Ticket> {
    let Json(data) = body.map_err(bad_body)?;
    let ticket = state.helpdesk.tickets.create(data, &actor).await?;
    Ok(ApiResponse::created(ticket, "Ticket created successfully"))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    filter: Result<Query<TicketFilter>, QueryRejection>,
) -> ApiResult<Vec<Ticket>> {
    let Query(filter) =
        filter.map_err(|e| ApiError(HelpdeskError::validation(e.body_text())))?;
    let tickets = state.helpdesk.tickets.list(filter, &actor).await?;
    let message = format!("Found {} tickets", tickets.len());
    Ok(ApiResponse::ok(tickets, message))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Ticket> {
    let id = parse_ticket_id(&id)?;
    let ticket = state.helpdesk.tickets.get(id, &actor).await?;
    Ok(ApiResponse::ok(ticket, "Ticket retrieved successfully"))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    body: Result<Json<TicketPatch>, JsonRejection>,
) -> ApiResult<Ticket> {
    let id = parse_ticket_id(&id)?;
    let Json(patch) = body.map_err(bad_body)?;
    let ticket = state.helpdesk.tickets.update(id, patch, &actor).await?;
    Ok(ApiResponse::ok(ticket, "Ticket updated successfully"))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_ticket_id(&id)?;
    let removed = state.helpdesk.tickets.remove(id, &actor).await?;
    Ok(ApiResponse::ok(
        json!({ "id": removed.id }),
        "Ticket deleted successfully",
    ))
}

pub async fn ticket_history(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Vec<TicketLogEntry>> {
    let id = parse_ticket_id(&id)?;
    let entries = state.helpdesk.tickets.history(id, &actor).await?;
    Ok(ApiResponse::ok(entries, "Ticket history retrieved"))
}
