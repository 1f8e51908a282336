use crate::api::AppState;
use crate::api::extractors::{CurrentActor, parse_note_id, parse_ticket_id};
use crate::api::response::{ApiError, ApiResponse, ApiResult};
use crate::core::Note;
use crate::error::HelpdeskError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNoteRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_internal: bool,
}

pub async fn add_note(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(ticket_id): Path<String>,
    body: Result<Json<AddNoteRequest>, JsonRejection>,
) -> ApiResult<Note> {
    let ticket_id = parse_ticket_id(&ticket_id)?;
    let Json(request) =
        body.map_err(|e| ApiError(HelpdeskError::validation(e.body_text())))?;
    let note = state
        .helpdesk
        .notes
        .add(ticket_id, &request.text, request.is_internal, &actor)
        .await?;
    Ok(ApiResponse::created(note, "Note added successfully"))
}

pub async fn list_notes(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(ticket_id): Path<String>,
) -> ApiResult<Vec<Note>> {
    let ticket_id = parse_ticket_id(&ticket_id)?;
    let notes = state.helpdesk.notes.list(ticket_id, &actor).await?;
    let message = format!("Found {} notes", notes.len());
    Ok(ApiResponse::ok(notes, message))
}

pub async fn delete_note(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((ticket_id, note_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let ticket_id = parse_ticket_id(&ticket_id)?;
    let note_id = parse_note_id(&note_id)?;
    let note = state
        .helpdesk
        .notes
        .delete(ticket_id, note_id, &actor)
        .await?;
    Ok(ApiResponse::ok(
        json!({ "id": note.id }),
        "Note deleted successfully",
    ))
}
