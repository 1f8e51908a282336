use crate::api::AppState;
use crate::api::extractors::{CurrentActor, parse_notification_id};
use crate::api::response::{ApiError, ApiResponse, ApiResult};
use crate::core::Notification;
use crate::error::HelpdeskError;
use crate::services::NotificationPage;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    #[serde(default)]
    pub skip: usize,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<NotificationPage> {
    let Query(params) =
        params.map_err(|e| ApiError(HelpdeskError::validation(e.body_text())))?;
    let page = state
        .helpdesk
        .notifications
        .list(actor.id, params.limit, params.skip)
        .await?;
    Ok(ApiResponse::ok(page, "Notifications retrieved"))
}

pub async fn unread_count(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Value> {
    let count = state.helpdesk.notifications.unread_count(actor.id).await?;
    Ok(ApiResponse::ok(json!({ "count": count }), "Unread count retrieved"))
}

pub async fn mark_read(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    let id = parse_notification_id(&id)?;
    let notification = state.helpdesk.notifications.mark_read(id, actor.id).await?;
    Ok(ApiResponse::ok(notification, "Notification marked as read"))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Value> {
    let modified = state.helpdesk.notifications.mark_all_read(actor.id).await?;
    Ok(ApiResponse::ok(
        json!({ "modifiedCount": modified }),
        "All notifications marked as read",
    ))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_notification_id(&id)?;
    let removed = state.helpdesk.notifications.delete(id, actor.id).await?;
    Ok(ApiResponse::ok(
        json!({ "id": removed.id }),
        "Notification deleted",
    ))
}
