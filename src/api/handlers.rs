use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::clock::SystemClock;
use crate::engine::{ledger, lifecycle, ReconcileReport, TaskEvent};
use crate::errors::AppError;
use crate::models::notification::{Notification, NotificationView};
use crate::models::task::TaskSnapshot;
use crate::AppState;

// ── Request DTOs ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UserParams {
    pub user_id: Option<String>,
}

impl UserParams {
    fn require(&self) -> Result<Uuid, AppError> {
        let raw = self
            .user_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("user_id query parameter is required".into()))?;
        Uuid::parse_str(raw)
            .map_err(|_| AppError::BadRequest(format!("invalid user_id '{}'", raw)))
    }
}

/// A task mutation reported by the CRUD layer: the post-mutation snapshot
/// plus the event fields (`{"task": {..}, "event": "due_date_changed"}`).
#[derive(Deserialize)]
pub struct TaskEventRequest {
    pub task: TaskSnapshot,
    #[serde(flatten)]
    pub event: TaskEvent,
}

// ── Notification Handlers ────────────────────────────────────

/// GET /api/v1/notifications?user_id=: newest first, with derived message
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserParams>,
) -> Result<Json<Vec<NotificationView>>, AppError> {
    let user_id = params.require()?;
    let mut conn = state.db.pool().acquire().await?;
    let notifs = ledger::list_for_user(&mut *conn, user_id).await?;
    Ok(Json(notifs))
}

/// GET /api/v1/notifications/unread?user_id=: unread count
pub async fn count_unread_notifications(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = params.require()?;
    let mut conn = state.db.pool().acquire().await?;
    let count = ledger::unread_count(&mut *conn, user_id).await?;
    Ok(Json(json!({ "count": count })))
}

/// PATCH /api/v1/notifications/:id/read: mark one as read
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<Notification>, AppError> {
    let id = Uuid::parse_str(&id_str)
        .map_err(|_| AppError::BadRequest(format!("invalid notification id '{}'", id_str)))?;
    let mut conn = state.db.pool().acquire().await?;
    let notif = ledger::mark_read(&mut *conn, id).await?;
    Ok(Json(notif))
}

/// POST /api/v1/notifications/read-all?user_id=: mark all as read
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = params.require()?;
    let mut conn = state.db.pool().acquire().await?;
    let updated = ledger::mark_all_read(&mut *conn, user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

// ── Task Lifecycle ───────────────────────────────────────────

/// POST /api/v1/tasks/events: reconcile a task's notifications in one
/// transaction, then hand any alerts to the relay.
pub async fn apply_task_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskEventRequest>,
) -> Result<Json<ReconcileReport>, AppError> {
    let mut tx = state.db.begin().await?;
    let outcome =
        lifecycle::apply_task_event(&mut *tx, &req.task, req.event, &SystemClock).await?;
    tx.commit().await?;

    state.relay.dispatch_all(outcome.alerts);
    Ok(Json(outcome.report))
}

/// GET /healthz
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "email_relay": state.config.relay_enabled(),
    }))
}
