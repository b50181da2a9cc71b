use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod handlers;

/// Build the notification API router.
/// All routes are relative; the caller mounts this under `/api/v1`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(handlers::list_notifications))
        .route(
            "/notifications/unread",
            get(handlers::count_unread_notifications),
        )
        .route(
            "/notifications/read-all",
            post(handlers::mark_all_notifications_read),
        )
        .route(
            "/notifications/:id/read",
            patch(handlers::mark_notification_read),
        )
        .route("/tasks/events", post(handlers::apply_task_event))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
