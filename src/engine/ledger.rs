//! Read/Unread Ledger over the notification store.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notification::{Notification, NotificationView};
use crate::store::NotificationStore;

/// Mark one notification read. Marking an already read row again succeeds.
pub async fn mark_read<S>(store: &mut S, id: Uuid) -> Result<Notification, AppError>
where
    S: NotificationStore + ?Sized,
{
    store
        .mark_read(id)
        .await?
        .ok_or(AppError::NotificationNotFound(id))
}

/// Mark every unread notification of the user read; returns how many changed.
pub async fn mark_all_read<S>(store: &mut S, user_id: Uuid) -> Result<u64, AppError>
where
    S: NotificationStore + ?Sized,
{
    let updated = store.mark_all_read(user_id).await?;
    tracing::debug!(user_id = %user_id, updated, "marked all notifications read");
    Ok(updated)
}

pub async fn unread_count<S>(store: &mut S, user_id: Uuid) -> Result<i64, AppError>
where
    S: NotificationStore + ?Sized,
{
    Ok(store.count_unread(user_id).await?)
}

/// All of the user's notifications, newest first, each with its message.
pub async fn list_for_user<S>(
    store: &mut S,
    user_id: Uuid,
) -> Result<Vec<NotificationView>, AppError>
where
    S: NotificationStore + ?Sized,
{
    let rows = store.list_for_user(user_id).await?;
    Ok(rows.into_iter().map(NotificationView::from).collect())
}
