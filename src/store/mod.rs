//! Notification Store: every query the engine issues against the
//! `notifications` table.
//!
//! Methods take `&mut self` so an implementation can be a connection that is
//! already inside the caller's transaction; the engine never commits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::notification::{
    Notification, NotificationKind, NotificationPayload, ReminderPayload,
};

pub mod memory;
pub mod postgres;

/// A row to be inserted. `kind` is derived from the payload variant.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub payload: NotificationPayload,
    pub trigger_days_before: Option<i32>,
    pub comment_id: Option<Uuid>,
}

impl NewNotification {
    pub fn reminder(
        user_id: Uuid,
        task_id: Uuid,
        days_before: i32,
        payload: ReminderPayload,
    ) -> Self {
        Self {
            user_id,
            task_id,
            payload: NotificationPayload::DueDateReminder(payload),
            trigger_days_before: Some(days_before),
            comment_id: None,
        }
    }

    /// A non-reminder row. The comment back-reference is lifted out of a
    /// comment payload into its own column.
    pub fn activity(user_id: Uuid, task_id: Uuid, payload: NotificationPayload) -> Self {
        let comment_id = match &payload {
            NotificationPayload::NewComment(p) => Some(p.comment_id),
            _ => None,
        };
        Self {
            user_id,
            task_id,
            payload,
            trigger_days_before: None,
            comment_id,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Uuid),
    /// A row with the same (user, task, trigger_days_before, kind) already
    /// exists. Not an error.
    Duplicate,
}

#[async_trait]
pub trait NotificationStore: Send {
    /// Look up a reminder by its uniqueness key.
    async fn find_reminder(
        &mut self,
        user_id: Uuid,
        task_id: Uuid,
        days_before: i32,
    ) -> Result<Option<Notification>, StoreError>;

    async fn insert(&mut self, new: NewNotification) -> Result<InsertOutcome, StoreError>;

    /// Delete every notification of the task, any kind. Single statement.
    async fn delete_for_task(&mut self, task_id: Uuid) -> Result<u64, StoreError>;

    /// Delete the task's DUE_DATE_REMINDER rows only. Single statement.
    async fn delete_reminders_for_task(&mut self, task_id: Uuid) -> Result<u64, StoreError>;

    /// Set the read flag on one row, returning it, or `None` if absent.
    async fn mark_read(&mut self, id: Uuid) -> Result<Option<Notification>, StoreError>;

    async fn mark_all_read(&mut self, user_id: Uuid) -> Result<u64, StoreError>;

    async fn count_unread(&mut self, user_id: Uuid) -> Result<i64, StoreError>;

    /// Newest first.
    async fn list_for_user(&mut self, user_id: Uuid) -> Result<Vec<Notification>, StoreError>;

    async fn list_for_task(&mut self, task_id: Uuid) -> Result<Vec<Notification>, StoreError>;
}
