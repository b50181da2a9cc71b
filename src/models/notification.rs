use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rendered when a row's kind and payload cannot be matched to a template.
pub const GENERIC_MESSAGE: &str = "New notification";

const EXCERPT_CHARS: usize = 50;

// Stored as plain TEXT; the column carries a CHECK constraint instead of a
// native enum type.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    DueDateReminder,
    NewComment,
    TaskUpdated,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::DueDateReminder => "DUE_DATE_REMINDER",
            NotificationKind::NewComment => "NEW_COMMENT",
            NotificationKind::TaskUpdated => "TASK_UPDATED",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed field of a task update, diffed by the caller.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl FieldChange {
    pub fn new(
        field: impl Into<String>,
        old_value: Option<impl Into<String>>,
        new_value: Option<impl Into<String>>,
    ) -> Self {
        Self {
            field: field.into(),
            old_value: old_value.map(Into::into),
            new_value: new_value.map(Into::into),
        }
    }

    fn describe(&self) -> String {
        format!(
            "{} from {} to {}",
            self.field,
            display_value(self.old_value.as_deref()),
            display_value(self.new_value.as_deref())
        )
    }
}

pub(crate) fn display_value(v: Option<&str>) -> &str {
    match v {
        Some(s) if !s.is_empty() => s,
        _ => "Empty",
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReminderPayload {
    pub project_name: String,
    pub task_title: String,
    pub duedate: NaiveDate,
    pub days_until_due: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentPayload {
    pub project_name: String,
    pub task_title: String,
    pub comment_author: String,
    pub comment_excerpt: String,
    pub comment_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskUpdatedPayload {
    pub project_name: String,
    pub task_title: String,
    pub updated_fields: Vec<FieldChange>,
    pub updated_by: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReassignmentPayload {
    pub project_name: String,
    pub task_title: String,
    pub assigned_by: String,
    pub previous_owner: String,
}

/// Kind-specific notification data, persisted as the `payload` JSONB column.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationPayload {
    DueDateReminder(ReminderPayload),
    NewComment(CommentPayload),
    TaskUpdated(TaskUpdatedPayload),
    TaskReassigned(ReassignmentPayload),
}

impl NotificationPayload {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationPayload::DueDateReminder(_) => NotificationKind::DueDateReminder,
            NotificationPayload::NewComment(_) => NotificationKind::NewComment,
            NotificationPayload::TaskUpdated(_) | NotificationPayload::TaskReassigned(_) => {
                NotificationKind::TaskUpdated
            }
        }
    }

    /// Human-readable text for a row of this payload. Reminders take their
    /// lead time from the row's `trigger_days_before`.
    pub fn render(&self, trigger_days_before: Option<i32>) -> String {
        match self {
            NotificationPayload::DueDateReminder(p) => match trigger_days_before {
                Some(days) => format!(
                    "{}: '{}' is due on {} (in {} day(s)).",
                    p.project_name,
                    p.task_title,
                    p.duedate.format("%Y-%m-%d"),
                    days
                ),
                None => GENERIC_MESSAGE.to_string(),
            },
            NotificationPayload::NewComment(p) => format!(
                "{} commented on '{}' in {}: {}",
                p.comment_author, p.task_title, p.project_name, p.comment_excerpt
            ),
            NotificationPayload::TaskUpdated(p) => {
                let head = format!(
                    "{} updated '{}' in {}",
                    p.updated_by, p.task_title, p.project_name
                );
                if p.updated_fields.is_empty() {
                    head
                } else {
                    let changes: Vec<String> =
                        p.updated_fields.iter().map(FieldChange::describe).collect();
                    format!("{}: {}", head, changes.join(", "))
                }
            }
            NotificationPayload::TaskReassigned(p) => format!(
                "{} assigned '{}' in {} to you (previous owner: {}).",
                p.assigned_by, p.task_title, p.project_name, p.previous_owner
            ),
        }
    }
}

/// Derive the display message for a stored row. Never fails: an unparsable
/// payload or a payload that disagrees with `kind` yields [`GENERIC_MESSAGE`].
pub fn render_message(
    kind: NotificationKind,
    payload: &serde_json::Value,
    trigger_days_before: Option<i32>,
) -> String {
    match NotificationPayload::deserialize(payload) {
        Ok(parsed) if parsed.kind() == kind => parsed.render(trigger_days_before),
        _ => GENERIC_MESSAGE.to_string(),
    }
}

/// First 50 characters of a comment, with an ellipsis when truncated.
pub fn comment_excerpt(content: &str) -> String {
    if content.chars().count() > EXCERPT_CHARS {
        let head: String = content.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
    pub trigger_days_before: Option<i32>,
    pub comment_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn message(&self) -> String {
        render_message(self.kind, &self.payload, self.trigger_days_before)
    }
}

/// A row as returned by the ledger listing: stored columns plus the derived
/// message.
#[derive(Debug, Serialize, Clone)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub message: String,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        let message = notification.message();
        Self {
            notification,
            message,
        }
    }
}
