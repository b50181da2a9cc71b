//! Event Notifier: activity notifications fanned out to task participants,
//! always excluding the user who caused the event.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::comment::CommentSnapshot;
use crate::models::notification::{
    comment_excerpt, CommentPayload, FieldChange, NotificationPayload, ReassignmentPayload,
    TaskUpdatedPayload,
};
use crate::models::task::TaskSnapshot;
use crate::models::user::UserRef;
use crate::notification::alert::Alert;
use crate::store::{InsertOutcome, NewNotification, NotificationStore};

/// Result of one fan-out: who got a row, and the email alert the caller may
/// hand to the relay once its transaction has committed.
#[derive(Debug, Clone, Default)]
pub struct Fanout {
    pub recipients: Vec<Uuid>,
    pub alert: Option<Alert>,
}

impl Fanout {
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

async fn insert_for_each<S>(
    store: &mut S,
    task_id: Uuid,
    recipients: &[&UserRef],
    payload: &NotificationPayload,
) -> Result<Vec<Uuid>, AppError>
where
    S: NotificationStore + ?Sized,
{
    let mut notified = Vec::with_capacity(recipients.len());
    for user in recipients {
        let new = NewNotification::activity(user.id, task_id, payload.clone());
        if let InsertOutcome::Inserted(_) = store.insert(new).await? {
            notified.push(user.id);
        }
    }
    Ok(notified)
}

/// New comment: every participant except the author and the acting user.
pub async fn notify_comment<S>(
    store: &mut S,
    comment: &CommentSnapshot,
    task: &TaskSnapshot,
    actor_id: Uuid,
) -> Result<Fanout, AppError>
where
    S: NotificationStore + ?Sized,
{
    let recipients: Vec<&UserRef> = task
        .participants()
        .into_iter()
        .filter(|u| u.id != actor_id && u.id != comment.author.id)
        .collect();
    if recipients.is_empty() {
        return Ok(Fanout::default());
    }

    let payload = NotificationPayload::NewComment(CommentPayload {
        project_name: task.project_label().to_string(),
        task_title: task.title.clone(),
        comment_author: comment.author.email.clone(),
        comment_excerpt: comment_excerpt(&comment.content),
        comment_id: comment.id,
    });
    let notified = insert_for_each(store, task.id, &recipients, &payload).await?;

    tracing::info!(
        task_id = %task.id,
        comment_id = %comment.id,
        recipients = notified.len(),
        "comment notifications created"
    );

    let emails = recipients.iter().map(|u| u.email.clone()).collect();
    Ok(Fanout {
        recipients: notified,
        alert: Some(Alert::new_comment(task, comment, emails)),
    })
}

/// Task updated: one identical row per participant other than the updater.
/// `changes` is the caller's before/after diff; an empty diff notifies no
/// one.
pub async fn notify_task_updated<S>(
    store: &mut S,
    task: &TaskSnapshot,
    actor: &UserRef,
    changes: &[FieldChange],
) -> Result<Fanout, AppError>
where
    S: NotificationStore + ?Sized,
{
    if changes.is_empty() {
        return Ok(Fanout::default());
    }
    let recipients = task.participants_except(actor.id);
    if recipients.is_empty() {
        return Ok(Fanout::default());
    }

    let payload = NotificationPayload::TaskUpdated(TaskUpdatedPayload {
        project_name: task.project_label().to_string(),
        task_title: task.title.clone(),
        updated_fields: changes.to_vec(),
        updated_by: actor.email.clone(),
    });
    let notified = insert_for_each(store, task.id, &recipients, &payload).await?;

    tracing::info!(
        task_id = %task.id,
        updated_by = %actor.id,
        fields = changes.len(),
        recipients = notified.len(),
        "task update notifications created"
    );

    let emails = recipients.iter().map(|u| u.email.clone()).collect();
    Ok(Fanout {
        recipients: notified,
        alert: Some(Alert::task_updated(task, actor, changes, emails)),
    })
}

/// Ownership moved from `task.owner` to `new_owner`. Only the new owner is
/// told, and not when they made the change themselves.
///
/// `task` is the snapshot from before the reassignment, so its owner is the
/// previous owner.
pub async fn notify_reassignment<S>(
    store: &mut S,
    task: &TaskSnapshot,
    actor: &UserRef,
    new_owner: &UserRef,
) -> Result<Fanout, AppError>
where
    S: NotificationStore + ?Sized,
{
    if new_owner.id == task.owner.id || new_owner.id == actor.id {
        return Ok(Fanout::default());
    }

    let payload = NotificationPayload::TaskReassigned(ReassignmentPayload {
        project_name: task.project_label().to_string(),
        task_title: task.title.clone(),
        assigned_by: actor.email.clone(),
        previous_owner: task.owner.email.clone(),
    });
    let notified = insert_for_each(store, task.id, &[new_owner], &payload).await?;

    tracing::info!(
        task_id = %task.id,
        new_owner = %new_owner.id,
        assigned_by = %actor.id,
        "reassignment notification created"
    );

    Ok(Fanout {
        recipients: notified,
        alert: Some(Alert::task_assignment(task, actor, new_owner)),
    })
}
