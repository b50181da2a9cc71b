//! Reminder Scheduler: keeps a task's DUE_DATE_REMINDER rows equal to the set
//! of (participant, lead time) obligations that are still ahead of today.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::days_between;
use crate::errors::AppError;
use crate::models::notification::ReminderPayload;
use crate::models::task::TaskSnapshot;
use crate::notification::alert::Alert;
use crate::store::{InsertOutcome, NewNotification, NotificationStore};

/// Lead times, in days before the due date, at which reminders exist.
pub const TRIGGER_DAYS: [i32; 3] = [7, 3, 1];

/// How far out a due date is, bucketed by which lead times still fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderWindow {
    /// Seven or more days remain.
    FullWeek,
    /// Three to six days remain.
    FewDays,
    /// One or two days remain.
    LastDay,
    /// Due today or overdue.
    Closed,
}

impl ReminderWindow {
    pub fn from_remaining_days(remaining_days: i64) -> Self {
        if remaining_days >= 7 {
            ReminderWindow::FullWeek
        } else if remaining_days >= 3 {
            ReminderWindow::FewDays
        } else if remaining_days >= 1 {
            ReminderWindow::LastDay
        } else {
            ReminderWindow::Closed
        }
    }

    pub fn triggers(self) -> &'static [i32] {
        match self {
            ReminderWindow::FullWeek => &TRIGGER_DAYS,
            ReminderWindow::FewDays => &TRIGGER_DAYS[1..],
            ReminderWindow::LastDay => &TRIGGER_DAYS[2..],
            ReminderWindow::Closed => &[],
        }
    }
}

/// Valid lead-time subset for a due date `remaining_days` away.
pub fn valid_triggers(remaining_days: i64) -> &'static [i32] {
    ReminderWindow::from_remaining_days(remaining_days).triggers()
}

/// What a reconciliation pass did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub created: usize,
    pub already_present: usize,
    pub removed: u64,
}

/// Bring the task's reminders up to the set that should exist today.
///
/// Additive: existing reminders are left alone. A task without a due date or
/// in COMPLETED status ends with zero reminders.
pub async fn recompute_reminders<S>(
    store: &mut S,
    task: &TaskSnapshot,
    today: NaiveDate,
) -> Result<ReconcileReport, AppError>
where
    S: NotificationStore + ?Sized,
{
    let mut report = ReconcileReport::default();

    let due = match task.due_date {
        Some(due) if !task.status.is_completed() => due,
        _ => {
            report.removed = store.delete_reminders_for_task(task.id).await?;
            tracing::debug!(
                task_id = %task.id,
                removed = report.removed,
                "task has no due date or is completed, reminders cleared"
            );
            return Ok(report);
        }
    };

    let remaining_days = days_between(today, due);
    let triggers = valid_triggers(remaining_days);
    if triggers.is_empty() {
        tracing::debug!(task_id = %task.id, remaining_days, "no reminder window left");
        return Ok(report);
    }

    let payload = ReminderPayload {
        project_name: task.project_label().to_string(),
        task_title: task.title.clone(),
        duedate: due,
        days_until_due: remaining_days,
    };

    for user in task.participants() {
        for &days_before in triggers {
            let notify_on = due - Duration::days(i64::from(days_before));
            if notify_on < today {
                continue;
            }

            if store
                .find_reminder(user.id, task.id, days_before)
                .await?
                .is_some()
            {
                report.already_present += 1;
                continue;
            }

            let new = NewNotification::reminder(user.id, task.id, days_before, payload.clone());
            match store.insert(new).await? {
                InsertOutcome::Inserted(_) => report.created += 1,
                InsertOutcome::Duplicate => report.already_present += 1,
            }
        }
    }

    tracing::info!(
        task_id = %task.id,
        remaining_days,
        created = report.created,
        already_present = report.already_present,
        "reminders reconciled"
    );
    Ok(report)
}

/// Drop every reminder of the task and rebuild from its current due date.
/// This is the only path that shrinks an already scheduled set.
pub async fn update_for_due_date_change<S>(
    store: &mut S,
    task: &TaskSnapshot,
    today: NaiveDate,
) -> Result<ReconcileReport, AppError>
where
    S: NotificationStore + ?Sized,
{
    let removed = store.delete_reminders_for_task(task.id).await?;
    let mut report = recompute_reminders(store, task, today).await?;
    report.removed += removed;
    Ok(report)
}

/// Delete every notification of the task.
pub async fn remove_all_for_task<S>(store: &mut S, task_id: Uuid) -> Result<u64, AppError>
where
    S: NotificationStore + ?Sized,
{
    let removed = store.delete_for_task(task_id).await?;
    tracing::info!(task_id = %task_id, removed, "notifications removed for task");
    Ok(removed)
}

fn participant_emails(task: &TaskSnapshot) -> Vec<String> {
    task.participants().iter().map(|u| u.email.clone()).collect()
}

/// Due-soon email for a pass that created the reminder falling due today.
/// Reminders whose date is still ahead produce nothing here.
pub fn due_soon_alert(
    task: &TaskSnapshot,
    today: NaiveDate,
    report: &ReconcileReport,
) -> Option<Alert> {
    let due = task.due_date.filter(|_| !task.status.is_completed())?;
    let remaining_days = days_between(today, due);
    let fires_today = TRIGGER_DAYS
        .iter()
        .any(|&days_before| i64::from(days_before) == remaining_days);
    if report.created == 0 || !fires_today {
        return None;
    }
    Some(Alert::due_date_reminder(task, remaining_days, participant_emails(task)))
}

/// Overdue email for an open task whose due date has passed.
pub fn overdue_alert(task: &TaskSnapshot, today: NaiveDate) -> Option<Alert> {
    let due = task.due_date.filter(|_| !task.status.is_completed())?;
    let remaining_days = days_between(today, due);
    if remaining_days >= 0 {
        return None;
    }
    Some(Alert::due_date_reminder(task, remaining_days, participant_emails(task)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_subsets_by_remaining_days() {
        assert_eq!(valid_triggers(30), &[7, 3, 1]);
        assert_eq!(valid_triggers(7), &[7, 3, 1]);
        assert_eq!(valid_triggers(6), &[3, 1]);
        assert_eq!(valid_triggers(3), &[3, 1]);
        assert_eq!(valid_triggers(2), &[1]);
        assert_eq!(valid_triggers(1), &[1]);
        assert!(valid_triggers(0).is_empty());
        assert!(valid_triggers(-4).is_empty());
    }

    #[test]
    fn test_window_boundaries() {
        assert_eq!(ReminderWindow::from_remaining_days(7), ReminderWindow::FullWeek);
        assert_eq!(ReminderWindow::from_remaining_days(4), ReminderWindow::FewDays);
        assert_eq!(ReminderWindow::from_remaining_days(2), ReminderWindow::LastDay);
        assert_eq!(ReminderWindow::from_remaining_days(0), ReminderWindow::Closed);
    }

    fn open_task(due_in: i64, today: NaiveDate) -> TaskSnapshot {
        use crate::models::task::TaskStatus;
        use crate::models::user::UserRef;
        TaskSnapshot {
            id: Uuid::new_v4(),
            title: "Design".into(),
            due_date: Some(today + Duration::days(due_in)),
            status: TaskStatus::Ongoing,
            owner: UserRef::new(Uuid::new_v4(), "owner@example.com", "Owner"),
            collaborators: vec![],
            project_name: None,
            priority: 1,
            notes: None,
        }
    }

    #[test]
    fn test_due_soon_alert_only_when_a_lead_time_fires_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let created = ReconcileReport {
            created: 1,
            ..ReconcileReport::default()
        };

        assert!(due_soon_alert(&open_task(3, today), today, &created).is_some());
        assert!(due_soon_alert(&open_task(5, today), today, &created).is_none());
        assert!(due_soon_alert(&open_task(3, today), today, &ReconcileReport::default()).is_none());
    }

    #[test]
    fn test_overdue_alert_for_past_due_date() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let alert = overdue_alert(&open_task(-2, today), today).expect("overdue alert");
        assert_eq!(alert.subject, "Task overdue: Design");
        assert_eq!(alert.recipients, vec!["owner@example.com".to_string()]);
        assert!(overdue_alert(&open_task(0, today), today).is_none());
    }
}
