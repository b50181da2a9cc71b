//! Single entry point for task mutations detected by the CRUD layer.

use serde::{Deserialize, Serialize};

use super::scheduler::{self, ReconcileReport};
use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::task::{TaskSnapshot, TaskStatus};
use crate::models::user::UserRef;
use crate::notification::alert::Alert;
use crate::store::NotificationStore;

/// What happened to a task. The snapshot passed alongside always holds the
/// post-mutation values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEvent {
    Created { created_by: UserRef },
    DueDateChanged,
    StatusChanged { from: TaskStatus },
    CollaboratorsChanged,
    OwnerChanged,
    Deleted,
}

/// Store changes of one event, plus the emails to hand to the relay once the
/// caller's transaction has committed.
#[derive(Debug, Clone, Default)]
pub struct LifecycleOutcome {
    pub report: ReconcileReport,
    pub alerts: Vec<Alert>,
}

impl From<ReconcileReport> for LifecycleOutcome {
    fn from(report: ReconcileReport) -> Self {
        Self {
            report,
            alerts: Vec::new(),
        }
    }
}

/// Reconcile the task's notifications for one mutation. Run it on the same
/// transaction as the mutation itself.
pub async fn apply_task_event<S, C>(
    store: &mut S,
    task: &TaskSnapshot,
    event: TaskEvent,
    clock: &C,
) -> Result<LifecycleOutcome, AppError>
where
    S: NotificationStore + ?Sized,
    C: Clock + ?Sized,
{
    let today = clock.today();
    tracing::debug!(task_id = %task.id, ?event, %today, "applying task event");

    match event {
        TaskEvent::Created { created_by } => {
            let report = scheduler::recompute_reminders(store, task, today).await?;
            let mut alerts = Vec::new();
            let recipients: Vec<String> = task
                .participants_except(created_by.id)
                .iter()
                .map(|u| u.email.clone())
                .collect();
            if !recipients.is_empty() {
                alerts.push(Alert::task_created(task, &created_by, recipients));
            }
            alerts.extend(scheduler::due_soon_alert(task, today, &report));
            alerts.extend(scheduler::overdue_alert(task, today));
            Ok(LifecycleOutcome { report, alerts })
        }
        TaskEvent::DueDateChanged => {
            let report = scheduler::update_for_due_date_change(store, task, today).await?;
            let alerts = scheduler::due_soon_alert(task, today, &report)
                .into_iter()
                .chain(scheduler::overdue_alert(task, today))
                .collect();
            Ok(LifecycleOutcome { report, alerts })
        }
        // new participants get the lead times still ahead; nobody loses any
        TaskEvent::CollaboratorsChanged | TaskEvent::OwnerChanged => {
            let report = scheduler::recompute_reminders(store, task, today).await?;
            Ok(report.into())
        }
        TaskEvent::StatusChanged { from } => {
            match (from.is_completed(), task.status.is_completed()) {
                (_, true) => removed(scheduler::remove_all_for_task(store, task.id).await?),
                // reopened
                (true, false) => {
                    let report = scheduler::recompute_reminders(store, task, today).await?;
                    let alerts = scheduler::due_soon_alert(task, today, &report)
                        .into_iter()
                        .collect();
                    Ok(LifecycleOutcome { report, alerts })
                }
                (false, false) => Ok(LifecycleOutcome::default()),
            }
        }
        TaskEvent::Deleted => removed(scheduler::remove_all_for_task(store, task.id).await?),
    }
}

fn removed(count: u64) -> Result<LifecycleOutcome, AppError> {
    Ok(ReconcileReport {
        removed: count,
        ..ReconcileReport::default()
    }
    .into())
}
