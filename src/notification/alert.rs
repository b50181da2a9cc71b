use serde::Serialize;
use uuid::Uuid;

use crate::models::comment::CommentSnapshot;
use crate::models::notification::{display_value, FieldChange};
use crate::models::task::TaskSnapshot;
use crate::models::user::UserRef;

/// Sent to the webhook as `notification_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    NewComment,
    TaskUpdated,
    TaskAssignment,
    DueDateReminder,
    #[serde(rename = "task_creation")]
    TaskCreated,
}

/// A formatted email, ready for the relay.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub task_id: Uuid,
    pub task_title: String,
}

fn due_label(task: &TaskSnapshot) -> String {
    task.due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Not set".to_string())
}

fn team_lines(task: &TaskSnapshot) -> String {
    let mut lines = format!("  {} (Owner)", task.owner.email);
    for collab in task.collaborators.iter().filter(|c| c.id != task.owner.id) {
        lines.push_str(&format!("\n  {} (Collaborator)", collab.email));
    }
    lines
}

impl Alert {
    pub fn new_comment(
        task: &TaskSnapshot,
        comment: &CommentSnapshot,
        recipients: Vec<String>,
    ) -> Self {
        let body = format!(
            "New comment by {author}:\n\n{content}\n\n\
             Task: {title}\nProject: {project}\nCommented: {at}",
            author = comment.author.email,
            content = comment.content,
            title = task.title,
            project = task.project_label(),
            at = comment.created_at.format("%Y-%m-%d %H:%M"),
        );
        Self {
            kind: AlertKind::NewComment,
            recipients,
            subject: format!("New comment on task: {}", task.title),
            body,
            task_id: task.id,
            task_title: task.title.clone(),
        }
    }

    pub fn task_updated(
        task: &TaskSnapshot,
        updated_by: &UserRef,
        changes: &[FieldChange],
        recipients: Vec<String>,
    ) -> Self {
        let mut body = format!(
            "Task '{}' has been updated by {}:\n",
            task.title, updated_by.email
        );
        for change in changes {
            body.push_str(&format!(
                "\n{}:\n  From: {}\n  To: {}\n",
                change.field,
                display_value(change.old_value.as_deref()),
                display_value(change.new_value.as_deref()),
            ));
        }
        body.push_str(&format!(
            "\nDue Date: {}\nStatus: {}\nPriority: {}\nProject: {}",
            due_label(task),
            task.status.label(),
            task.priority,
            task.project_label(),
        ));
        Self {
            kind: AlertKind::TaskUpdated,
            recipients,
            subject: format!("Task updated: {}", task.title),
            body,
            task_id: task.id,
            task_title: task.title.clone(),
        }
    }

    pub fn task_assignment(task: &TaskSnapshot, assigned_by: &UserRef, assignee: &UserRef) -> Self {
        let body = format!(
            "You have been assigned as owner of a task:\n\n\
             Task: {title}\nDue Date: {due}\nPriority: {priority}\nStatus: {status}\n\
             Assigned by: {by}\nProject: {project}",
            title = task.title,
            due = due_label(task),
            priority = task.priority,
            status = task.status.label(),
            by = assigned_by.email,
            project = task.project_label(),
        );
        Self {
            kind: AlertKind::TaskAssignment,
            recipients: vec![assignee.email.clone()],
            subject: format!("New task assignment: {}", task.title),
            body,
            task_id: task.id,
            task_title: task.title.clone(),
        }
    }

    /// Due-soon or overdue notice. `days_until_due` is negative once the due
    /// date has passed.
    pub fn due_date_reminder(
        task: &TaskSnapshot,
        days_until_due: i64,
        recipients: Vec<String>,
    ) -> Self {
        let (status, days_text) = if days_until_due < 0 {
            ("overdue", format!("{} days ago", -days_until_due))
        } else {
            ("due soon", format!("in {} days", days_until_due))
        };
        let body = format!(
            "Task '{title}' is {status} ({days_text})\n\n\
             Due Date: {due}\nProject: {project}\nCurrent Status: {current}\n\
             Priority: {priority}\n\n\
             Please take appropriate action to complete this task.",
            title = task.title,
            due = due_label(task),
            project = task.project_label(),
            current = task.status.label(),
            priority = task.priority,
        );
        Self {
            kind: AlertKind::DueDateReminder,
            recipients,
            subject: format!("Task {}: {}", status, task.title),
            body,
            task_id: task.id,
            task_title: task.title.clone(),
        }
    }

    pub fn task_created(
        task: &TaskSnapshot,
        created_by: &UserRef,
        recipients: Vec<String>,
    ) -> Self {
        let body = format!(
            "A new task has been created:\n\n\
             Task: {title}\nDue Date: {due}\nPriority: {priority}\nStatus: {status}\n\
             Created by: {by}\nProject: {project}\n\nTeam:\n{team}",
            title = task.title,
            due = due_label(task),
            priority = task.priority,
            status = task.status.label(),
            by = created_by.email,
            project = task.project_label(),
            team = team_lines(task),
        );
        Self {
            kind: AlertKind::TaskCreated,
            recipients,
            subject: format!("New task created: {}", task.title),
            body,
            task_id: task.id,
            task_title: task.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use chrono::NaiveDate;

    fn task() -> TaskSnapshot {
        TaskSnapshot {
            id: Uuid::new_v4(),
            title: "Design".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            status: TaskStatus::Ongoing,
            owner: UserRef::new(Uuid::new_v4(), "owner@example.com", "Owner"),
            collaborators: vec![],
            project_name: Some("Launch".into()),
            priority: 3,
            notes: None,
        }
    }

    #[test]
    fn test_task_updated_lists_each_change() {
        let t = task();
        let actor = UserRef::new(Uuid::new_v4(), "y@example.com", "Y");
        let changes = vec![
            FieldChange::new("status", Some("Ongoing"), Some("Completed")),
            FieldChange::new("notes", Some(""), None::<String>),
        ];
        let alert = Alert::task_updated(&t, &actor, &changes, vec!["owner@example.com".into()]);
        assert_eq!(alert.subject, "Task updated: Design");
        assert!(alert.body.contains("status:\n  From: Ongoing\n  To: Completed"));
        assert!(alert.body.contains("notes:\n  From: Empty\n  To: Empty"));
        assert!(alert.body.contains("Due Date: 2025-01-01"));
    }

    #[test]
    fn test_assignment_targets_assignee_only() {
        let t = task();
        let boss = UserRef::new(Uuid::new_v4(), "boss@example.com", "Boss");
        let assignee = UserRef::new(Uuid::new_v4(), "new@example.com", "New");
        let alert = Alert::task_assignment(&t, &boss, &assignee);
        assert_eq!(alert.recipients, vec!["new@example.com".to_string()]);
        assert_eq!(alert.kind, AlertKind::TaskAssignment);
        assert!(alert.body.contains("Assigned by: boss@example.com"));
    }

    #[test]
    fn test_due_date_reminder_subjects() {
        let t = task();
        let soon = Alert::due_date_reminder(&t, 3, vec!["owner@example.com".into()]);
        assert_eq!(soon.subject, "Task due soon: Design");
        assert!(soon.body.starts_with("Task 'Design' is due soon (in 3 days)"));

        let late = Alert::due_date_reminder(&t, -2, vec!["owner@example.com".into()]);
        assert_eq!(late.subject, "Task overdue: Design");
        assert!(late.body.starts_with("Task 'Design' is overdue (2 days ago)"));
        assert_eq!(late.kind, AlertKind::DueDateReminder);
    }

    #[test]
    fn test_task_created_lists_team() {
        let mut t = task();
        t.collaborators = vec![UserRef::new(Uuid::new_v4(), "bob@example.com", "Bob")];
        let creator = t.owner.clone();
        let alert = Alert::task_created(&t, &creator, vec!["bob@example.com".into()]);
        assert_eq!(alert.subject, "New task created: Design");
        assert!(alert.body.contains("Created by: owner@example.com"));
        let team = "  owner@example.com (Owner)\n  bob@example.com (Collaborator)";
        assert!(alert.body.contains(team));
        assert_eq!(serde_json::to_value(alert.kind).unwrap(), "task_creation");
    }
}
