use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRef;

pub const NO_PROJECT: &str = "No Project";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum TaskStatus {
    #[serde(rename = "Unassigned")]
    Unassigned,
    #[serde(rename = "Ongoing")]
    Ongoing,
    #[serde(rename = "Pending Review")]
    PendingReview,
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Unassigned => "Unassigned",
            TaskStatus::Ongoing => "Ongoing",
            TaskStatus::PendingReview => "Pending Review",
            TaskStatus::Completed => "Completed",
        }
    }
}

/// Current field values of a task, loaded by the CRUD layer and handed to the
/// engine on every trigger.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaskSnapshot {
    pub id: Uuid,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub owner: UserRef,
    #[serde(default)]
    pub collaborators: Vec<UserRef>,
    pub project_name: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub notes: Option<String>,
}

impl TaskSnapshot {
    pub fn project_label(&self) -> &str {
        self.project_name.as_deref().unwrap_or(NO_PROJECT)
    }

    /// Owner followed by collaborators, deduplicated by user id.
    pub fn participants(&self) -> Vec<&UserRef> {
        let mut seen = Vec::with_capacity(self.collaborators.len() + 1);
        std::iter::once(&self.owner)
            .chain(self.collaborators.iter())
            .filter(|u| {
                if seen.contains(&u.id) {
                    false
                } else {
                    seen.push(u.id);
                    true
                }
            })
            .collect()
    }

    /// Participants other than `actor`.
    pub fn participants_except(&self, actor: Uuid) -> Vec<&UserRef> {
        self.participants()
            .into_iter()
            .filter(|u| u.id != actor)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> UserRef {
        UserRef::new(Uuid::new_v4(), email, email)
    }

    fn task(owner: UserRef, collaborators: Vec<UserRef>) -> TaskSnapshot {
        TaskSnapshot {
            id: Uuid::new_v4(),
            title: "Design".into(),
            due_date: None,
            status: TaskStatus::Ongoing,
            owner,
            collaborators,
            project_name: None,
            priority: 5,
            notes: None,
        }
    }

    #[test]
    fn test_participants_dedupes_owner_listed_as_collaborator() {
        let owner = user("owner@example.com");
        let bob = user("bob@example.com");
        let t = task(owner.clone(), vec![bob.clone(), owner.clone(), bob.clone()]);
        let ids: Vec<Uuid> = t.participants().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![owner.id, bob.id]);
    }

    #[test]
    fn test_participants_except_actor() {
        let owner = user("owner@example.com");
        let bob = user("bob@example.com");
        let t = task(owner.clone(), vec![bob.clone()]);
        let others = t.participants_except(owner.id);
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, bob.id);
    }

    #[test]
    fn test_project_label_defaults() {
        let mut t = task(user("a@example.com"), vec![]);
        assert_eq!(t.project_label(), "No Project");
        t.project_name = Some("Launch".into());
        assert_eq!(t.project_label(), "Launch");
    }

    #[test]
    fn test_status_serializes_with_display_names() {
        let json = serde_json::to_string(&TaskStatus::PendingReview).unwrap();
        assert_eq!(json, "\"Pending Review\"");
    }
}
