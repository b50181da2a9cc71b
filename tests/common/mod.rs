#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use tasknotify::clock::FixedClock;
use tasknotify::models::task::{TaskSnapshot, TaskStatus};
use tasknotify::models::user::UserRef;
use uuid::Uuid;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn clock() -> FixedClock {
    FixedClock(today())
}

pub fn user(email: &str) -> UserRef {
    let name = email.split('@').next().unwrap_or(email).to_string();
    UserRef::new(Uuid::new_v4(), email, name)
}

/// An ONGOING task in project "Launch" due `days` from [`today`].
pub fn task_due_in(days: i64, owner: &UserRef, collaborators: &[UserRef]) -> TaskSnapshot {
    TaskSnapshot {
        id: Uuid::new_v4(),
        title: "Design".into(),
        due_date: Some(today() + Duration::days(days)),
        status: TaskStatus::Ongoing,
        owner: owner.clone(),
        collaborators: collaborators.to_vec(),
        project_name: Some("Launch".into()),
        priority: 5,
        notes: None,
    }
}
