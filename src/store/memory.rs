//! In-process `NotificationStore` with the same uniqueness rule as the
//! Postgres schema. Reminder rows are unique per (user, task, lead time,
//! kind); rows without a lead time never conflict, matching `NULL` semantics
//! of the unique index.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{InsertOutcome, NewNotification, NotificationStore};
use crate::errors::StoreError;
use crate::models::notification::{Notification, NotificationKind};

#[derive(Debug, Default)]
pub struct MemoryStore {
    // (insertion sequence, row); the sequence breaks created_at ties.
    rows: Vec<(u64, Notification)>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Notification> {
        self.rows.iter().map(|(_, n)| n)
    }

    fn newest_first(&self, mut keep: impl FnMut(&Notification) -> bool) -> Vec<Notification> {
        let mut matched: Vec<&(u64, Notification)> =
            self.rows.iter().filter(|(_, n)| keep(n)).collect();
        matched.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        matched.into_iter().map(|(_, n)| n.clone()).collect()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn find_reminder(
        &mut self,
        user_id: Uuid,
        task_id: Uuid,
        days_before: i32,
    ) -> Result<Option<Notification>, StoreError> {
        Ok(self
            .all()
            .find(|n| {
                n.user_id == user_id
                    && n.task_id == task_id
                    && n.trigger_days_before == Some(days_before)
                    && n.kind == NotificationKind::DueDateReminder
            })
            .cloned())
    }

    async fn insert(&mut self, new: NewNotification) -> Result<InsertOutcome, StoreError> {
        let kind = new.kind();
        if let Some(days) = new.trigger_days_before {
            let exists = self.all().any(|n| {
                n.user_id == new.user_id
                    && n.task_id == new.task_id
                    && n.trigger_days_before == Some(days)
                    && n.kind == kind
            });
            if exists {
                return Ok(InsertOutcome::Duplicate);
            }
        }

        let id = Uuid::new_v4();
        let row = Notification {
            id,
            user_id: new.user_id,
            task_id: new.task_id,
            kind,
            payload: serde_json::to_value(&new.payload)?,
            trigger_days_before: new.trigger_days_before,
            comment_id: new.comment_id,
            is_read: false,
            created_at: Utc::now(),
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.push((seq, row));
        Ok(InsertOutcome::Inserted(id))
    }

    async fn delete_for_task(&mut self, task_id: Uuid) -> Result<u64, StoreError> {
        let before = self.rows.len();
        self.rows.retain(|(_, n)| n.task_id != task_id);
        Ok((before - self.rows.len()) as u64)
    }

    async fn delete_reminders_for_task(&mut self, task_id: Uuid) -> Result<u64, StoreError> {
        let before = self.rows.len();
        self.rows.retain(|(_, n)| {
            !(n.task_id == task_id && n.kind == NotificationKind::DueDateReminder)
        });
        Ok((before - self.rows.len()) as u64)
    }

    async fn mark_read(&mut self, id: Uuid) -> Result<Option<Notification>, StoreError> {
        Ok(self
            .rows
            .iter_mut()
            .find(|(_, n)| n.id == id)
            .map(|(_, n)| {
                n.is_read = true;
                n.clone()
            }))
    }

    async fn mark_all_read(&mut self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut updated = 0;
        for (_, n) in self.rows.iter_mut() {
            if n.user_id == user_id && !n.is_read {
                n.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn count_unread(&mut self, user_id: Uuid) -> Result<i64, StoreError> {
        Ok(self
            .all()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn list_for_user(&mut self, user_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        Ok(self.newest_first(|n| n.user_id == user_id))
    }

    async fn list_for_task(&mut self, task_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        Ok(self.newest_first(|n| n.task_id == task_id))
    }
}
