use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{InsertOutcome, NewNotification, NotificationStore};
use crate::errors::StoreError;
use crate::models::notification::{Notification, NotificationKind};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, task_id, kind, payload, trigger_days_before, comment_id, is_read, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Build a pool without opening a connection until first use.
    pub fn connect_lazy(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new().connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Open a transaction. The CRUD layer writes its task mutation and runs
    /// the engine on `&mut *tx` before committing both together.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        Ok(self.pool.begin().await?)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

// Implemented on the connection itself so it works for pooled connections and
// open transactions alike (both deref to `PgConnection`).
#[async_trait]
impl NotificationStore for PgConnection {
    async fn find_reminder(
        &mut self,
        user_id: Uuid,
        task_id: Uuid,
        days_before: i32,
    ) -> Result<Option<Notification>, StoreError> {
        let sql = format!(
            r#"SELECT {NOTIFICATION_COLUMNS} FROM notifications
               WHERE user_id = $1 AND task_id = $2 AND trigger_days_before = $3 AND kind = $4"#
        );
        let row = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(task_id)
            .bind(days_before)
            .bind(NotificationKind::DueDateReminder)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn insert(&mut self, new: NewNotification) -> Result<InsertOutcome, StoreError> {
        let kind = new.kind();
        let payload = serde_json::to_value(&new.payload)?;

        let result = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO notifications (id, user_id, task_id, kind, payload, trigger_days_before, comment_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (user_id, task_id, trigger_days_before, kind) DO NOTHING
               RETURNING id"#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.task_id)
        .bind(kind)
        .bind(payload)
        .bind(new.trigger_days_before)
        .bind(new.comment_id)
        .fetch_optional(&mut *self)
        .await;

        match result {
            Ok(Some(id)) => Ok(InsertOutcome::Inserted(id)),
            Ok(None) => Ok(InsertOutcome::Duplicate),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(
                    user_id = %new.user_id,
                    task_id = %new.task_id,
                    "notification insert raced an existing row, treating as duplicate"
                );
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_for_task(&mut self, task_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM notifications WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *self)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_reminders_for_task(&mut self, task_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM notifications WHERE task_id = $1 AND kind = $2")
            .bind(task_id)
            .bind(NotificationKind::DueDateReminder)
            .execute(&mut *self)
            .await?;
        Ok(result.rows_affected())
    }

    async fn mark_read(&mut self, id: Uuid) -> Result<Option<Notification>, StoreError> {
        let sql = format!(
            "UPDATE notifications SET is_read = true WHERE id = $1 RETURNING {NOTIFICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;
        Ok(row)
    }

    async fn mark_all_read(&mut self, user_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(&mut *self)
        .await?;
        Ok(result.rows_affected())
    }

    async fn count_unread(&mut self, user_id: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&mut *self)
        .await?;
        Ok(count)
    }

    async fn list_for_user(&mut self, user_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        let sql = format!(
            r#"SELECT {NOTIFICATION_COLUMNS} FROM notifications
               WHERE user_id = $1
               ORDER BY created_at DESC, id DESC"#
        );
        let rows = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .fetch_all(&mut *self)
            .await?;
        Ok(rows)
    }

    async fn list_for_task(&mut self, task_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        let sql = format!(
            r#"SELECT {NOTIFICATION_COLUMNS} FROM notifications
               WHERE task_id = $1
               ORDER BY created_at DESC, id DESC"#
        );
        let rows = sqlx::query_as::<_, Notification>(&sql)
            .bind(task_id)
            .fetch_all(&mut *self)
            .await?;
        Ok(rows)
    }
}
