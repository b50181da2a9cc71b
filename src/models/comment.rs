use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRef;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommentSnapshot {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author: UserRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
