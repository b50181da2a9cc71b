use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    Staff,
    Manager,
    Director,
    Hr,
}

/// Identity of a user as seen by the notification engine. Owned by the CRUD
/// layer; the engine only reads it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

impl UserRef {
    pub fn new(id: Uuid, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role: UserRole::default(),
        }
    }
}
