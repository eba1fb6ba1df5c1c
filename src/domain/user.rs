use serde::{Deserialize, Serialize};

use super::UserId;

/// Minimal user reference the engine needs for role resolution and
/// notification addressing. Identity and role management live outside the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            username: username.into(),
        }
    }
}
