use serde::{Deserialize, Serialize};

use super::{ProjectId, User};

/// Project reference carried in event contexts. The engine reads the
/// manager for role resolution and flips `archived` through the lifecycle
/// path; everything else about projects lives outside the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub manager: Option<User>,
    #[serde(default)]
    pub archived: bool,
}

impl Project {
    pub fn new(id: i64, name: impl Into<String>, manager: Option<User>) -> Self {
        Self {
            id: ProjectId(id),
            name: name.into(),
            manager,
            archived: false,
        }
    }
}
