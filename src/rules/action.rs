//! Action descriptor format.
//!
//! Actions are stored as a JSON object with a fixed set of recognized,
//! optional fields: a structured configuration record, not code. The
//! descriptor is parsed once per dispatch and never stored in parsed form.

use serde::{Deserialize, Serialize};

/// Roles a `notify` action can address, resolved against the event context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyTarget {
    Assignee,
    Creator,
    Manager,
}

impl NotifyTarget {
    /// Closed mapping from role token to target. Tokens outside the set
    /// resolve to `None`: no recipient, never an error.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ASSIGNEE" => Some(NotifyTarget::Assignee),
            "CREATOR" => Some(NotifyTarget::Creator),
            "MANAGER" => Some(NotifyTarget::Manager),
            _ => None,
        }
    }
}

/// Parsed form of a rule's `actions` payload.
///
/// Absent fields are no-ops. Sub-actions execute independently and
/// best-effort; see the executor for the per-sub-action failure contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionDescriptor {
    /// Role tokens to notify, in order. Resolved through
    /// [`NotifyTarget::from_token`] at execution time so an unrecognized
    /// token skips silently instead of failing the descriptor.
    pub notify: Vec<String>,
    /// Priority token to apply to the task. Validated against the fixed
    /// priority set at execution time.
    pub set_priority: Option<String>,
    /// Recompute the deadline from now + configured hours and clear the
    /// breach/escalation flags.
    pub reset_sla: bool,
    /// Mark the task escalated (once per breach episode) and notify the
    /// project manager.
    pub escalate: bool,
}

impl ActionDescriptor {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
