use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A structured resume as produced by the structuring or revision agent.
///
/// The exact shape (sections, entries, fields) is owned by the agent's output
/// schema, not by this service. We copy it, snapshot it for before/after
/// comparison, and forward it verbatim — never field-validate it in depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resume(pub Value);

/// One entry in the conversation transcript. Append-only, volatile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
