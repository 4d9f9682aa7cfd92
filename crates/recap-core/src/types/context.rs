//! Wire-format context messages handed to the completion backend.

use super::Message;
use serde::{Deserialize, Serialize};

/// A role-tagged message in the assembled context payload.
///
/// The role is a plain string so structural validation can flag missing or
/// unknown roles on caller-supplied payloads; stored messages always carry
/// one of the known roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub content: String,
}

impl ContextMessage {
    /// Create a context message.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// System-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

impl From<&Message> for ContextMessage {
    fn from(message: &Message) -> Self {
        Self::new(message.role.as_str(), message.content.clone())
    }
}

/// Hygiene findings attached to a cleaned message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HygieneNote {
    /// Hard findings recorded during validation.
    pub issues: Vec<String>,

    /// Soft findings recorded during validation.
    pub warnings: Vec<String>,

    /// Whether the content was rewritten.
    pub cleaned: bool,
}

/// A context message that survived history cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanedMessage {
    #[serde(flatten)]
    pub message: ContextMessage,

    /// Present when validation produced findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<HygieneNote>,
}
