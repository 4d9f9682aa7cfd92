//! Conversation message types.

use crate::{id, token};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire-format role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Human-readable label used when rendering transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }

    /// Parse a wire-format role name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single stored conversation message.
///
/// Messages are immutable after creation except for `salience`, which is
/// recomputed whenever the retained list changes. They are removed only by
/// the condensation trim step, never individually deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Fingerprint id derived from role, content, and creation time.
    pub id: String,

    /// Speaker role.
    pub role: Role,

    /// Message text.
    pub content: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Budgeting token estimate for the content.
    pub token_estimate: usize,

    /// Decayed, position-weighted importance score.
    pub salience: f64,
}

impl Message {
    /// Create a message with a derived fingerprint id and token estimate.
    pub fn new(role: Role, content: impl Into<String>, salience: f64) -> Self {
        let content = content.into();
        let created_at = Utc::now();
        let id = id::short_hash(&format!(
            "{}:{}:{}",
            role.as_str(),
            content,
            created_at.timestamp_micros()
        ));
        let token_estimate = token::estimate_tokens(&content);
        Self {
            id,
            role,
            content,
            created_at,
            token_estimate,
            salience,
        }
    }

    /// User message with default salience.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, 1.0)
    }

    /// Assistant message with default salience.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, 1.0)
    }

    /// System message with default salience.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, 1.0)
    }

    /// Age of the message in fractional hours relative to `now`.
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_milliseconds() as f64 / 3_600_000.0
    }
}
