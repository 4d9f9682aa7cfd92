//! Context chunks retained after their source messages are evicted.

use crate::id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a context chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Decision,
    Constraint,
    Fact,
    Exchange,
}

impl ChunkKind {
    /// Retrieval score multiplier for this kind.
    pub fn boost(&self) -> f64 {
        match self {
            ChunkKind::Decision => 1.5,
            ChunkKind::Constraint => 1.4,
            ChunkKind::Fact => 1.3,
            ChunkKind::Exchange => 1.0,
        }
    }

    /// Wire-format kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Decision => "decision",
            ChunkKind::Constraint => "constraint",
            ChunkKind::Fact => "fact",
            ChunkKind::Exchange => "exchange",
        }
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, classified snippet derived from one to three related
/// messages, kept for retrieval after the messages themselves are evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextChunk {
    /// Role-labeled chunk text.
    pub content: String,

    /// Ids of the source messages, in conversation order.
    pub source_message_ids: Vec<String>,

    /// Classification of the chunk text.
    pub kind: ChunkKind,

    /// Timestamp of the first source message.
    pub created_at: DateTime<Utc>,

    /// Combined token estimate of the source messages.
    pub token_estimate: usize,

    /// Deterministic hash of `content`, used for identity and dedup.
    pub content_fingerprint: String,
}

impl ContextChunk {
    /// Create a chunk, deriving the content fingerprint.
    pub fn new(
        content: String,
        source_message_ids: Vec<String>,
        kind: ChunkKind,
        created_at: DateTime<Utc>,
        token_estimate: usize,
    ) -> Self {
        let content_fingerprint = id::sha256(&content);
        Self {
            content,
            source_message_ids,
            kind,
            created_at,
            token_estimate,
            content_fingerprint,
        }
    }

    /// Age of the chunk in fractional hours relative to `now`.
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_milliseconds() as f64 / 3_600_000.0
    }
}
