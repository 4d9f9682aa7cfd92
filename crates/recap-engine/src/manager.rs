//! Per-session context manager: token accounting, salience scoring, and
//! the ingestion/assembly orchestration.

use chrono::{DateTime, Utc};
use recap_core::config::ContextConfig;
use recap_core::token;
use recap_core::types::{
    ContextChunk, ContextMessage, ContextStats, Message, Role, SessionMemory, TokenBreakdown,
};
use recap_hygiene::{ContextHygiene, ValidationOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::completion::CompletionClient;
use crate::condenser::CondensationReport;
use crate::error::{ContextError, Result};

/// Usage ratio of the available budget at which condensation triggers.
pub(crate) const CONDENSATION_USAGE_RATIO: f64 = 0.90;

/// Stored-message count above which condensation always triggers.
pub(crate) const CONDENSATION_MESSAGE_LIMIT: usize = 50;

/// Fraction of the available budget the recent window alone may occupy.
pub(crate) const RECENT_WINDOW_PRESSURE_RATIO: f64 = 0.70;

/// Hours over which message salience decays to its floor.
const SALIENCE_DECAY_HOURS: f64 = 24.0;

/// Salience floor applied by time decay.
const SALIENCE_DECAY_FLOOR: f64 = 0.1;

/// Salience ceiling.
const SALIENCE_CEILING: f64 = 2.0;

/// Messages inspected by the ingestion topic-shift check.
const TOPIC_SHIFT_WINDOW: usize = 3;

/// Report returned by [`ContextManager::ingest`].
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// The stored message.
    pub message: Message,

    /// Whether the stored content was sanitized.
    pub sanitized: bool,

    /// Validation warnings attached to the message.
    pub warnings: Vec<String>,

    /// Whether the latest turns indicate a topic shift.
    pub topic_shift: bool,

    /// Present when ingestion triggered condensation.
    pub condensation: Option<CondensationReport>,

    /// Post-ingestion stats snapshot.
    pub stats: ContextStats,
}

/// A canonical fact to insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactUpdate {
    pub key: String,
    pub value: String,
}

/// Guarded session-memory update from outside the engine: the profile and
/// scratch fields are replaceable wholesale, constraints go through the
/// capped/deduplicated path, and facts through key/value insertion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryUpdate {
    #[serde(default)]
    pub profile: Option<BTreeMap<String, serde_json::Value>>,

    #[serde(default)]
    pub current_topic: Option<String>,

    #[serde(default)]
    pub working_context: Option<String>,

    #[serde(default)]
    pub add_constraint: Option<String>,

    #[serde(default)]
    pub add_fact: Option<FactUpdate>,
}

/// Result of assembling a cleaned context payload.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledContext {
    /// Cleaned, reordered messages ready for the completion backend.
    pub messages: Vec<recap_core::types::CleanedMessage>,

    /// Coarse token count over the cleaned contents.
    pub token_count: usize,

    /// Structural warnings from the pre-clean validation pass.
    pub warnings: Vec<String>,
}

/// Owns one conversation's message list, chunk store, and session memory.
///
/// A manager is never shared across sessions and must not be accessed
/// concurrently; the registry serializes access per session.
pub struct ContextManager {
    pub(crate) config: ContextConfig,
    pub(crate) messages: Vec<Message>,
    pub(crate) chunks: Vec<ContextChunk>,
    pub(crate) memory: SessionMemory,
    pub(crate) hygiene: ContextHygiene,
    pub(crate) last_condensation_time: Option<DateTime<Utc>>,
    pub(crate) condensation_count: u32,
}

impl ContextManager {
    /// Create a manager with the given budget configuration.
    pub fn new(config: ContextConfig) -> Self {
        Self {
            config,
            messages: Vec::new(),
            chunks: Vec::new(),
            memory: SessionMemory::new(),
            hygiene: ContextHygiene::new(),
            last_condensation_time: None,
            condensation_count: 0,
        }
    }

    /// Budget configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Stored messages.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Retained chunks.
    pub fn chunks(&self) -> &[ContextChunk] {
        &self.chunks
    }

    /// Session memory.
    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    /// Mutable session memory. Wire-level callers should go through
    /// [`ContextManager::update_memory`] instead.
    pub fn memory_mut(&mut self) -> &mut SessionMemory {
        &mut self.memory
    }

    /// Apply a guarded memory update and return the resulting memory.
    pub fn update_memory(&mut self, update: MemoryUpdate) -> &SessionMemory {
        if let Some(profile) = update.profile {
            self.memory.profile = profile;
        }
        if let Some(topic) = update.current_topic {
            self.memory.current_topic = topic;
        }
        if let Some(context) = update.working_context {
            self.memory.working_context = context;
        }
        if let Some(constraint) = update.add_constraint {
            self.memory.record_constraint(constraint);
        }
        if let Some(fact) = update.add_fact {
            self.memory.set_fact(fact.key, fact.value);
        }
        &self.memory
    }

    /// Validate, sanitize, and append a message, then recompute salience
    /// over the whole retained list.
    ///
    /// Rejected content (empty, unencodable) returns the itemized issues.
    pub fn add_message(&mut self, role: Role, content: &str, salience_hint: f64) -> Result<Message> {
        self.admit(role, content, salience_hint)
            .map(|(message, _)| message)
    }

    /// Shared append path returning the validation outcome alongside the
    /// stored message.
    fn admit(
        &mut self,
        role: Role,
        content: &str,
        salience_hint: f64,
    ) -> Result<(Message, ValidationOutcome)> {
        let outcome = self.hygiene.validate_message(content, role.as_str());
        if !outcome.valid && outcome.sanitized.is_none() {
            return Err(ContextError::Rejected {
                issues: outcome.issues,
            });
        }

        let body = outcome
            .sanitized
            .clone()
            .unwrap_or_else(|| content.to_string());
        let message = Message::new(role, body, salience_hint);
        self.messages.push(message.clone());
        self.update_salience();
        Ok((message, outcome))
    }

    /// Full recompute of every retained message's salience: time decay
    /// (floored) times position bias, clamped to the ceiling. The retained
    /// list is bounded by condensation, which keeps this linear pass cheap.
    fn update_salience(&mut self) {
        let now = Utc::now();
        let count = self.messages.len();
        for (i, msg) in self.messages.iter_mut().enumerate() {
            let decay = (1.0 - msg.age_hours(now) / SALIENCE_DECAY_HOURS).max(SALIENCE_DECAY_FLOOR);
            let position_bias = (i + 1) as f64 / count as f64;
            msg.salience = (msg.salience * decay * position_bias).min(SALIENCE_CEILING);
        }
    }

    /// Token usage across the context components. Memory-derived fields
    /// can be excluded for recent-only estimates.
    pub fn estimate_context_tokens(&self, include_memory: bool) -> TokenBreakdown {
        let mut breakdown = TokenBreakdown::default();
        if include_memory {
            breakdown.constraints_decisions = token::flat_tokens(&self.memory.constraints_text());
            breakdown.rolling_summary = token::flat_tokens(&self.memory.rolling_summary);
            breakdown.scratchpad = token::flat_tokens(&self.memory.scratch_text());
        }
        breakdown.recent_messages = self
            .recent_messages()
            .iter()
            .map(|m| m.token_estimate)
            .sum();
        breakdown.finalize()
    }

    /// The most recent `recent_window_size` messages.
    pub(crate) fn recent_messages(&self) -> &[Message] {
        let start = self
            .messages
            .len()
            .saturating_sub(self.config.recent_window_size);
        &self.messages[start..]
    }

    /// Whether the condensation pipeline should run. Any single trigger is
    /// sufficient; the triggers fire well before the hard budget so
    /// headroom remains for the reply.
    pub fn needs_condensation(&self) -> bool {
        let breakdown = self.estimate_context_tokens(true);
        let available = self.config.available_tokens() as f64;

        breakdown.total as f64 / available >= CONDENSATION_USAGE_RATIO
            || self.messages.len() > CONDENSATION_MESSAGE_LIMIT
            || breakdown.recent_messages as f64 > available * RECENT_WINDOW_PRESSURE_RATIO
    }

    /// Stats snapshot for the registry surface.
    pub fn stats(&self) -> ContextStats {
        let breakdown = self.estimate_context_tokens(true);
        let available = self.config.available_tokens();
        ContextStats {
            total_messages: self.messages.len(),
            chunk_count: self.chunks.len(),
            usage_percentage: if available == 0 {
                0.0
            } else {
                breakdown.total as f64 / available as f64 * 100.0
            },
            condensation_count: self.condensation_count,
            last_condensation_time: self.last_condensation_time,
            needs_condensation: self.needs_condensation(),
            constraint_count: self.memory.constraints_decisions.len(),
            has_summary: !self.memory.rolling_summary.is_empty(),
            summary_version: self.memory.summary_version,
            available_tokens: available,
            max_tokens: self.config.max_tokens,
            token_breakdown: breakdown,
        }
    }

    /// Most recent `limit` messages, all of them when `None`.
    pub fn history(&self, limit: Option<usize>) -> &[Message] {
        match limit {
            Some(n) => {
                let start = self.messages.len().saturating_sub(n);
                &self.messages[start..]
            }
            None => &self.messages,
        }
    }

    /// The full ingestion path: validate/sanitize, append, recompute
    /// salience, check the last turns for a topic shift, and condense when
    /// a trigger is active.
    ///
    /// Running condensation on the append path keeps the retained list
    /// bounded, which in turn bounds the full-list salience recompute.
    pub async fn ingest(
        &mut self,
        role: Role,
        content: &str,
        salience_hint: f64,
        client: &dyn CompletionClient,
    ) -> Result<IngestReport> {
        let (message, outcome) = self.admit(role, content, salience_hint)?;

        let tail_start = self.messages.len().saturating_sub(TOPIC_SHIFT_WINDOW);
        let tail: Vec<ContextMessage> = self.messages[tail_start..]
            .iter()
            .map(ContextMessage::from)
            .collect();
        let topic_shift = self.hygiene.detect_topic_shift(&tail);

        let condensation = if self.needs_condensation() {
            Some(self.condense_context(client).await)
        } else {
            None
        };

        Ok(IngestReport {
            sanitized: outcome.sanitized.is_some(),
            warnings: outcome.warnings,
            message,
            topic_shift,
            condensation,
            stats: self.stats(),
        })
    }

    /// Build the ordered context, then re-validate, reorder, and clean it
    /// for the completion backend.
    pub fn assemble_context(&self, query: &str) -> AssembledContext {
        let raw = self.build_context_for_llm(query);

        let structure = self.hygiene.validate_context_structure(&raw);
        if !structure.valid {
            debug!(issues = ?structure.issues, "assembled context failed structural validation");
        }

        let ordered = self.hygiene.optimize_context_order(&raw);
        let cleaned = self.hygiene.clean_conversation_history(&ordered);
        let token_count = cleaned
            .iter()
            .map(|m| token::flat_tokens(&m.message.content))
            .sum();

        AssembledContext {
            messages: cleaned,
            token_count,
            warnings: structure.warnings,
        }
    }

    /// Hygiene report over this manager's messages, chunks, and memory.
    pub fn hygiene_report(&self) -> recap_hygiene::HygieneReport {
        self.hygiene
            .generate_hygiene_report(&self.messages, &self.chunks, &self.memory)
    }
}
