//! Token accounting breakdown and the stats surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-component token usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBreakdown {
    /// Constraint/decision text.
    pub constraints_decisions: usize,

    /// Rolling summary text.
    pub rolling_summary: usize,

    /// Scratch fields.
    pub scratchpad: usize,

    /// The most recent messages kept verbatim.
    pub recent_messages: usize,

    /// Sum of all components.
    pub total: usize,
}

impl TokenBreakdown {
    /// Recompute `total` as the sum of the component fields.
    pub fn finalize(mut self) -> Self {
        self.total = self.constraints_decisions
            + self.rolling_summary
            + self.scratchpad
            + self.recent_messages;
        self
    }
}

/// Snapshot of a session's context state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextStats {
    /// Stored message count.
    pub total_messages: usize,

    /// Retained chunk count.
    pub chunk_count: usize,

    /// Per-component token usage.
    pub token_breakdown: TokenBreakdown,

    /// Usage as a percentage of the available budget.
    pub usage_percentage: f64,

    /// Completed condensation runs.
    pub condensation_count: u32,

    /// Time of the last condensation, if any.
    pub last_condensation_time: Option<DateTime<Utc>>,

    /// Whether a condensation trigger is currently active.
    pub needs_condensation: bool,

    /// Retained constraint/decision entries.
    pub constraint_count: usize,

    /// Whether a rolling summary exists.
    pub has_summary: bool,

    /// Rolling summary version.
    pub summary_version: u32,

    /// Tokens available for context after the reply reserve.
    pub available_tokens: usize,

    /// Total token budget.
    pub max_tokens: usize,
}
