//! Per-session aggregate memory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum retained constraint/decision entries.
pub const MAX_CONSTRAINTS: usize = 10;

/// Layered per-session memory: persistent profile, constraints and
/// decisions, canonical facts, entities, scratch fields, and the rolling
/// summary.
///
/// Maps are ordered so conflict scans and reports are deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMemory {
    /// Free-form persistent profile map.
    #[serde(default)]
    pub profile: BTreeMap<String, serde_json::Value>,

    /// Ordered constraint/decision entries, capped at [`MAX_CONSTRAINTS`].
    #[serde(default)]
    pub constraints_decisions: Vec<String>,

    /// Canonical key/value facts.
    #[serde(default)]
    pub canonical_facts: BTreeMap<String, String>,

    /// Known entities.
    #[serde(default)]
    pub entities: BTreeMap<String, String>,

    /// Scratch: current topic.
    #[serde(default)]
    pub current_topic: String,

    /// Scratch: working context.
    #[serde(default)]
    pub working_context: String,

    /// Rolling summary text, replaced wholesale at each condensation.
    #[serde(default)]
    pub rolling_summary: String,

    /// Monotonically incrementing summary version.
    #[serde(default)]
    pub summary_version: u32,
}

impl SessionMemory {
    /// Create an empty session memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append constraint/decision entries, deduplicating against existing
    /// entries and keeping only the most recent [`MAX_CONSTRAINTS`];
    /// oldest entries are dropped first on overflow.
    pub fn record_constraints<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = String>,
    {
        for entry in entries {
            if !self.constraints_decisions.contains(&entry) {
                self.constraints_decisions.push(entry);
            }
        }
        while self.constraints_decisions.len() > MAX_CONSTRAINTS {
            self.constraints_decisions.remove(0);
        }
    }

    /// Append a single constraint/decision entry.
    pub fn record_constraint(&mut self, entry: impl Into<String>) {
        self.record_constraints([entry.into()]);
    }

    /// Set a canonical fact.
    pub fn set_fact(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.canonical_facts.insert(key.into(), value.into());
    }

    /// All constraint/decision entries joined for rendering.
    pub fn constraints_text(&self) -> String {
        self.constraints_decisions.join("\n")
    }

    /// Scratch fields joined for token accounting.
    pub fn scratch_text(&self) -> String {
        format!("{} {}", self.current_topic, self.working_context)
    }
}
