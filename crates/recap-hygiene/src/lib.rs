//! # recap-hygiene
//!
//! Context hygiene and guardrails: validation, sanitization, ordering, and
//! conflict checks applied to every message and chunk before it reaches a
//! completion backend.
//!
//! The layer is stateless apart from its compiled pattern tables and
//! depends only on the shared data model.

mod conflicts;
mod message;
mod patterns;
mod report;
mod structure;

pub use report::{ChunkAnalysis, ChunkSizeDistribution, HygieneReport, MemoryAnalysis, MessageAnalysis};

use aho_corasick::AhoCorasick;
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

/// Outcome of validating a single message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the content may be processed at all.
    pub valid: bool,

    /// Hard findings (empty content, sensitive data, encoding problems).
    pub issues: Vec<String>,

    /// Soft findings that never block processing.
    pub warnings: Vec<String>,

    /// Rewritten content, present only when the original was modified.
    pub sanitized: Option<String>,
}

/// Stateless validators, sanitizers, and classifiers for conversation
/// context. Holds only the compiled pattern tables.
pub struct ContextHygiene {
    /// Sensitive-data patterns with their finding labels.
    sensitive: Vec<(Regex, &'static str)>,

    /// Anchored low-information message patterns.
    low_information: RegexSet,

    /// Literal topic-shift marker phrases.
    shift_markers: AhoCorasick,
}

impl ContextHygiene {
    /// Compile the fixed pattern tables.
    pub fn new() -> Self {
        let sensitive = patterns::SENSITIVE_PATTERNS
            .iter()
            .map(|(pattern, name)| {
                let regex = Regex::new(pattern)
                    .unwrap_or_else(|e| panic!("invalid sensitive pattern '{}': {}", name, e));
                (regex, *name)
            })
            .collect();

        let low_information = RegexSet::new(patterns::LOW_INFORMATION_PATTERNS)
            .expect("invalid low-information patterns");

        let shift_markers = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(patterns::TOPIC_SHIFT_MARKERS)
            .expect("failed to build topic-shift automaton");

        Self {
            sensitive,
            low_information,
            shift_markers,
        }
    }
}

impl Default for ContextHygiene {
    fn default() -> Self {
        Self::new()
    }
}
