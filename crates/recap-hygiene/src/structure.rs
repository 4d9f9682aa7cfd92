//! Context-level structural checks, ordering, and topic-shift detection.

use crate::patterns::{MAX_CONTEXT_CHARS, TOPIC_OVERLAP_THRESHOLD};
use crate::{ContextHygiene, ValidationOutcome};
use recap_core::text::keywords;
use recap_core::types::ContextMessage;
use std::collections::HashSet;

impl ContextHygiene {
    /// Validate the shape of an assembled context payload.
    ///
    /// An empty payload or missing fields make the payload invalid;
    /// unknown roles, broken turn alternation, and oversized payloads are
    /// warnings only.
    pub fn validate_context_structure(&self, messages: &[ContextMessage]) -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            valid: true,
            ..Default::default()
        };

        if messages.is_empty() {
            outcome.valid = false;
            outcome.issues.push("Empty context".to_string());
            return outcome;
        }

        let mut previous_turn_role: Option<String> = None;
        for (i, msg) in messages.iter().enumerate() {
            if msg.role.is_empty() || msg.content.is_empty() {
                outcome
                    .issues
                    .push(format!("Message {i} missing required fields"));
            }

            if !msg.role.is_empty()
                && !matches!(msg.role.as_str(), "system" | "user" | "assistant")
            {
                outcome
                    .warnings
                    .push(format!("Message {i} has unusual role: {}", msg.role));
            }

            // Turn alternation is tracked over the non-system conversation
            if matches!(msg.role.as_str(), "user" | "assistant") {
                if previous_turn_role.as_deref() == Some(msg.role.as_str()) {
                    outcome.warnings.push(format!(
                        "Unusual conversation flow: consecutive {} messages",
                        msg.role
                    ));
                }
                previous_turn_role = Some(msg.role.clone());
            }
        }

        let total_chars: usize = messages.iter().map(|m| m.content.chars().count()).sum();
        if total_chars > MAX_CONTEXT_CHARS {
            outcome
                .warnings
                .push(format!("Large context size: {total_chars} characters"));
        }

        outcome.valid = outcome.issues.is_empty();
        outcome
    }

    /// Reorder a context payload so stable system content leads.
    ///
    /// System messages are partitioned by content keyword into
    /// constraint-like, summary-like, and other; the payload is
    /// reassembled as other-system, constraints, summaries, then the
    /// conversation, each group preserving its internal order.
    pub fn optimize_context_order(&self, messages: &[ContextMessage]) -> Vec<ContextMessage> {
        let mut system = Vec::new();
        let mut constraints = Vec::new();
        let mut summaries = Vec::new();
        let mut conversation = Vec::new();

        for msg in messages {
            if msg.role == "system" {
                let content = msg.content.to_lowercase();
                if content.contains("constraint") || content.contains("decision") {
                    constraints.push(msg.clone());
                } else if content.contains("summary") || content.contains("context") {
                    summaries.push(msg.clone());
                } else {
                    system.push(msg.clone());
                }
            } else {
                conversation.push(msg.clone());
            }
        }

        system
            .into_iter()
            .chain(constraints)
            .chain(summaries)
            .chain(conversation)
            .collect()
    }

    /// Detect a topic shift in the most recent messages (callers pass the
    /// last three turns).
    ///
    /// The latest message is a shift when it carries an explicit marker
    /// phrase, or when its longer words overlap the prior messages' words
    /// by less than the threshold. Fewer than two messages never shift.
    pub fn detect_topic_shift(&self, recent: &[ContextMessage]) -> bool {
        if recent.len() < 2 {
            return false;
        }

        let latest = &recent[recent.len() - 1];
        if self.shift_markers.is_match(&latest.content) {
            return true;
        }

        if recent.len() >= 3 {
            let latest_words = keywords(&latest.content);
            let mut previous_words: HashSet<String> = HashSet::new();
            for msg in &recent[..recent.len() - 1] {
                previous_words.extend(keywords(&msg.content));
            }

            if !latest_words.is_empty() && !previous_words.is_empty() {
                let overlap = latest_words.intersection(&previous_words).count();
                let smaller = latest_words.len().min(previous_words.len());
                return (overlap as f64 / smaller as f64) < TOPIC_OVERLAP_THRESHOLD;
            }
        }

        false
    }
}
