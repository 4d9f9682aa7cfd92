//! Conflict detection over session memory.
//!
//! Conflicts are surfaced for the caller to resolve; no precedence rule is
//! applied.

use crate::patterns::{OPPOSING_PAIRS, VALUE_CONTRADICTIONS};
use crate::ContextHygiene;
use recap_core::text::keywords;
use recap_core::types::SessionMemory;
use std::collections::HashSet;

impl ContextHygiene {
    /// Report contradictory constraint statements and near-duplicate facts
    /// with opposing values, one entry per conflicting pair.
    pub fn detect_context_conflicts(&self, memory: &SessionMemory) -> Vec<String> {
        let mut conflicts = Vec::new();

        let constraints = &memory.constraints_decisions;
        for i in 0..constraints.len() {
            for j in (i + 1)..constraints.len() {
                if statements_contradict(&constraints[i], &constraints[j]) {
                    conflicts.push(format!(
                        "Contradictory constraints: {} vs {}",
                        constraints[i], constraints[j]
                    ));
                }
            }
        }

        let facts: Vec<(&String, &String)> = memory.canonical_facts.iter().collect();
        for i in 0..facts.len() {
            for j in (i + 1)..facts.len() {
                let (key_a, value_a) = facts[i];
                let (key_b, value_b) = facts[j];
                if facts_conflict(key_a, value_a, key_b, value_b) {
                    conflicts.push(format!(
                        "Conflicting facts: {key_a}={value_a} vs {key_b}={value_b}"
                    ));
                }
            }
        }

        conflicts
    }
}

/// True when one statement carries a term whose opposite appears in the
/// other, and the statements share at least two longer words (the
/// same-topic guard).
fn statements_contradict(a: &str, b: &str) -> bool {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();

    let opposed = OPPOSING_PAIRS.iter().any(|(positive, negative)| {
        (a_lower.contains(positive) && b_lower.contains(negative))
            || (b_lower.contains(positive) && a_lower.contains(negative))
    });
    if !opposed {
        return false;
    }

    let shared = keywords(&a_lower)
        .intersection(&keywords(&b_lower))
        .count();
    shared >= 2
}

/// True when two distinct fact keys are near-duplicates (two shared key
/// words) and their values differ with an opposing value pair.
fn facts_conflict(key_a: &str, value_a: &str, key_b: &str, value_b: &str) -> bool {
    let key_a_words = key_tokens(key_a);
    let key_b_words = key_tokens(key_b);
    if key_a_words.intersection(&key_b_words).count() < 2 {
        return false;
    }

    if value_a.eq_ignore_ascii_case(value_b) {
        return false;
    }

    let value_a = value_a.to_lowercase();
    let value_b = value_b.to_lowercase();
    VALUE_CONTRADICTIONS.iter().any(|(first, second)| {
        (value_a.contains(first) && value_b.contains(second))
            || (value_a.contains(second) && value_b.contains(first))
    })
}

/// Lower-cased, whitespace-delimited key tokens (keys are short phrases,
/// not prose).
fn key_tokens(key: &str) -> HashSet<String> {
    key.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
