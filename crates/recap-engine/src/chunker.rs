//! Chunk synthesis over evicted message slices.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use recap_core::text::keywords;
use recap_core::types::{ChunkKind, ContextChunk, Message};

use crate::manager::ContextManager;

/// Maximum chunk content length before absorption stops.
const MAX_CHUNK_CHARS: usize = 400;

/// Maximum messages absorbed into one chunk.
const MAX_CHUNK_MESSAGES: usize = 3;

/// Maximum seconds between related messages.
const RELATED_GAP_SECS: i64 = 300;

/// Minimum keyword overlap ratio for two messages to be related.
const RELATED_OVERLAP: f64 = 0.2;

static DECISION_PHRASES: Lazy<AhoCorasick> =
    Lazy::new(|| phrase_matcher(&["decision:", "decided", "let's use", "we'll go with", "agreed"]));

static CONSTRAINT_PHRASES: Lazy<AhoCorasick> =
    Lazy::new(|| phrase_matcher(&["constraint:", "must", "should not", "requirement", "rule"]));

static FACT_PHRASES: Lazy<AhoCorasick> =
    Lazy::new(|| phrase_matcher(&["fact:", "is defined as", "equals", "specification"]));

fn phrase_matcher(phrases: &[&str]) -> AhoCorasick {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(phrases)
        .expect("failed to build phrase matcher")
}

/// Classify chunk text by the first matching phrase table: decision
/// phrasing wins over constraint phrasing, constraints over facts, and
/// everything else is an exchange.
pub(crate) fn classify_chunk(content: &str) -> ChunkKind {
    if DECISION_PHRASES.is_match(content) {
        ChunkKind::Decision
    } else if CONSTRAINT_PHRASES.is_match(content) {
        ChunkKind::Constraint
    } else if FACT_PHRASES.is_match(content) {
        ChunkKind::Fact
    } else {
        ChunkKind::Exchange
    }
}

/// Two messages are related when they are close in time, alternate roles,
/// and share enough longer words.
fn related(seed: &Message, candidate: &Message) -> bool {
    if (candidate.created_at - seed.created_at).num_seconds().abs() > RELATED_GAP_SECS {
        return false;
    }
    if seed.role == candidate.role {
        return false;
    }

    let seed_words = keywords(&seed.content);
    let candidate_words = keywords(&candidate.content);
    let overlap = seed_words.intersection(&candidate_words).count();
    let smaller = seed_words.len().min(candidate_words.len()).max(1);
    overlap as f64 / smaller as f64 > RELATED_OVERLAP
}

impl ContextManager {
    /// Group a message slice into classified chunks of one to three
    /// related messages each, scanning left to right.
    pub(crate) fn create_context_chunks(&self, messages: &[Message]) -> Vec<ContextChunk> {
        let mut chunks = Vec::new();
        let mut i = 0;

        while i < messages.len() {
            let seed = &messages[i];
            let mut members = vec![seed];
            let mut content = format!("{}: {}", seed.role, seed.content);

            let mut j = i + 1;
            while j < messages.len() && j < i + MAX_CHUNK_MESSAGES {
                let candidate = &messages[j];
                if content.chars().count() < MAX_CHUNK_CHARS && related(seed, candidate) {
                    members.push(candidate);
                    content.push_str(&format!("\n{}: {}", candidate.role, candidate.content));
                    j += 1;
                } else {
                    break;
                }
            }

            let kind = classify_chunk(&content);
            chunks.push(ContextChunk::new(
                content,
                members.iter().map(|m| m.id.clone()).collect(),
                kind,
                seed.created_at,
                members.iter().map(|m| m.token_estimate).sum(),
            ));
            i = j;
        }

        chunks
    }
}
