//! Keyword-based chunk retrieval and context assembly.

use chrono::Utc;
use recap_core::text::words;
use recap_core::types::{ContextChunk, ContextMessage};

use crate::manager::ContextManager;

/// Minimum retrieval score for a chunk to be returned.
const MIN_RETRIEVAL_SCORE: f64 = 0.1;

/// Chunks embedded in the retrieval system message.
const RETRIEVED_CONTEXT_CHUNKS: usize = 3;

/// Hours over which a chunk's retrieval weight decays to its floor.
const CHUNK_DECAY_HOURS: f64 = 48.0;

/// Retrieval weight floor for old chunks.
const CHUNK_DECAY_FLOOR: f64 = 0.5;

impl ContextManager {
    /// Rank retained chunks against the query by Jaccard word overlap,
    /// boosted by chunk kind and discounted by age.
    ///
    /// Chunks at or below the score floor are dropped; survivors are
    /// sorted by descending score with ties keeping their original
    /// relative order, and the top `max_chunks` are returned.
    pub fn semantic_retrieval(&self, query: &str, max_chunks: usize) -> Vec<ContextChunk> {
        if self.chunks.is_empty() {
            return Vec::new();
        }

        let query_words = words(query);
        let now = Utc::now();

        let mut scored: Vec<(&ContextChunk, f64)> = Vec::new();
        for chunk in &self.chunks {
            let chunk_words = words(&chunk.content);
            let overlap = query_words.intersection(&chunk_words).count();
            let union = query_words.union(&chunk_words).count();
            let jaccard = overlap as f64 / union.max(1) as f64;

            let time_factor =
                (1.0 - chunk.age_hours(now) / CHUNK_DECAY_HOURS).max(CHUNK_DECAY_FLOOR);
            let score = jaccard * chunk.kind.boost() * time_factor;

            if score > MIN_RETRIEVAL_SCORE {
                scored.push((chunk, score));
            }
        }

        // Stable sort keeps insertion order for equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(max_chunks);
        scored.into_iter().map(|(chunk, _)| chunk.clone()).collect()
    }

    /// Assemble the ordered context payload: constraints, rolling summary,
    /// retrieved chunks, then the recent turns verbatim.
    ///
    /// Stable facts lead and live turns trail so that any downstream
    /// truncation loses recency last.
    pub fn build_context_for_llm(&self, query: &str) -> Vec<ContextMessage> {
        let mut context = Vec::new();

        if !self.memory.constraints_decisions.is_empty() {
            context.push(ContextMessage::system(format!(
                "Context Constraints & Decisions:\n{}",
                self.memory.constraints_text()
            )));
        }

        if !self.memory.rolling_summary.is_empty() {
            context.push(ContextMessage::system(format!(
                "Previous conversation summary: {}",
                self.memory.rolling_summary
            )));
        }

        if !query.is_empty() {
            let retrieved = self.semantic_retrieval(query, RETRIEVED_CONTEXT_CHUNKS);
            if !retrieved.is_empty() {
                let rendered = retrieved
                    .iter()
                    .map(|chunk| {
                        format!("[Relevant context from {}]: {}", chunk.kind, chunk.content)
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n");
                context.push(ContextMessage::system(format!(
                    "Relevant previous context:\n{rendered}"
                )));
            }
        }

        for msg in self.recent_messages() {
            context.push(ContextMessage::from(msg));
        }

        context
    }
}
