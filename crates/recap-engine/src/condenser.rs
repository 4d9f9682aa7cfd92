//! The condensation pipeline: summarize, extract, chunk, trim, evict.

use recap_core::text;
use recap_core::types::Message;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::completion::{complete_with_timeout, CompletionClient, COMPLETION_TIMEOUT};
use crate::manager::ContextManager;

/// Maximum retained chunks after pruning.
const MAX_RETAINED_CHUNKS: usize = 20;

/// Messages from the tail of the older slice used for extraction.
const EXTRACTION_WINDOW: usize = 5;

/// Longest fallback summary.
const MAX_FALLBACK_SUMMARY_CHARS: usize = 200;

/// Common words ignored when picking the fallback summary topic.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "should", "could", "can", "may", "might", "must", "i", "you", "he", "she", "it",
    "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our", "their",
];

/// Outcome of one condensation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CondensationReport {
    /// Whether the pipeline ran at all.
    pub condensed: bool,

    /// Token delta (negative when the condensed form grew).
    pub token_savings: i64,

    /// Total tokens before the run.
    pub original_tokens: usize,

    /// Total tokens after the run.
    pub new_tokens: usize,

    /// Messages folded into summary/chunks and trimmed.
    pub messages_summarized: usize,

    /// Chunks created this run.
    pub chunks_created: usize,

    /// Rolling summary version after the run.
    pub summary_version: u32,
}

/// Structured payload expected from the extraction call.
#[derive(Debug, Default, Deserialize)]
struct ExtractionPayload {
    #[serde(default)]
    decisions: Vec<String>,

    #[serde(default)]
    constraints: Vec<String>,
}

impl ContextManager {
    /// Run the condensation pipeline when a trigger is active, reporting
    /// zero savings otherwise.
    ///
    /// Every step is best-effort: a failing completion backend degrades
    /// the summary to the deterministic fallback and skips extraction, but
    /// chunking, the hard trim, and chunk eviction always run and the call
    /// never fails. The trim happens only after the summary, extraction,
    /// and chunking steps have each resolved.
    pub async fn condense_context(&mut self, client: &dyn CompletionClient) -> CondensationReport {
        if !self.needs_condensation() {
            return CondensationReport {
                summary_version: self.memory.summary_version,
                ..Default::default()
            };
        }

        let original_tokens = self.estimate_context_tokens(true).total;

        let split = self
            .messages
            .len()
            .saturating_sub(self.config.recent_window_size);
        let older: Vec<Message> = self.messages[..split].to_vec();

        if !older.is_empty() {
            let summary = self.build_rolling_summary(&older, client).await;
            self.memory.rolling_summary = summary;
            self.memory.summary_version += 1;

            self.extract_constraints(&older, client).await;
        }

        let new_chunks = self.create_context_chunks(&older);
        let chunks_created = new_chunks.len();
        self.chunks.extend(new_chunks);

        // Hard trim: evicted messages survive only as chunks and summary
        self.messages.drain(..split);

        // Evict all but the most recently created chunks
        if self.chunks.len() > MAX_RETAINED_CHUNKS {
            self.chunks.drain(..self.chunks.len() - MAX_RETAINED_CHUNKS);
        }

        let new_tokens = self.estimate_context_tokens(true).total;
        self.last_condensation_time = Some(chrono::Utc::now());
        self.condensation_count += 1;

        debug!(
            messages_summarized = older.len(),
            chunks_created,
            token_savings = original_tokens as i64 - new_tokens as i64,
            "condensation complete"
        );

        CondensationReport {
            condensed: true,
            token_savings: original_tokens as i64 - new_tokens as i64,
            original_tokens,
            new_tokens,
            messages_summarized: older.len(),
            chunks_created,
            summary_version: self.memory.summary_version,
        }
    }

    /// Summarize the older slice, folding in the previous summary. Falls
    /// back to the deterministic topic line when the backend fails.
    async fn build_rolling_summary(
        &self,
        older: &[Message],
        client: &dyn CompletionClient,
    ) -> String {
        let prompt = build_summary_prompt(older, &self.memory.rolling_summary);
        match complete_with_timeout(client, &prompt, COMPLETION_TIMEOUT).await {
            Ok(response) => response.trim().to_string(),
            Err(err) => {
                warn!(error = %err, "summary completion failed, using fallback");
                fallback_summary(older)
            }
        }
    }

    /// Ask the backend for structured decisions and constraints and merge
    /// them into session memory. Failures and unparsable payloads are
    /// skipped.
    async fn extract_constraints(&mut self, older: &[Message], client: &dyn CompletionClient) {
        let tail = &older[older.len().saturating_sub(EXTRACTION_WINDOW)..];
        let prompt = build_extraction_prompt(tail);

        let response = match complete_with_timeout(client, &prompt, COMPLETION_TIMEOUT).await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "constraint extraction failed, skipping");
                return;
            }
        };

        let Some(payload) = parse_extraction(&response) else {
            debug!("constraint extraction returned no parsable payload");
            return;
        };

        self.memory
            .record_constraints(payload.decisions.into_iter().chain(payload.constraints));
    }
}

/// Render the older slice and the previous summary into the fixed
/// summarization instruction.
fn build_summary_prompt(messages: &[Message], previous_summary: &str) -> String {
    let mut conversation = String::new();
    for msg in messages {
        conversation.push_str(&format!("{}: {}\n\n", msg.role.label(), msg.content));
    }

    let previous = if previous_summary.is_empty() {
        "None"
    } else {
        previous_summary
    };

    format!(
        "Update this conversation summary with new information. Focus on:\n\
         1. Key decisions made ([Decision]: format)\n\
         2. Important constraints ([Constraint]: format)\n\
         3. Factual discoveries ([Fact]: format)\n\
         4. Current working context\n\n\
         Previous summary: {previous}\n\n\
         New conversation:\n{conversation}\n\
         Updated summary (max 100 words, use tags):"
    )
}

/// Render the extraction instruction over the tail of the older slice.
fn build_extraction_prompt(messages: &[Message]) -> String {
    let mut conversation = String::new();
    for msg in messages {
        conversation.push_str(&format!("{}: {}\n", msg.role, msg.content));
    }

    format!(
        "Extract any explicit decisions or constraints from this conversation. Return as JSON:\n\n\
         {conversation}\n\
         Format:\n\
         {{\"decisions\": [\"Decision: Use X for Y\"], \"constraints\": [\"Constraint: Must avoid Z\"]}}\n\n\
         JSON:"
    )
}

/// Locate the outermost `{...}` span and parse it leniently.
fn parse_extraction(response: &str) -> Option<ExtractionPayload> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&response[start..=end]).ok()
}

/// Deterministic synthetic summary built from the single most frequent
/// content word; ties break toward first occurrence.
fn fallback_summary(messages: &[Message]) -> String {
    let mut rendered = String::new();
    for msg in messages {
        rendered.push_str(&msg.content);
        rendered.push(' ');
    }

    let topic = dominant_word(&rendered).unwrap_or_else(|| "general discussion".to_string());
    let summary = format!("Recent conversation about {topic}");
    summary.chars().take(MAX_FALLBACK_SUMMARY_CHARS).collect()
}

/// Most frequent word of at least four characters, stop words excluded.
fn dominant_word(rendered: &str) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for word in text::word_sequence(rendered) {
        if word.chars().count() < 4 || STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        match counts.iter_mut().find(|(seen, _)| *seen == word) {
            Some((_, n)) => *n += 1,
            None => counts.push((word, 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (word, count) in counts {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((word, count)),
        }
    }
    best.map(|(word, _)| word)
}
