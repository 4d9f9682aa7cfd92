//! Single-message validation and history cleaning.

use crate::patterns::{MAX_MESSAGE_CHARS, REDACTION_TOKEN, TRUNCATION_MARKER};
use crate::{ContextHygiene, ValidationOutcome};
use recap_core::types::{CleanedMessage, ContextMessage, HygieneNote};
use tracing::warn;

impl ContextHygiene {
    /// Validate one message body for safety and quality.
    ///
    /// Only missing content and encoding problems make a message invalid.
    /// Sensitive-data matches are recorded as issues and redacted in the
    /// sanitized output without rejecting the message; truncation and
    /// low-information content are warnings.
    pub fn validate_message(&self, content: &str, role: &str) -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            valid: true,
            ..Default::default()
        };

        if content.trim().is_empty() {
            outcome.valid = false;
            outcome
                .issues
                .push("Empty or whitespace-only content".to_string());
            return outcome;
        }

        // A NUL byte cannot be represented in the downstream text protocol.
        if content.contains('\0') {
            outcome.valid = false;
            outcome
                .issues
                .push("Content cannot be encoded for the text protocol".to_string());
            return outcome;
        }

        let mut text = content.to_string();
        let mut modified = false;

        let char_count = content.chars().count();
        if char_count > MAX_MESSAGE_CHARS {
            outcome.warnings.push(format!(
                "Message exceeds recommended length ({char_count} > {MAX_MESSAGE_CHARS})"
            ));
            text = content.chars().take(MAX_MESSAGE_CHARS).collect();
            text.push_str(TRUNCATION_MARKER);
            modified = true;
        }

        for (regex, name) in &self.sensitive {
            if regex.is_match(&text) {
                outcome.issues.push(format!(
                    "Potentially sensitive information detected ({name})"
                ));
                text = regex.replace_all(&text, REDACTION_TOKEN).into_owned();
                modified = true;
            }
        }

        if role == "user" && self.low_information.is_match(content.trim()) {
            outcome
                .warnings
                .push("Low-information message".to_string());
        }

        if modified {
            outcome.sanitized = Some(text);
        }
        outcome
    }

    /// Validate every entry of a history, dropping entries that are
    /// invalid with no sanitized fallback and annotating the survivors
    /// with their findings.
    pub fn clean_conversation_history(&self, messages: &[ContextMessage]) -> Vec<CleanedMessage> {
        let mut cleaned = Vec::with_capacity(messages.len());
        for msg in messages {
            let outcome = self.validate_message(&msg.content, &msg.role);
            if !outcome.valid && outcome.sanitized.is_none() {
                warn!(role = %msg.role, issues = ?outcome.issues, "dropping message from history");
                continue;
            }

            let was_cleaned = outcome.sanitized.is_some();
            let content = outcome
                .sanitized
                .unwrap_or_else(|| msg.content.clone());
            let note = if outcome.issues.is_empty() && outcome.warnings.is_empty() {
                None
            } else {
                Some(HygieneNote {
                    issues: outcome.issues,
                    warnings: outcome.warnings,
                    cleaned: was_cleaned,
                })
            };

            cleaned.push(CleanedMessage {
                message: ContextMessage::new(msg.role.clone(), content),
                note,
            });
        }
        cleaned
    }
}
