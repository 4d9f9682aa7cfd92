//! Literal rule tables for the hygiene checks.
//!
//! These are deliberately simple lexical rules, not statistical models;
//! given identical input text the checks are deterministic.

/// Sensitive-data patterns and the finding label each raises.
pub(crate) const SENSITIVE_PATTERNS: &[(&str, &str)] = &[
    // Credential-like "key: value" phrasing
    (
        r"(?i)\b(?:password|token|secret|key|api_key)\s*[:=]\s*\S+",
        "credential assignment",
    ),
    // Card-number-shaped digit runs
    (
        r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
        "card-shaped number",
    ),
    // SSN-shaped digit runs
    (r"\b\d{3}-\d{2}-\d{4}\b", "ssn-shaped number"),
];

/// Replacement for matched sensitive spans.
pub(crate) const REDACTION_TOKEN: &str = "[REDACTED]";

/// Literal phrases that announce a topic change.
pub(crate) const TOPIC_SHIFT_MARKERS: &[&str] = &[
    "now let's",
    "moving on",
    "switching to",
    "different topic",
    "by the way",
    "btw",
    "off topic",
    "unrelated",
    "new question",
    "different question",
    "change of subject",
];

/// Anchored patterns for low-information user messages.
pub(crate) const LOW_INFORMATION_PATTERNS: &[&str] = &[
    // Bare acknowledgements
    r"(?i)^(?:ok|okay|yes|no|sure|thanks|thank you)\.?$",
    // Filler interjections
    r"(?i)^(?:lol|haha|hmm|uh|um|er)\.?$",
    // Bare punctuation runs
    r"^\.{3,}$",
    r"^[!@#$%^&*()]{3,}$",
];

/// Term pairs that make two constraint statements contradictory.
pub(crate) const OPPOSING_PAIRS: &[(&str, &str)] = &[
    ("must", "must not"),
    ("should", "should not"),
    ("always", "never"),
    ("required", "forbidden"),
    ("use", "avoid"),
    ("include", "exclude"),
];

/// Value pairs that make two near-duplicate facts contradictory.
pub(crate) const VALUE_CONTRADICTIONS: &[(&str, &str)] = &[
    ("yes", "no"),
    ("true", "false"),
    ("enabled", "disabled"),
    ("on", "off"),
    ("allow", "deny"),
    ("accept", "reject"),
];

/// Maximum characters per message before truncation.
pub(crate) const MAX_MESSAGE_CHARS: usize = 10_000;

/// Marker appended to truncated content.
pub(crate) const TRUNCATION_MARKER: &str = "... [truncated]";

/// Aggregate character count above which a context payload is flagged.
pub(crate) const MAX_CONTEXT_CHARS: usize = 20_000;

/// Keyword overlap ratio below which the latest message is a topic shift.
pub(crate) const TOPIC_OVERLAP_THRESHOLD: f64 = 0.2;

/// Chunk length (characters) that scores best in the hygiene report.
pub(crate) const OPTIMAL_CHUNK_CHARS: f64 = 200.0;
