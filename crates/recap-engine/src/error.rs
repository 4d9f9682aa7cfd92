//! Engine error types.

use thiserror::Error;

/// Engine result type alias.
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors surfaced by the context engine.
///
/// Condensation is deliberately absent: its external-call failures degrade
/// to local fallbacks and never reach the caller.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Message failed ingestion validation; issues are itemized.
    #[error("message rejected: {}", issues.join(", "))]
    Rejected { issues: Vec<String> },

    /// Invalid budget configuration.
    #[error("configuration error: {0}")]
    Config(#[from] recap_core::error::ConfigError),
}
