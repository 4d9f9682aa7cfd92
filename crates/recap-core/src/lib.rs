//! # recap-core
//!
//! Shared data model, configuration, and utilities for Recap.
//!
//! This crate provides the vocabulary used across the Recap crates:
//!
//! - **Types**: messages, context chunks, session memory, and the wire-form
//!   context payload handed to a completion backend
//! - **Configuration**: the token-budget configuration with env overrides
//! - **Utilities**: token estimation, word extraction, content fingerprints

pub mod config;
pub mod error;
pub mod id;
pub mod text;
pub mod token;
pub mod types;

// Re-exports for convenience
pub use config::ContextConfig;
pub use error::{Error, Result};
pub use types::*;
