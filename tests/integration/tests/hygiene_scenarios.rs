//! End-to-end hygiene scenarios.

use recap_core::types::{ContextMessage, Role, SessionMemory};
use recap_engine::ContextManager;
use recap_hygiene::ContextHygiene;

/// A credential in a user message is flagged and redacted, but the message
/// itself is still accepted.
#[test]
fn credential_is_flagged_and_redacted() {
    let hygiene = ContextHygiene::new();
    let outcome = hygiene.validate_message("password: abc123", "user");

    assert!(!outcome.issues.is_empty());
    let sanitized = outcome.sanitized.expect("sanitized output");
    assert!(sanitized.contains("[REDACTED]"));
    assert!(!sanitized.contains("abc123"));
}

/// Two opposing constraints over the same topic produce exactly one
/// conflict entry.
#[test]
fn opposing_constraints_produce_one_conflict() {
    let hygiene = ContextHygiene::new();
    let mut memory = SessionMemory::new();
    memory.record_constraint("must use JSON");
    memory.record_constraint("must not use JSON");

    let conflicts = hygiene.detect_context_conflicts(&memory);
    assert_eq!(conflicts.len(), 1);
}

/// With a summary and no constraints, exactly one system message precedes
/// the conversation turns.
#[test]
fn summary_only_context_has_single_system_message() {
    let mut mgr = ContextManager::new(Default::default());
    mgr.memory_mut().rolling_summary = "the user is renaming the project".to_string();
    mgr.add_message(Role::User, "so what should we call it?", 1.0)
        .unwrap();

    let context = mgr.build_context_for_llm("");
    let system_count = context.iter().filter(|m| m.role == "system").count();
    assert_eq!(system_count, 1);
    assert_eq!(context[0].role, "system");
    assert!(context[0].content.contains("summary"));
    assert_eq!(context[1].role, "user");
}

/// The assembly pass re-validates, reorders, and cleans the payload the
/// manager built.
#[test]
fn assembled_context_is_ordered_and_cleaned() {
    let mut mgr = ContextManager::new(Default::default());
    mgr.memory_mut().record_constraint("Constraint: answer briefly");
    mgr.memory_mut().rolling_summary = "we are debugging the importer".to_string();
    mgr.add_message(Role::User, "the importer hit api_key: zz-9 again", 1.0)
        .unwrap();
    mgr.add_message(Role::Assistant, "rotating it now", 1.0)
        .unwrap();

    let assembled = mgr.assemble_context("");
    assert!(assembled.messages[0]
        .message
        .content
        .contains("Constraints & Decisions"));
    assert!(assembled.messages[1].message.content.contains("summary"));
    // Credential was redacted at ingestion
    assert!(assembled.messages[2].message.content.contains("[REDACTED]"));
    assert_eq!(assembled.messages[3].message.content, "rotating it now");
    assert!(assembled.token_count > 0);
}

/// Re-validating an already-sanitized payload raises no further
/// sensitive-pattern issues.
#[test]
fn redaction_is_idempotent_across_passes() {
    let hygiene = ContextHygiene::new();
    let first = hygiene.validate_message("my token: tk-42 and ssn 123-45-6789", "user");
    let sanitized = first.sanitized.expect("sanitized output");
    assert_eq!(first.issues.len(), 2);

    let second = hygiene.validate_message(&sanitized, "user");
    assert!(second.issues.is_empty());
    assert!(second.sanitized.is_none());
}

/// Cleaning a mixed history drops unusable entries and annotates the rest.
#[test]
fn cleaning_drops_and_annotates() {
    let hygiene = ContextHygiene::new();
    let history = vec![
        ContextMessage::new("user", "a normal question"),
        ContextMessage::new("assistant", "   "),
        ContextMessage::new("user", "secret: s3cr3t value"),
    ];

    let cleaned = hygiene.clean_conversation_history(&history);
    assert_eq!(cleaned.len(), 2);
    assert!(cleaned[0].note.is_none());
    assert!(cleaned[1].message.content.contains("[REDACTED]"));
    assert!(cleaned[1].note.as_ref().unwrap().cleaned);
}

/// The hygiene report over a manager rolls message findings, chunk shape,
/// and memory conflicts into one surface.
#[test]
fn hygiene_report_aggregates_all_layers() {
    let mut mgr = ContextManager::new(Default::default());
    mgr.add_message(Role::User, "password: hunter2", 1.0).unwrap();
    mgr.memory_mut().record_constraint("must cache results");
    mgr.memory_mut().record_constraint("must not cache results");

    let report = mgr.hygiene_report();
    // The stored message was already redacted, so no live issues remain
    assert_eq!(report.messages.total_messages, 1);
    assert_eq!(report.memory.conflicts.len(), 1);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("Resolve memory conflicts")));
}
