//! End-to-end condensation scenarios.

use recap_core::config::ContextConfig;
use recap_core::types::Role;
use recap_engine::ContextManager;
use recap_integration_tests::{FailingClient, ScriptedClient};

fn manager() -> ContextManager {
    ContextManager::new(ContextConfig::default())
}

/// Sixty short messages trigger condensation purely from the count rule,
/// even though token usage is far below budget.
#[tokio::test]
async fn message_count_alone_triggers_condensation() {
    let mut mgr = manager();
    for i in 0..60 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        let msg = mgr
            .add_message(role, &format!("short line {i}"), 1.0)
            .unwrap();
        assert!(msg.token_estimate < 40);
    }

    let usage = mgr.estimate_context_tokens(true);
    assert!((usage.total as f64) < mgr.config().available_tokens() as f64 * 0.9);
    assert!(mgr.needs_condensation());

    let report = mgr.condense_context(&FailingClient).await;
    assert!(report.condensed);
    assert_eq!(report.messages_summarized, 60 - mgr.config().recent_window_size);
    assert!(mgr.messages().len() <= mgr.config().recent_window_size);
    assert!(mgr.chunks().len() <= 20);
    assert!(!mgr.needs_condensation());
}

/// A stalled or erroring backend degrades each step but never aborts the
/// pipeline or leaves the manager partially trimmed.
#[tokio::test]
async fn failing_backend_still_completes_pipeline() {
    let mut mgr = manager();
    for i in 0..55 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        mgr.add_message(role, &format!("deploy step {i} for the payments service"), 1.0)
            .unwrap();
    }

    let report = mgr.condense_context(&FailingClient).await;

    assert!(report.condensed);
    assert_eq!(report.summary_version, 1);
    assert!(mgr
        .memory()
        .rolling_summary
        .starts_with("Recent conversation about"));
    assert!(mgr.memory().constraints_decisions.is_empty());
    assert_eq!(mgr.messages().len(), mgr.config().recent_window_size);
    assert!(report.chunks_created > 0);
}

/// A healthy backend supplies the rolling summary and the structured
/// constraint extraction, which lands deduplicated and capped in memory.
#[tokio::test]
async fn scripted_backend_feeds_summary_and_constraints() {
    let mut mgr = manager();
    for i in 0..55 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        mgr.add_message(role, &format!("api migration item {i}"), 1.0)
            .unwrap();
    }

    let report = mgr.condense_context(&ScriptedClient).await;
    assert!(report.condensed);
    assert_eq!(report.summary_version, 1);
    assert_eq!(
        mgr.memory().rolling_summary,
        "[Decision]: keep the v2 API. [Fact]: rollout is at 50%."
    );
    assert_eq!(mgr.memory().constraints_decisions.len(), 2);
    assert!(mgr.memory().constraints_decisions.len() <= 10);
}

/// The evicted turns remain reachable through retrieval after the trim.
#[tokio::test]
async fn evicted_turns_survive_as_retrievable_chunks() {
    let mut mgr = manager();
    for i in 0..55 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        mgr.add_message(
            role,
            &format!("database migration checkpoint {i} looks healthy"),
            1.0,
        )
        .unwrap();
    }
    mgr.condense_context(&FailingClient).await;

    let results = mgr.semantic_retrieval("database migration checkpoint", 3);
    assert!(!results.is_empty());
    assert!(results[0].content.contains("database migration"));
}

/// Ingesting through the append path condenses automatically and reports
/// the run.
#[tokio::test]
async fn ingest_condenses_and_reports() {
    let mut mgr = manager();
    for i in 0..51 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        mgr.add_message(role, &format!("support ticket triage note {i}"), 1.0)
            .unwrap();
    }

    let report = mgr
        .ingest(Role::User, "and one more note", 1.0, &FailingClient)
        .await
        .unwrap();

    let condensation = report.condensation.expect("condensation ran");
    assert!(condensation.condensed);
    assert_eq!(report.stats.total_messages, mgr.config().recent_window_size);
    assert_eq!(report.stats.condensation_count, 1);
    assert!(report.stats.has_summary);
}
