//! Session registry contract: get-or-create, clear, list, and the stats
//! surface.

use recap_core::config::ContextConfig;
use recap_core::types::Role;
use recap_engine::SessionRegistry;
use recap_integration_tests::FailingClient;
use std::sync::Arc;

#[tokio::test]
async fn one_manager_per_session_for_its_lifetime() {
    let registry = Arc::new(SessionRegistry::default());

    let mut join_set = Vec::new();
    for _ in 0..16 {
        let registry = registry.clone();
        join_set.push(tokio::spawn(async move {
            let handle = registry.get_or_create("session-1");
            handle
                .lock()
                .await
                .add_message(Role::User, "hello", 1.0)
                .unwrap();
        }));
    }
    for task in join_set {
        task.await.unwrap();
    }

    assert_eq!(registry.count(), 1);
    let handle = registry.get_or_create("session-1");
    assert_eq!(handle.lock().await.messages().len(), 16);
}

#[tokio::test]
async fn clear_forgets_all_session_state() {
    let registry = SessionRegistry::default();
    {
        let handle = registry.get_or_create("short-lived");
        let mut mgr = handle.lock().await;
        mgr.add_message(Role::User, "remember me", 1.0).unwrap();
        mgr.memory_mut().record_constraint("Constraint: nothing survives clear");
    }

    assert!(registry.clear("short-lived"));
    let handle = registry.get_or_create("short-lived");
    let mgr = handle.lock().await;
    assert!(mgr.messages().is_empty());
    assert!(mgr.memory().constraints_decisions.is_empty());
}

#[tokio::test]
async fn stats_surface_exposes_the_full_snapshot() {
    let registry = SessionRegistry::new(ContextConfig {
        max_tokens: 2000,
        reply_reserve_ratio: 0.25,
        recent_window_size: 4,
    });

    {
        let handle = registry.get_or_create("observed");
        let mut mgr = handle.lock().await;
        for i in 0..51 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            mgr.add_message(role, &format!("note {i}"), 1.0).unwrap();
        }
        mgr.ingest(Role::User, "one more note", 1.0, &FailingClient)
            .await
            .unwrap();
    }

    let stats = registry.list_sessions().await;
    let observed = &stats["observed"];

    assert_eq!(observed.total_messages, 4);
    assert!(observed.chunk_count > 0);
    assert_eq!(observed.condensation_count, 1);
    assert!(observed.last_condensation_time.is_some());
    assert!(observed.has_summary);
    assert_eq!(observed.summary_version, 1);
    assert_eq!(observed.max_tokens, 2000);
    assert_eq!(observed.available_tokens, 1500);
    assert_eq!(
        observed.token_breakdown.total,
        observed.token_breakdown.constraints_decisions
            + observed.token_breakdown.rolling_summary
            + observed.token_breakdown.scratchpad
            + observed.token_breakdown.recent_messages
    );
}
