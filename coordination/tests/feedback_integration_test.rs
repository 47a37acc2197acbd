//! Feedback loop integration tests — outcome recording through the
//! coordinator, adaptive state movement, and rolling summaries.

use coordination::council::{CouncilCoordinator, CouncilError};
use coordination::registry::{AgentRegistry, AgentSpec, SharedAgentRegistry};
use coordination::state::{AgentRole, DecisionContext, Department, Outcome, Trend};

fn single_agent_firm() -> (SharedAgentRegistry, String) {
    let registry = AgentRegistry::new().shared();
    let id = registry
        .register(
            AgentSpec::new("Warren", AgentRole::Director, Department::MarketIntelligence)
                .with_confidence(0.85)
                .with_learning_rate(0.1),
        )
        .unwrap();
    (registry, id)
}

#[tokio::test]
async fn outcome_moves_performance_by_ema() {
    let (registry, id) = single_agent_firm();
    let coordinator = CouncilCoordinator::new(registry.clone());

    coordinator
        .record_outcome(&id, Outcome { score: 1.0, accuracy: 0.5 })
        .await
        .unwrap();

    // 0.75 * 0.9 + 1.0 * 0.1
    let agent = registry.get(&id).await.unwrap();
    assert!((agent.performance_score - 0.775).abs() < 1e-9);
}

#[tokio::test]
async fn outcome_equal_to_score_is_a_fixpoint() {
    let (registry, id) = single_agent_firm();
    let coordinator = CouncilCoordinator::new(registry.clone());

    let before = registry.get(&id).await.unwrap().performance_score;
    coordinator
        .record_outcome(&id, Outcome { score: before, accuracy: 0.5 })
        .await
        .unwrap();

    let after = registry.get(&id).await.unwrap().performance_score;
    assert!((after - before).abs() < 1e-12);
}

#[tokio::test]
async fn confidence_clamps_hold_under_repeated_feedback() {
    let (registry, id) = single_agent_firm();
    let coordinator = CouncilCoordinator::new(registry.clone());

    for _ in 0..60 {
        coordinator
            .record_outcome(&id, Outcome { score: 0.95, accuracy: 0.9 })
            .await
            .unwrap();
    }
    assert_eq!(registry.get(&id).await.unwrap().confidence_level, 1.0);

    for _ in 0..300 {
        coordinator
            .record_outcome(&id, Outcome { score: 0.1, accuracy: 0.05 })
            .await
            .unwrap();
    }
    assert_eq!(registry.get(&id).await.unwrap().confidence_level, 0.1);
}

#[tokio::test]
async fn summary_reflects_recent_records() {
    let (registry, id) = single_agent_firm();
    let coordinator = CouncilCoordinator::new(registry);

    coordinator
        .record_outcome(&id, Outcome { score: 0.3, accuracy: 0.5 })
        .await
        .unwrap();
    coordinator
        .record_outcome(&id, Outcome { score: 0.7, accuracy: 0.5 })
        .await
        .unwrap();

    let summary = coordinator.tracker().summary(&id, 7).unwrap();
    assert_eq!(summary.records, 2);
    assert!((summary.mean_score - 0.5).abs() < 1e-9);
    assert!((summary.latest_score - 0.7).abs() < 1e-9);
    assert_eq!(summary.trend, Trend::Improving);
}

#[tokio::test]
async fn unknown_agent_feedback_is_rejected() {
    let (registry, _) = single_agent_firm();
    let coordinator = CouncilCoordinator::new(registry);

    let result = coordinator
        .record_outcome("no-such-agent", Outcome { score: 0.5, accuracy: 0.5 })
        .await;
    assert!(matches!(result, Err(CouncilError::AgentNotFound(_))));
}

#[tokio::test]
async fn feedback_shifts_future_coordination() {
    // An agent starting above the generic BUY floor drops below it after
    // sustained poor accuracy, flipping its fallback recommendation.
    let registry = AgentRegistry::new().shared();
    let id = registry
        .register(
            AgentSpec::new("Fickle", AgentRole::Senior, Department::PerformanceLab)
                .with_confidence(0.72),
        )
        .unwrap();
    let coordinator = CouncilCoordinator::new(registry.clone());

    let before = coordinator
        .coordinate(&DecisionContext::default())
        .await
        .unwrap();
    assert_eq!(before.winning_recommendation, "BUY");

    for _ in 0..10 {
        coordinator
            .record_outcome(&id, Outcome { score: 0.2, accuracy: 0.1 })
            .await
            .unwrap();
    }

    let after = coordinator
        .coordinate(&DecisionContext::default())
        .await
        .unwrap();
    assert_eq!(after.winning_recommendation, "HOLD");
    assert_eq!(coordinator.sessions().len(), 2);
}
