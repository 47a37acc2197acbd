//! Decision elicitation — per-agent recommendation fan-out
//!
//! Queries each active agent's capability concurrently, bounded by the
//! configured parallelism, computes the context-adjusted confidence, and
//! packages standard decisions. Completion order is irrelevant: results
//! are re-sorted into registry order before they reach the tally, which
//! the tie-break contract depends on. Agent state is never mutated here —
//! mutation is reserved for outcome feedback.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::provider::RecommendationProvider;
use crate::state::types::{
    clamp_state, Agent, AgentDecision, DecisionContext, ExcludedAgent, ExclusionReason,
};

/// Confidence multiplier when the context matches an expertise tag
const EXPERTISE_BOOST: f64 = 1.2;

/// Volatility level above which risk-averse agents lose confidence
const VOLATILITY_THRESHOLD: f64 = 0.3;

/// Generic recommendation rule thresholds for agents without a capability
const GENERIC_BUY_FLOOR: f64 = 0.7;
const GENERIC_HOLD_FLOOR: f64 = 0.4;

/// One agent's elicitation outcome: a decision or a recorded exclusion
enum ElicitOutcome {
    Decision(AgentDecision),
    Excluded(ExcludedAgent),
}

/// Bounded-parallel decision elicitor
pub struct Elicitor {
    parallelism: usize,
    capability_timeout: Duration,
}

impl Elicitor {
    /// Create an elicitor with the given fan-out bound and per-capability
    /// deadline
    pub fn new(parallelism: usize, capability_timeout: Duration) -> Self {
        Self {
            parallelism: parallelism.max(1),
            capability_timeout,
        }
    }

    /// Elicit one decision per roster agent, preserving roster order
    ///
    /// Capabilities that fail or exceed the deadline exclude their agent
    /// from the round; the exclusion is logged and returned for session
    /// metadata. Never fails the round itself.
    pub async fn elicit(
        &self,
        ctx: &DecisionContext,
        roster: Vec<(Agent, Option<Arc<dyn RecommendationProvider>>)>,
    ) -> (Vec<AgentDecision>, Vec<ExcludedAgent>) {
        let timeout = self.capability_timeout;

        let mut futures = Vec::with_capacity(roster.len());
        for (index, (agent, provider)) in roster.into_iter().enumerate() {
            futures.push(elicit_indexed(index, agent, provider, ctx, timeout));
        }

        let mut outcomes: Vec<(usize, ElicitOutcome)> = stream::iter(futures)
            .buffer_unordered(self.parallelism)
            .collect()
            .await;

        // Registry order, not completion order: the voting tie-break
        // depends on it.
        outcomes.sort_by_key(|(index, _)| *index);

        let mut decisions = Vec::new();
        let mut exclusions = Vec::new();
        for (_, outcome) in outcomes {
            match outcome {
                ElicitOutcome::Decision(decision) => decisions.push(decision),
                ElicitOutcome::Excluded(excluded) => exclusions.push(excluded),
            }
        }
        (decisions, exclusions)
    }
}

async fn elicit_indexed(
    index: usize,
    agent: Agent,
    provider: Option<Arc<dyn RecommendationProvider>>,
    ctx: &DecisionContext,
    timeout: Duration,
) -> (usize, ElicitOutcome) {
    (index, elicit_one(agent, provider, ctx, timeout).await)
}

async fn elicit_one(
    agent: Agent,
    provider: Option<Arc<dyn RecommendationProvider>>,
    ctx: &DecisionContext,
    timeout: Duration,
) -> ElicitOutcome {
    let confidence = adjusted_confidence(&agent, ctx);

    let mut provider_name = None;
    let mut provider_confidence = None;
    let mut details = None;

    let (recommendation, reasoning) = match provider {
        Some(provider) => {
            provider_name = Some(provider.name().to_string());
            match tokio::time::timeout(timeout, provider.recommend(ctx)).await {
                Ok(Ok(rec)) => {
                    provider_confidence = rec.confidence;
                    details = rec.details;
                    let reasoning = rec
                        .reasoning
                        .unwrap_or_else(|| generic_reasoning(&agent, &rec.recommendation));
                    (rec.recommendation, reasoning)
                }
                Ok(Err(err)) => {
                    warn!(agent = %agent.name, error = %err, "Capability failed, excluding agent");
                    return ElicitOutcome::Excluded(ExcludedAgent {
                        agent_id: agent.id,
                        name: agent.name,
                        reason: ExclusionReason::Failure(err.to_string()),
                    });
                }
                Err(_) => {
                    warn!(
                        agent = %agent.name,
                        timeout_ms = timeout.as_millis() as u64,
                        "Capability timed out, excluding agent"
                    );
                    return ElicitOutcome::Excluded(ExcludedAgent {
                        agent_id: agent.id,
                        name: agent.name,
                        reason: ExclusionReason::Timeout,
                    });
                }
            }
        }
        None => {
            let recommendation = generic_recommendation(confidence).to_string();
            let reasoning = generic_reasoning(&agent, &recommendation);
            (recommendation, reasoning)
        }
    };

    debug!(
        agent = %agent.name,
        recommendation = %recommendation,
        confidence,
        "Decision elicited"
    );

    let supporting_data = serde_json::json!({
        "expertise": &agent.expertise,
        "market_type": &ctx.market_type,
        "volatility": ctx.volatility,
        "capability": provider_name,
        "capability_confidence": provider_confidence,
        "details": details,
    });

    ElicitOutcome::Decision(AgentDecision {
        agent_id: agent.id,
        timestamp: Utc::now(),
        decision_type: ctx.decision_type.clone(),
        recommendation,
        confidence,
        reasoning,
        supporting_data,
        vote_weight: agent.vote_weight,
    })
}

/// Context-adjusted confidence for one agent
///
/// Base confidence is boosted when the market type intersects the agent's
/// expertise tags and damped for risk-averse agents in volatile markets,
/// then clamped into [0.1, 1.0].
pub fn adjusted_confidence(agent: &Agent, ctx: &DecisionContext) -> f64 {
    let mut confidence = agent.confidence_level;

    if agent
        .expertise
        .iter()
        .any(|tag| ctx.market_type.contains(tag.as_str()))
    {
        confidence *= EXPERTISE_BOOST;
    }

    if let Some(&risk_aversion) = agent.personality_traits.get("risk_aversion") {
        if ctx.volatility > VOLATILITY_THRESHOLD {
            confidence *= 1.0 - risk_aversion * 0.2;
        }
    }

    clamp_state(confidence)
}

/// Fallback rule for agents without a specialized capability
fn generic_recommendation(confidence: f64) -> &'static str {
    if confidence > GENERIC_BUY_FLOOR {
        "BUY"
    } else if confidence > GENERIC_HOLD_FLOOR {
        "HOLD"
    } else {
        "SELL"
    }
}

fn generic_reasoning(agent: &Agent, recommendation: &str) -> String {
    format!(
        "Based on {} analysis, recommending {}.",
        agent.department,
        recommendation.to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CapabilityError, MockRecommendationProvider, Recommendation};
    use crate::state::types::{AgentRole, Department};
    use std::collections::HashMap;

    fn agent(name: &str, confidence: f64) -> Agent {
        Agent {
            id: format!("id-{name}"),
            name: name.to_string(),
            role: AgentRole::Senior,
            department: Department::MarketIntelligence,
            personality_traits: HashMap::new(),
            expertise: Vec::new(),
            confidence_level: confidence,
            performance_score: 0.75,
            learning_rate: 0.1,
            vote_weight: AgentRole::Senior.vote_weight(),
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expertise_match_boosts_confidence() {
        let mut a = agent("Warren", 0.5);
        a.expertise = vec!["value_investing".to_string()];
        let ctx = DecisionContext::default().with_market_type("value_investing_screen");

        let adjusted = adjusted_confidence(&a, &ctx);
        assert!((adjusted - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_risk_aversion_damps_in_volatile_markets() {
        let mut a = agent("Warren", 0.5);
        a.personality_traits.insert("risk_aversion".to_string(), 0.8);

        let calm = DecisionContext::default().with_volatility(0.2);
        assert!((adjusted_confidence(&a, &calm) - 0.5).abs() < 1e-9);

        let volatile = DecisionContext::default().with_volatility(0.5);
        // 0.5 * (1 - 0.8 * 0.2) = 0.42
        assert!((adjusted_confidence(&a, &volatile) - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_clamped_to_band() {
        let mut high = agent("High", 0.95);
        high.expertise = vec!["general".to_string()];
        let ctx = DecisionContext::default();
        assert_eq!(adjusted_confidence(&high, &ctx), 1.0);

        let low = agent("Low", 0.01);
        assert_eq!(adjusted_confidence(&low, &ctx), 0.1);
    }

    #[test]
    fn test_generic_rule_thresholds() {
        assert_eq!(generic_recommendation(0.71), "BUY");
        assert_eq!(generic_recommendation(0.7), "HOLD");
        assert_eq!(generic_recommendation(0.41), "HOLD");
        assert_eq!(generic_recommendation(0.4), "SELL");
        assert_eq!(generic_recommendation(0.1), "SELL");
    }

    #[tokio::test]
    async fn test_elicit_uses_capability_and_captures_weight() {
        let mut provider = MockRecommendationProvider::new();
        provider.expect_name().return_const("signal_desk".to_string());
        provider.expect_recommend().returning(|_| {
            Ok(Recommendation::new("SIGNAL_BUY")
                .with_confidence(0.9)
                .with_reasoning("Signals aligned."))
        });

        let elicitor = Elicitor::new(4, Duration::from_secs(1));
        let roster = vec![(
            agent("Quant", 0.6),
            Some(Arc::new(provider) as Arc<dyn RecommendationProvider>),
        )];

        let (decisions, exclusions) = elicitor.elicit(&DecisionContext::default(), roster).await;
        assert!(exclusions.is_empty());
        assert_eq!(decisions.len(), 1);

        let decision = &decisions[0];
        assert_eq!(decision.recommendation, "SIGNAL_BUY");
        assert_eq!(decision.vote_weight, AgentRole::Senior.vote_weight());
        // Decision confidence comes from agent state, not the capability
        assert!((decision.confidence - 0.6).abs() < 1e-9);
        assert_eq!(decision.reasoning, "Signals aligned.");
        assert_eq!(
            decision.supporting_data["capability_confidence"],
            serde_json::json!(0.9)
        );
    }

    #[tokio::test]
    async fn test_failing_capability_excludes_agent() {
        let mut provider = MockRecommendationProvider::new();
        provider.expect_name().return_const("flaky".to_string());
        provider
            .expect_recommend()
            .returning(|_| Err(CapabilityError::Failed("feed offline".to_string())));

        let elicitor = Elicitor::new(4, Duration::from_secs(1));
        let roster = vec![
            (agent("Steady", 0.8), None),
            (
                agent("Flaky", 0.8),
                Some(Arc::new(provider) as Arc<dyn RecommendationProvider>),
            ),
        ];

        let (decisions, exclusions) = elicitor.elicit(&DecisionContext::default(), roster).await;
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].recommendation, "BUY");
        assert_eq!(exclusions.len(), 1);
        assert_eq!(exclusions[0].name, "Flaky");
        assert!(matches!(
            exclusions[0].reason,
            ExclusionReason::Failure(_)
        ));
    }

    /// Capability that answers after a fixed delay
    struct DelayedProvider {
        recommendation: &'static str,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl RecommendationProvider for DelayedProvider {
        fn name(&self) -> &str {
            "delayed"
        }

        async fn recommend(
            &self,
            _ctx: &DecisionContext,
        ) -> Result<Recommendation, CapabilityError> {
            tokio::time::sleep(self.delay).await;
            Ok(Recommendation::new(self.recommendation))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_capability_times_out() {
        let provider = DelayedProvider {
            recommendation: "BUY",
            delay: Duration::from_secs(60),
        };

        let elicitor = Elicitor::new(4, Duration::from_millis(50));
        let roster = vec![(
            agent("Slow", 0.8),
            Some(Arc::new(provider) as Arc<dyn RecommendationProvider>),
        )];

        let (decisions, exclusions) = elicitor.elicit(&DecisionContext::default(), roster).await;
        assert!(decisions.is_empty());
        assert_eq!(exclusions.len(), 1);
        assert_eq!(exclusions[0].reason, ExclusionReason::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_return_in_roster_order() {
        // Slowest agent first: completion order is reversed, output order
        // must not be.
        fn delayed(recommendation: &'static str, delay_ms: u64) -> Arc<dyn RecommendationProvider> {
            Arc::new(DelayedProvider {
                recommendation,
                delay: Duration::from_millis(delay_ms),
            })
        }

        let elicitor = Elicitor::new(4, Duration::from_secs(1));
        let roster = vec![
            (agent("A", 0.8), Some(delayed("ALPHA", 30))),
            (agent("B", 0.8), Some(delayed("BETA", 20))),
            (agent("C", 0.8), Some(delayed("GAMMA", 10))),
        ];

        let (decisions, _) = elicitor.elicit(&DecisionContext::default(), roster).await;
        let order: Vec<&str> = decisions
            .iter()
            .map(|d| d.recommendation.as_str())
            .collect();
        assert_eq!(order, vec!["ALPHA", "BETA", "GAMMA"]);
    }
}
