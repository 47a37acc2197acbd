//! Weighted voting — tally of elicited decisions
//!
//! Each decision contributes `vote_weight * confidence` to its
//! recommendation string. Distinct recommendations are tracked in
//! first-seen elicitation order, and that order is the deterministic
//! tie-break: on an exact weight tie the earliest-seen recommendation
//! wins. This is a documented contract, not an accident of map iteration.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use crate::events::{DeskEvent, SharedEventBus};
use crate::state::{
    new_id, AgentDecision, ExcludedAgent, SharedSessionLog, TallyEntry, VotingSession,
};

/// Error type for voting operations
#[derive(Debug, thiserror::Error)]
pub enum VotingError {
    #[error("no participating decisions to tally")]
    NoParticipants,
}

/// Result type for voting operations
pub type VotingResult<T> = Result<T, VotingError>;

/// Tallies decisions into voting sessions and records them
pub struct VotingCoordinator {
    log: SharedSessionLog,
    event_bus: SharedEventBus,
}

impl VotingCoordinator {
    /// Create a voting coordinator writing to the given session log
    pub fn new(log: SharedSessionLog, event_bus: SharedEventBus) -> Self {
        Self { log, event_bus }
    }

    /// Access the session log
    pub fn log(&self) -> &SharedSessionLog {
        &self.log
    }

    /// Tally a round of decisions into a recorded voting session
    ///
    /// Fails only when `decisions` is empty. A zero-weight round (every
    /// confidence at the floor driven to 0 by construction) is still a
    /// valid, low-confidence session.
    pub fn tally(
        &self,
        decision_type: &str,
        decisions: Vec<AgentDecision>,
        exclusions: Vec<ExcludedAgent>,
    ) -> VotingResult<VotingSession> {
        if decisions.is_empty() {
            return Err(VotingError::NoParticipants);
        }

        // First-seen order of distinct recommendation strings
        let mut order: Vec<String> = Vec::new();
        let mut weights: HashMap<String, f64> = HashMap::new();
        let mut total_weight = 0.0;

        for decision in &decisions {
            let weight = decision.vote_weight * decision.confidence;
            if !weights.contains_key(&decision.recommendation) {
                order.push(decision.recommendation.clone());
            }
            *weights.entry(decision.recommendation.clone()).or_insert(0.0) += weight;
            total_weight += weight;
        }

        // Strict `>` keeps the earliest-seen recommendation on exact ties
        let mut winning_recommendation = order[0].clone();
        let mut winning_weight = weights[&order[0]];
        for recommendation in order.iter().skip(1) {
            let weight = weights[recommendation];
            if weight > winning_weight {
                winning_recommendation = recommendation.clone();
                winning_weight = weight;
            }
        }

        let consensus_strength = if total_weight > 0.0 {
            winning_weight / total_weight
        } else {
            0.0
        };

        let tally: Vec<TallyEntry> = order
            .iter()
            .map(|recommendation| TallyEntry {
                recommendation: recommendation.clone(),
                weight: weights[recommendation],
                share: if total_weight > 0.0 {
                    weights[recommendation] / total_weight
                } else {
                    0.0
                },
            })
            .collect();

        let session = VotingSession {
            id: new_id(),
            timestamp: Utc::now(),
            decision_type: decision_type.to_string(),
            participants: decisions.iter().map(|d| d.agent_id.clone()).collect(),
            decisions,
            tally,
            winning_recommendation: winning_recommendation.clone(),
            consensus_strength,
            total_weight,
            exclusions,
        };

        info!(
            session_id = %session.id,
            winner = %winning_recommendation,
            consensus_strength,
            participants = session.participants.len(),
            excluded = session.exclusions.len(),
            "Voting session tallied"
        );

        self.log.append(session.clone());
        self.event_bus.publish(DeskEvent::ConsensusReached {
            session_id: session.id.clone(),
            winning_recommendation,
            consensus_strength,
            participants: session.participants.len(),
            timestamp: Utc::now(),
        });

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::state::SessionLog;

    fn decision(agent: &str, recommendation: &str, vote_weight: f64, confidence: f64) -> AgentDecision {
        AgentDecision {
            agent_id: agent.to_string(),
            timestamp: Utc::now(),
            decision_type: "trading".to_string(),
            recommendation: recommendation.to_string(),
            confidence,
            reasoning: String::new(),
            supporting_data: serde_json::Value::Null,
            vote_weight,
        }
    }

    fn coordinator() -> VotingCoordinator {
        VotingCoordinator::new(SessionLog::new().shared(), EventBus::new().shared())
    }

    #[test]
    fn test_weighted_tally_scenario() {
        let voting = coordinator();
        let session = voting
            .tally(
                "trading",
                vec![
                    decision("a", "BUY", 1.0, 0.9),
                    decision("b", "BUY", 0.8, 0.5),
                    decision("c", "SELL", 0.6, 0.5),
                ],
                vec![],
            )
            .unwrap();

        assert_eq!(session.winning_recommendation, "BUY");
        assert!((session.total_weight - 1.6).abs() < 1e-9);
        assert!((session.consensus_strength - 0.8125).abs() < 1e-9);
        assert!((session.share_of("SELL") - 0.1875).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let voting = coordinator();
        let session = voting
            .tally(
                "trading",
                vec![
                    decision("a", "BUY", 1.0, 0.37),
                    decision("b", "HOLD", 0.8, 0.61),
                    decision("c", "SELL", 0.4, 0.23),
                    decision("d", "HOLD", 0.6, 0.5),
                ],
                vec![],
            )
            .unwrap();

        let sum: f64 = session.tally.iter().map(|entry| entry.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_tie_goes_to_first_seen() {
        let voting = coordinator();
        // Identical weight and confidence, different recommendations
        let session = voting
            .tally(
                "trading",
                vec![
                    decision("a", "ALPHA", 0.8, 0.5),
                    decision("b", "BETA", 0.8, 0.5),
                ],
                vec![],
            )
            .unwrap();

        assert_eq!(session.winning_recommendation, "ALPHA");

        // Same decisions in the opposite elicitation order flip the winner
        let session = voting
            .tally(
                "trading",
                vec![
                    decision("b", "BETA", 0.8, 0.5),
                    decision("a", "ALPHA", 0.8, 0.5),
                ],
                vec![],
            )
            .unwrap();

        assert_eq!(session.winning_recommendation, "BETA");
    }

    #[test]
    fn test_empty_decisions_fail() {
        let voting = coordinator();
        let result = voting.tally("trading", vec![], vec![]);
        assert!(matches!(result, Err(VotingError::NoParticipants)));
        assert!(voting.log().is_empty());
    }

    #[test]
    fn test_zero_weight_round_is_valid() {
        let voting = coordinator();
        let session = voting
            .tally(
                "trading",
                vec![
                    decision("a", "BUY", 1.0, 0.0),
                    decision("b", "SELL", 0.8, 0.0),
                ],
                vec![],
            )
            .unwrap();

        assert_eq!(session.total_weight, 0.0);
        assert_eq!(session.consensus_strength, 0.0);
        assert_eq!(session.winning_recommendation, "BUY");
        assert_eq!(session.share_of("SELL"), 0.0);
    }

    #[test]
    fn test_sessions_are_recorded_with_exclusions() {
        let voting = coordinator();
        let session = voting
            .tally(
                "trading",
                vec![decision("a", "BUY", 1.0, 0.9)],
                vec![ExcludedAgent {
                    agent_id: "b".to_string(),
                    name: "Flaky".to_string(),
                    reason: crate::state::ExclusionReason::Timeout,
                }],
            )
            .unwrap();

        let stored = voting.log().get(&session.id).unwrap();
        assert_eq!(stored.exclusions.len(), 1);
        assert_eq!(stored.exclusions[0].name, "Flaky");
    }
}
