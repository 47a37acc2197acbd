//! Override authority — policy review of council verdicts
//!
//! Reviews a tallied voting session against the desk's strategic policy.
//! The review is deterministic: given the same session and policy context
//! it always produces the same decision, and the reasoning text cites the
//! consensus strength and the policy basis so the call is auditable after
//! the fact.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::events::{DeskEvent, SharedEventBus};
use crate::state::{OverrideDecision, VotingSession};

/// Market trend direction feeding the strategic review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Sideways,
    Bearish,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Bullish => write!(f, "bullish"),
            TrendDirection::Sideways => write!(f, "sideways"),
            TrendDirection::Bearish => write!(f, "bearish"),
        }
    }
}

/// Strategic inputs to a review, independent of the session itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyContext {
    pub trend: TrendDirection,
    pub volatility: f64,
}

impl Default for PolicyContext {
    fn default() -> Self {
        Self {
            trend: TrendDirection::Sideways,
            volatility: 0.1,
        }
    }
}

impl PolicyContext {
    pub fn new(trend: TrendDirection, volatility: f64) -> Self {
        Self { trend, volatility }
    }
}

/// Thresholds governing ratification vs override
#[derive(Debug, Clone)]
pub struct ReviewPolicy {
    /// Both consensus strength and strategic confidence must exceed this
    pub approval_threshold: f64,
    /// Final recommendation when the session is overridden
    pub fallback_recommendation: String,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            approval_threshold: 0.6,
            fallback_recommendation: "HOLD".to_string(),
        }
    }
}

/// Strategic confidence derived from the policy context
///
/// A pure function: trend direction sets the base, volatility erodes it.
pub fn strategic_confidence(ctx: &PolicyContext) -> f64 {
    let base = match ctx.trend {
        TrendDirection::Bullish => 0.75,
        TrendDirection::Sideways => 0.55,
        TrendDirection::Bearish => 0.35,
    };
    (base - ctx.volatility * 0.25).clamp(0.0, 1.0)
}

/// Reviews voting sessions and ratifies or overrides them
pub struct OverrideAuthority {
    policy: ReviewPolicy,
    event_bus: SharedEventBus,
}

impl OverrideAuthority {
    /// Create an authority enforcing the given policy
    pub fn new(policy: ReviewPolicy, event_bus: SharedEventBus) -> Self {
        Self { policy, event_bus }
    }

    /// The active policy
    pub fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    /// Review a session and produce the final, reasoned decision
    pub fn review(&self, session: &VotingSession, ctx: &PolicyContext) -> OverrideDecision {
        let strategic = strategic_confidence(ctx);
        let consensus = session.consensus_strength;
        let threshold = self.policy.approval_threshold;

        let approved = consensus > threshold && strategic > threshold;

        let decision = if approved {
            OverrideDecision {
                session_id: session.id.clone(),
                final_recommendation: session.winning_recommendation.clone(),
                approved: true,
                confidence: (consensus + strategic) / 2.0,
                reasoning: format!(
                    "Ratified council verdict '{}': consensus strength {:.3} and strategic \
                     confidence {:.3} both clear the {:.2} approval threshold ({} trend, \
                     volatility {:.2}).",
                    session.winning_recommendation,
                    consensus,
                    strategic,
                    threshold,
                    ctx.trend,
                    ctx.volatility
                ),
                overridden_recommendation: None,
                timestamp: Utc::now(),
            }
        } else {
            OverrideDecision {
                session_id: session.id.clone(),
                final_recommendation: self.policy.fallback_recommendation.clone(),
                approved: false,
                confidence: (consensus + strategic) / 2.0,
                reasoning: format!(
                    "Overrode council verdict '{}' in favor of '{}': consensus strength {:.3} \
                     / strategic confidence {:.3} do not both clear the {:.2} approval \
                     threshold ({} trend, volatility {:.2}).",
                    session.winning_recommendation,
                    self.policy.fallback_recommendation,
                    consensus,
                    strategic,
                    threshold,
                    ctx.trend,
                    ctx.volatility
                ),
                overridden_recommendation: Some(session.winning_recommendation.clone()),
                timestamp: Utc::now(),
            }
        };

        info!(
            session_id = %session.id,
            approved,
            final_recommendation = %decision.final_recommendation,
            consensus,
            strategic,
            "Session reviewed"
        );

        self.event_bus.publish(DeskEvent::OverrideIssued {
            session_id: session.id.clone(),
            approved,
            final_recommendation: decision.final_recommendation.clone(),
            timestamp: Utc::now(),
        });

        decision
    }
}
