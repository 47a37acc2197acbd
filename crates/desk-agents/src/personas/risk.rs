//! Risk-audit capability
//!
//! Validates the round's risk posture: a risk score under the approval
//! threshold passes the audit, anything else raises a warning. Elevated
//! volatility is called out in the reasoning for the audit trail.

use async_trait::async_trait;
use serde_json::json;

use coordination::provider::{CapabilityResult, Recommendation, RecommendationProvider};
use coordination::state::DecisionContext;

/// Audit capability for the risk-control desk
pub struct RiskAuditor {
    approval_threshold: f64,
}

impl RiskAuditor {
    pub fn new() -> Self {
        Self {
            approval_threshold: 0.3,
        }
    }

    pub fn with_threshold(approval_threshold: f64) -> Self {
        Self { approval_threshold }
    }
}

impl Default for RiskAuditor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecommendationProvider for RiskAuditor {
    fn name(&self) -> &str {
        "risk_audit"
    }

    async fn recommend(&self, ctx: &DecisionContext) -> CapabilityResult<Recommendation> {
        let risk_score = ctx
            .risk_score
            .or_else(|| ctx.extra_f64("risk_score"))
            .unwrap_or(0.5);

        let approved = risk_score < self.approval_threshold;
        let action = if approved { "RISK_APPROVED" } else { "RISK_WARNING" };

        let mut reasoning = format!(
            "Risk assessment results in {} (risk score {:.2} against threshold {:.2}).",
            action.to_lowercase(),
            risk_score,
            self.approval_threshold
        );
        if ctx.volatility > 0.5 {
            reasoning.push_str(&format!(
                " Elevated volatility {:.2} compounds the exposure.",
                ctx.volatility
            ));
        }

        // Auditors are more certain the further the score is from the line
        let confidence = (0.6 + (risk_score - self.approval_threshold).abs()).min(0.95);

        Ok(Recommendation::new(action)
            .with_confidence(confidence)
            .with_reasoning(reasoning)
            .with_details(json!({
                "risk_score": risk_score,
                "approval_threshold": self.approval_threshold,
                "volatility": ctx.volatility,
            })))
    }
}
