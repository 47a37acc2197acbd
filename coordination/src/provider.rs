//! Recommendation capability interface
//!
//! Each agent may carry an external recommendation capability — the
//! persona logic that turns a decision context into a recommendation
//! string. The engine depends only on this trait, never on a concrete
//! persona, and tolerates capabilities that fail or hang by excluding the
//! agent from the session instead of failing the coordination call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::state::DecisionContext;

/// Error type for capability invocations
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("capability timed out")]
    Timeout,

    #[error("capability failed: {0}")]
    Failed(String),
}

/// Result type for capability invocations
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// A capability's answer for one decision context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommendation string, e.g. "BUY" or "RISK_WARNING"
    pub recommendation: String,

    /// Capability's own confidence, recorded for audit; the decision
    /// confidence is always computed by the elicitor from agent state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Capability-supplied reasoning text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Capability-specific analysis snapshot carried into the decision's
    /// supporting data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Recommendation {
    /// Create a bare recommendation
    pub fn new(recommendation: impl Into<String>) -> Self {
        Self {
            recommendation: recommendation.into(),
            confidence: None,
            reasoning: None,
            details: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Pluggable recommendation capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Short label used in logs and supporting data
    fn name(&self) -> &str;

    /// Produce a recommendation for the given decision context
    async fn recommend(&self, ctx: &DecisionContext) -> CapabilityResult<Recommendation>;
}
