//! Technical-signal capability
//!
//! Pure threshold logic over the quantitative signal in the context: a
//! technical score above the buy threshold signals entry, anything else
//! signals exit. Confidence tracks the distance from the threshold.

use async_trait::async_trait;
use serde_json::json;

use coordination::provider::{CapabilityResult, Recommendation, RecommendationProvider};
use coordination::state::DecisionContext;

/// Signal-driven capability
pub struct SignalDesk {
    buy_threshold: f64,
}

impl SignalDesk {
    pub fn new() -> Self {
        Self { buy_threshold: 0.6 }
    }

    pub fn with_threshold(buy_threshold: f64) -> Self {
        Self { buy_threshold }
    }
}

impl Default for SignalDesk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecommendationProvider for SignalDesk {
    fn name(&self) -> &str {
        "signal_analysis"
    }

    async fn recommend(&self, ctx: &DecisionContext) -> CapabilityResult<Recommendation> {
        let technical_score = ctx.extra_f64("technical_score").unwrap_or(0.5);

        let (action, confidence) = if technical_score > self.buy_threshold {
            ("SIGNAL_BUY", technical_score.clamp(0.0, 1.0))
        } else {
            ("SIGNAL_SELL", (1.0 - technical_score).clamp(0.0, 1.0))
        };

        Ok(Recommendation::new(action)
            .with_confidence(confidence)
            .with_reasoning(format!(
                "Statistical models indicate {} based on technical signals (score {:.2}).",
                action.to_lowercase(),
                technical_score
            ))
            .with_details(json!({
                "technical_score": technical_score,
                "buy_threshold": self.buy_threshold,
            })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_strong_signal_buys() {
        let ctx = DecisionContext::default().with_extra("technical_score", json!(0.72));
        let rec = SignalDesk::new().recommend(&ctx).await.unwrap();
        assert_eq!(rec.recommendation, "SIGNAL_BUY");
        assert_eq!(rec.confidence, Some(0.72));
    }

    #[tokio::test]
    async fn test_threshold_is_exclusive() {
        let ctx = DecisionContext::default().with_extra("technical_score", json!(0.6));
        let rec = SignalDesk::new().recommend(&ctx).await.unwrap();
        assert_eq!(rec.recommendation, "SIGNAL_SELL");
    }

    #[tokio::test]
    async fn test_missing_signal_defaults_neutral_and_sells() {
        let rec = SignalDesk::new()
            .recommend(&DecisionContext::default())
            .await
            .unwrap();
        assert_eq!(rec.recommendation, "SIGNAL_SELL");
        assert_eq!(rec.confidence, Some(0.5));
    }
}
