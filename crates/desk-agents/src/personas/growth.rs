//! Growth and innovation scouting capability
//!
//! Composites innovation quality, long-horizon growth potential, and
//! industry disruption susceptibility, then times the entry against the
//! technology adoption curve. High-conviction entries need both a strong
//! composite and an optimal adoption stage.

use async_trait::async_trait;
use serde_json::json;

use coordination::provider::{CapabilityResult, Recommendation, RecommendationProvider};
use coordination::state::DecisionContext;

/// Weights of the composite score
const INNOVATION_WEIGHT: f64 = 0.35;
const GROWTH_WEIGHT: f64 = 0.30;
const DISRUPTION_WEIGHT: f64 = 0.25;
const TIMING_WEIGHT: f64 = 0.10;

/// Growth-scouting capability
pub struct GrowthScout;

impl GrowthScout {
    pub fn new() -> Self {
        Self
    }

    /// Innovation composite: R&D intensity plus the standard indicator
    /// keys, each defaulting to a neutral 0.5
    fn innovation_score(&self, ctx: &DecisionContext) -> f64 {
        let rd_ratio = ctx.extra_f64("rd_spending_ratio").unwrap_or(0.0);
        let rd_score = if rd_ratio >= 0.15 {
            (rd_ratio / 0.3).min(1.0)
        } else {
            rd_ratio / 0.15
        };

        const INDICATORS: [&str; 5] = [
            "patent_portfolio_score",
            "technology_leadership_score",
            "innovation_pipeline_score",
            "platform_economics_score",
            "innovation_momentum",
        ];
        let indicator_sum: f64 = INDICATORS
            .iter()
            .map(|key| ctx.extra_f64(key).unwrap_or(0.5))
            .sum();

        (rd_score + indicator_sum) / (INDICATORS.len() + 1) as f64
    }

    /// Long-horizon growth potential from revenue, market expansion, and
    /// remaining penetration headroom
    fn growth_score(&self, ctx: &DecisionContext) -> f64 {
        let revenue_growth = ctx.extra_f64("revenue_growth_3yr").unwrap_or(0.0);
        let revenue_score = (revenue_growth / 0.5).min(1.0);

        let current_tam = ctx.extra_f64("total_addressable_market").unwrap_or(0.0);
        let projected_tam = ctx
            .extra_f64("projected_tam_5yr")
            .unwrap_or(current_tam * 2.0);
        let tam_ratio = if current_tam > 0.0 {
            projected_tam / current_tam
        } else {
            1.0
        };
        let tam_score = ((tam_ratio - 1.0) / 3.0).clamp(0.0, 1.0);

        let market_share = ctx.extra_f64("market_share").unwrap_or(0.0);
        let penetration_headroom = (1.0 - market_share) * 0.3;
        let penetration_score = (penetration_headroom / 0.2).min(1.0);

        revenue_score * 0.4 + tam_score * 0.35 + penetration_score * 0.25
    }

    /// Disruption composite over company and industry factors
    fn disruption_score(&self, ctx: &DecisionContext) -> f64 {
        const FACTORS: [&str; 6] = [
            "tech_superiority_score",
            "cost_advantage_score",
            "ux_improvement_score",
            "business_model_score",
            "network_effects_score",
            "regulatory_support_score",
        ];
        FACTORS
            .iter()
            .map(|key| ctx.extra_f64(key).unwrap_or(0.5))
            .sum::<f64>()
            / FACTORS.len() as f64
    }

    /// Adoption-curve timing: optimal entries sit in early adoption or
    /// early growth
    fn timing(&self, ctx: &DecisionContext) -> (f64, bool) {
        let stage = ctx.extra_str("adoption_stage").unwrap_or("early_growth");
        let score = match stage {
            "innovation" => 0.3,
            "early_adoption" => 0.6,
            "early_growth" => 0.9,
            "late_growth" => 0.7,
            "maturity" => 0.3,
            "decline" => 0.1,
            _ => 0.5,
        };
        let optimal = matches!(stage, "early_adoption" | "early_growth");
        (score, optimal)
    }
}

impl Default for GrowthScout {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecommendationProvider for GrowthScout {
    fn name(&self) -> &str {
        "innovation_analysis"
    }

    async fn recommend(&self, ctx: &DecisionContext) -> CapabilityResult<Recommendation> {
        let innovation = self.innovation_score(ctx);
        let growth = self.growth_score(ctx);
        let disruption = self.disruption_score(ctx);
        let (timing, optimal_entry) = self.timing(ctx);

        let composite = innovation * INNOVATION_WEIGHT
            + growth * GROWTH_WEIGHT
            + disruption * DISRUPTION_WEIGHT
            + timing * TIMING_WEIGHT;

        let (action, confidence, reasoning) = if composite >= 0.8 && optimal_entry {
            (
                "HIGH_CONVICTION_BUY",
                0.9,
                "Exceptional innovation with strong growth potential at optimal timing.",
            )
        } else if composite >= 0.7 {
            ("BUY", 0.8, "Strong innovation profile with good growth prospects.")
        } else if composite >= 0.5 {
            (
                "RESEARCH",
                0.6,
                "Interesting innovation potential, needs further development.",
            )
        } else {
            (
                "AVOID",
                0.7,
                "Insufficient innovation or growth potential for a growth entry.",
            )
        };

        Ok(Recommendation::new(action)
            .with_confidence(confidence)
            .with_reasoning(reasoning)
            .with_details(json!({
                "innovation_score": innovation,
                "growth_score": growth,
                "disruption_score": disruption,
                "timing_score": timing,
                "optimal_entry": optimal_entry,
                "composite_score": composite,
            })))
    }
}
