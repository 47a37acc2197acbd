//! Conservative fundamental-analysis capability
//!
//! Scores profitability, leverage, growth, and dividend fundamentals,
//! estimates intrinsic value with a simplified ten-year discounted-cash-flow
//! model, and requires a margin of safety plus a durable moat before
//! recommending entry.

use async_trait::async_trait;
use serde_json::json;

use coordination::provider::{CapabilityResult, Recommendation, RecommendationProvider};
use coordination::state::DecisionContext;

const DISCOUNT_RATE: f64 = 0.10;
const TERMINAL_GROWTH: f64 = 0.03;
const GROWTH_CAP: f64 = 0.15;

/// Entry criteria for the value desk
#[derive(Debug, Clone)]
pub struct ValueCriteria {
    pub min_roe: f64,
    pub max_pe_ratio: f64,
    pub min_profit_margin: f64,
    pub max_debt_to_equity: f64,
    pub min_dividend_yield: f64,
    pub min_revenue_growth: f64,
    /// Required discount to intrinsic value before entering
    pub min_margin_of_safety: f64,
    pub min_moat_strength: f64,
}

impl Default for ValueCriteria {
    fn default() -> Self {
        Self {
            min_roe: 0.15,
            max_pe_ratio: 25.0,
            min_profit_margin: 0.10,
            max_debt_to_equity: 0.5,
            min_dividend_yield: 0.02,
            min_revenue_growth: 0.05,
            min_margin_of_safety: 0.25,
            min_moat_strength: 0.6,
        }
    }
}

struct Valuation {
    score: f64,
    intrinsic_value: f64,
    margin_of_safety: f64,
    undervalued: bool,
}

/// Value-investing capability
pub struct ValueAnalyst {
    criteria: ValueCriteria,
}

impl ValueAnalyst {
    pub fn new() -> Self {
        Self {
            criteria: ValueCriteria::default(),
        }
    }

    pub fn with_criteria(criteria: ValueCriteria) -> Self {
        Self { criteria }
    }

    /// Composite fundamental quality score in [0, 1]
    fn fundamental_score(&self, ctx: &DecisionContext) -> f64 {
        let mut components = Vec::with_capacity(5);

        let roe = ctx.extra_f64("return_on_equity").unwrap_or(0.0);
        components.push(if roe >= self.criteria.min_roe {
            (roe / 0.3).min(1.0)
        } else {
            0.3
        });

        let profit_margin = ctx.extra_f64("profit_margin").unwrap_or(0.0);
        components.push(if profit_margin >= self.criteria.min_profit_margin {
            (profit_margin / 0.25).min(1.0)
        } else {
            0.4
        });

        let debt_to_equity = ctx.extra_f64("debt_to_equity").unwrap_or(1.0);
        components.push(if debt_to_equity <= self.criteria.max_debt_to_equity {
            1.0 - debt_to_equity
        } else {
            0.2
        });

        let revenue_growth = ctx.extra_f64("revenue_growth").unwrap_or(0.0);
        components.push(if revenue_growth >= self.criteria.min_revenue_growth {
            (revenue_growth / 0.2).min(1.0)
        } else {
            0.5
        });

        let dividend_yield = ctx.extra_f64("dividend_yield").unwrap_or(0.0);
        let payout_ratio = ctx.extra_f64("payout_ratio").unwrap_or(1.0);
        components.push(
            if dividend_yield >= self.criteria.min_dividend_yield && payout_ratio < 0.8 {
                0.9
            } else {
                0.6
            },
        );

        components.iter().sum::<f64>() / components.len() as f64
    }

    /// Simplified ten-year DCF with conservative growth assumptions
    fn intrinsic_value(&self, ctx: &DecisionContext) -> f64 {
        let free_cash_flow = ctx.extra_f64("free_cash_flow").unwrap_or(0.0);
        let revenue_growth = ctx.extra_f64("revenue_growth").unwrap_or(0.05);
        let shares_outstanding = ctx.extra_f64("shares_outstanding").unwrap_or(1.0);

        let growth = revenue_growth.min(GROWTH_CAP);

        let mut total_present_value = 0.0;
        let mut last_present_value = 0.0;
        for year in 1..=10i32 {
            let cash_flow = if year <= 5 {
                free_cash_flow * (1.0 + growth).powi(year)
            } else {
                free_cash_flow
                    * (1.0 + growth).powi(5)
                    * (1.0 + TERMINAL_GROWTH).powi(year - 5)
            };
            last_present_value = cash_flow / (1.0 + DISCOUNT_RATE).powi(year);
            total_present_value += last_present_value;
        }

        let terminal_value =
            last_present_value * (1.0 + TERMINAL_GROWTH) / (DISCOUNT_RATE - TERMINAL_GROWTH);
        let terminal_present_value = terminal_value / (1.0 + DISCOUNT_RATE).powi(10);

        let enterprise_value = total_present_value + terminal_present_value;
        if shares_outstanding > 0.0 {
            enterprise_value / shares_outstanding
        } else {
            0.0
        }
    }

    fn valuation(&self, ctx: &DecisionContext) -> Valuation {
        let pe_ratio = ctx.extra_f64("pe_ratio").unwrap_or(50.0);
        let book_value = ctx.extra_f64("book_value_per_share").unwrap_or(0.0);
        let current_price = ctx.extra_f64("current_price").unwrap_or(0.0);

        let intrinsic_value = self.intrinsic_value(ctx);

        let pe_score = if pe_ratio <= self.criteria.max_pe_ratio {
            1.0
        } else {
            0.3
        };

        let pb_ratio = if book_value > 0.0 {
            current_price / book_value
        } else {
            10.0
        };
        let pb_score = if pb_ratio <= 3.0 { 1.0 } else { 0.4 };

        let margin_of_safety = if intrinsic_value > 0.0 {
            (intrinsic_value - current_price) / intrinsic_value
        } else {
            -1.0
        };
        let undervalued = margin_of_safety >= self.criteria.min_margin_of_safety;
        let mos_score = if undervalued { 1.0 } else { 0.2 };

        Valuation {
            score: (pe_score + pb_score + mos_score) / 3.0,
            intrinsic_value,
            margin_of_safety,
            undervalued,
        }
    }

    /// Moat composite over the standard indicator keys, each defaulting to
    /// a neutral 0.5
    fn moat_strength(&self, ctx: &DecisionContext) -> f64 {
        const INDICATORS: [&str; 5] = [
            "brand_score",
            "switching_cost_score",
            "network_effect_score",
            "cost_advantage_score",
            "regulatory_score",
        ];
        INDICATORS
            .iter()
            .map(|key| ctx.extra_f64(key).unwrap_or(0.5))
            .sum::<f64>()
            / INDICATORS.len() as f64
    }
}

impl Default for ValueAnalyst {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecommendationProvider for ValueAnalyst {
    fn name(&self) -> &str {
        "value_analysis"
    }

    async fn recommend(&self, ctx: &DecisionContext) -> CapabilityResult<Recommendation> {
        let fundamentals = self.fundamental_score(ctx);
        let valuation = self.valuation(ctx);
        let moat = self.moat_strength(ctx);

        let strong_fundamentals = fundamentals >= 0.7;
        let has_moat = moat >= self.criteria.min_moat_strength;
        let criteria_met = [strong_fundamentals, valuation.undervalued, has_moat]
            .iter()
            .filter(|met| **met)
            .count();

        let (action, confidence, reasoning) = match criteria_met {
            3 => (
                "STRONG_BUY",
                0.9,
                "Excellent fundamentals, undervalued, and a durable moat.",
            ),
            2 if valuation.undervalued && has_moat => (
                "BUY",
                0.75,
                "Good value with a moat; fundamentals acceptable.",
            ),
            2 => ("HOLD", 0.6, "Mixed signals across the entry criteria."),
            1 => ("HOLD", 0.4, "Insufficient quality for a value entry."),
            _ => (
                "AVOID",
                0.8,
                "Fails the value entry criteria: weak fundamentals, no discount, or no moat.",
            ),
        };

        Ok(Recommendation::new(action)
            .with_confidence(confidence)
            .with_reasoning(reasoning)
            .with_details(json!({
                "fundamental_score": fundamentals,
                "valuation_score": valuation.score,
                "intrinsic_value": valuation.intrinsic_value,
                "margin_of_safety": valuation.margin_of_safety,
                "moat_strength": moat,
                "criteria_met": criteria_met,
            })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(pairs: &[(&str, f64)]) -> DecisionContext {
        let mut ctx = DecisionContext::default();
        for (key, value) in pairs {
            ctx = ctx.with_extra(*key, json!(value));
        }
        ctx
    }

    #[tokio::test]
    async fn test_all_criteria_met_is_strong_buy() {
        let ctx = ctx_with(&[
            ("return_on_equity", 0.25),
            ("profit_margin", 0.2),
            ("debt_to_equity", 0.2),
            ("revenue_growth", 0.15),
            ("dividend_yield", 0.03),
            ("payout_ratio", 0.5),
            ("free_cash_flow", 10.0),
            ("current_price", 50.0),
            ("pe_ratio", 15.0),
            ("brand_score", 0.8),
            ("switching_cost_score", 0.8),
            ("network_effect_score", 0.8),
            ("cost_advantage_score", 0.8),
            ("regulatory_score", 0.8),
        ]);

        let rec = ValueAnalyst::new().recommend(&ctx).await.unwrap();
        assert_eq!(rec.recommendation, "STRONG_BUY");
        assert_eq!(rec.confidence, Some(0.9));
        assert_eq!(rec.details.unwrap()["criteria_met"], json!(3));
    }

    #[tokio::test]
    async fn test_value_with_moat_but_soft_fundamentals_is_buy() {
        let ctx = ctx_with(&[
            ("free_cash_flow", 10.0),
            ("current_price", 50.0),
            ("brand_score", 0.8),
            ("switching_cost_score", 0.8),
            ("network_effect_score", 0.8),
            ("cost_advantage_score", 0.8),
            ("regulatory_score", 0.8),
        ]);

        let rec = ValueAnalyst::new().recommend(&ctx).await.unwrap();
        assert_eq!(rec.recommendation, "BUY");
        assert_eq!(rec.confidence, Some(0.75));
    }

    #[tokio::test]
    async fn test_empty_context_is_avoid() {
        let rec = ValueAnalyst::new()
            .recommend(&DecisionContext::default())
            .await
            .unwrap();
        assert_eq!(rec.recommendation, "AVOID");
    }

    #[test]
    fn test_intrinsic_value_grows_with_cash_flow() {
        let analyst = ValueAnalyst::new();
        let lean = analyst.intrinsic_value(&ctx_with(&[("free_cash_flow", 5.0)]));
        let rich = analyst.intrinsic_value(&ctx_with(&[("free_cash_flow", 50.0)]));
        assert!(rich > lean);
        assert!(lean > 0.0);
    }
}
