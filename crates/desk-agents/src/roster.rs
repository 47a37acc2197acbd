//! Firm roster — configuration and the default firm build-out
//!
//! The default roster is the full firm: five departments, twenty agents,
//! four of them carrying persona capabilities. Custom rosters load from
//! TOML with the same shape.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use coordination::provider::RecommendationProvider;
use coordination::registry::{AgentRegistry, AgentSpec, RegistryResult, SharedAgentRegistry};
use coordination::state::{AgentId, AgentRole, Department};

use crate::personas::{GrowthScout, RiskAuditor, SignalDesk, ValueAnalyst};

/// Persona capability attachable to a roster entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
    Value,
    Growth,
    Quant,
    Risk,
}

/// Instantiate the capability for a persona kind
pub fn provider_for(kind: PersonaKind) -> Arc<dyn RecommendationProvider> {
    match kind {
        PersonaKind::Value => Arc::new(ValueAnalyst::new()),
        PersonaKind::Growth => Arc::new(GrowthScout::new()),
        PersonaKind::Quant => Arc::new(SignalDesk::new()),
        PersonaKind::Risk => Arc::new(RiskAuditor::new()),
    }
}

fn default_confidence() -> f64 {
    0.75
}

fn default_learning_rate() -> f64 {
    0.1
}

/// One roster entry
///
/// The traits table serializes last so the rendered TOML keeps scalar
/// keys ahead of sub-tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterAgent {
    pub name: String,
    pub role: AgentRole,
    pub department: Department,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaKind>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub traits: HashMap<String, f64>,
}

/// Full firm roster, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub agents: Vec<RosterAgent>,
}

impl RosterConfig {
    /// Parse a roster from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Render the roster back to TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Register every roster entry, in order, attaching personas
    pub fn install(&self, registry: &AgentRegistry) -> RegistryResult<Vec<AgentId>> {
        self.agents
            .iter()
            .map(|entry| {
                let spec = AgentSpec {
                    name: entry.name.clone(),
                    role: entry.role,
                    department: entry.department,
                    personality_traits: entry.traits.clone(),
                    expertise: entry.expertise.clone(),
                    base_confidence: entry.confidence,
                    learning_rate: entry.learning_rate,
                };
                match entry.persona {
                    Some(kind) => registry.register_with_provider(spec, provider_for(kind)),
                    None => registry.register(spec),
                }
            })
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn entry(
    name: &str,
    role: AgentRole,
    department: Department,
    traits: &[(&str, f64)],
    expertise: &[&str],
    confidence: f64,
    learning_rate: f64,
    persona: Option<PersonaKind>,
) -> RosterAgent {
    RosterAgent {
        name: name.to_string(),
        role,
        department,
        traits: traits
            .iter()
            .map(|(trait_name, weight)| (trait_name.to_string(), *weight))
            .collect(),
        expertise: expertise.iter().map(|tag| tag.to_string()).collect(),
        confidence,
        learning_rate,
        persona,
    }
}

/// The default firm: twenty agents across five departments
pub fn default_roster() -> RosterConfig {
    use AgentRole::{Analyst, Director, Senior, Specialist};
    use Department::{
        Communications, MarketIntelligence, PerformanceLab, RiskControl, TradeOperations,
    };

    RosterConfig {
        agents: vec![
            // Market intelligence
            entry(
                "Warren",
                Director,
                MarketIntelligence,
                &[("risk_aversion", 0.8), ("fundamentals_focus", 0.9), ("patience", 0.9)],
                &["value_investing", "fundamental_analysis", "risk_assessment"],
                0.85,
                0.06,
                Some(PersonaKind::Value),
            ),
            entry(
                "Cathie",
                Senior,
                MarketIntelligence,
                &[("innovation_focus", 0.9), ("growth_seeking", 0.8), ("risk_tolerance", 0.7)],
                &["growth_investing", "innovation_analysis", "sector_rotation"],
                0.80,
                0.12,
                Some(PersonaKind::Growth),
            ),
            entry(
                "Quant",
                Senior,
                MarketIntelligence,
                &[("mathematical_precision", 0.9), ("pattern_recognition", 0.85), ("objectivity", 0.9)],
                &["quantitative_analysis", "statistical_modeling", "algorithmic_signals"],
                0.88,
                0.09,
                Some(PersonaKind::Quant),
            ),
            entry(
                "Data_Whisperer",
                Specialist,
                MarketIntelligence,
                &[("pattern_detection", 0.9), ("data_synthesis", 0.85), ("market_intuition", 0.7)],
                &["data_aggregation", "pattern_analysis", "market_context"],
                0.82,
                0.10,
                None,
            ),
            entry(
                "Macro_Monk",
                Specialist,
                MarketIntelligence,
                &[("strategic_thinking", 0.85), ("macro_vision", 0.9), ("decision_clarity", 0.8)],
                &["macro_analysis", "strategic_decisions", "market_timing"],
                0.79,
                0.07,
                None,
            ),
            // Trade operations
            entry(
                "Trade_Executor",
                Director,
                TradeOperations,
                &[("execution_speed", 0.9), ("accuracy", 0.9), ("reliability", 0.85)],
                &["order_execution", "market_microstructure", "slippage_minimization"],
                0.87,
                0.08,
                None,
            ),
            entry(
                "Portfolio_Optimizer",
                Senior,
                TradeOperations,
                &[("optimization_focus", 0.9), ("balance_seeking", 0.8), ("efficiency", 0.85)],
                &["portfolio_construction", "asset_allocation", "rebalancing"],
                0.83,
                0.11,
                None,
            ),
            entry(
                "Liquidity_Hunter",
                Specialist,
                TradeOperations,
                &[("market_timing", 0.8), ("liquidity_awareness", 0.9), ("adaptability", 0.75)],
                &["liquidity_analysis", "market_impact", "execution_optimization"],
                0.78,
                0.13,
                None,
            ),
            entry(
                "Arbitrage_Scout",
                Analyst,
                TradeOperations,
                &[("opportunity_detection", 0.85), ("speed", 0.9), ("precision", 0.8)],
                &["arbitrage_opportunities", "price_discrepancies", "cross_market_analysis"],
                0.76,
                0.14,
                None,
            ),
            // Risk control
            entry(
                "Degen_Auditor",
                Director,
                RiskControl,
                &[("risk_vigilance", 0.9), ("skepticism", 0.8), ("contrarian_thinking", 0.7)],
                &["risk_validation", "audit_trails", "red_flag_detection"],
                0.84,
                0.06,
                Some(PersonaKind::Risk),
            ),
            entry(
                "VaR_Guardian",
                Senior,
                RiskControl,
                &[("mathematical_rigor", 0.9), ("conservatism", 0.85), ("model_accuracy", 0.8)],
                &["value_at_risk", "stress_testing", "risk_modeling"],
                0.81,
                0.08,
                None,
            ),
            entry(
                "Correlation_Detective",
                Specialist,
                RiskControl,
                &[("pattern_recognition", 0.85), ("system_thinking", 0.8), ("vigilance", 0.9)],
                &["correlation_analysis", "systemic_risk", "portfolio_diversification"],
                0.77,
                0.10,
                None,
            ),
            entry(
                "Black_Swan_Sentinel",
                Analyst,
                RiskControl,
                &[("paranoia", 0.8), ("scenario_analysis", 0.85), ("preparedness", 0.9)],
                &["tail_risk", "scenario_planning", "crisis_preparation"],
                0.74,
                0.05,
                None,
            ),
            // Performance lab
            entry(
                "Performance_Analyst",
                Director,
                PerformanceLab,
                &[("analytical_precision", 0.9), ("objectivity", 0.85), ("insight_generation", 0.8)],
                &["performance_attribution", "benchmarking", "metric_analysis"],
                0.86,
                0.09,
                None,
            ),
            entry(
                "Alpha_Hunter",
                Senior,
                PerformanceLab,
                &[("alpha_detection", 0.9), ("strategy_evaluation", 0.85), ("optimization", 0.8)],
                &["alpha_generation", "strategy_performance", "factor_analysis"],
                0.82,
                0.12,
                None,
            ),
            entry(
                "Backtesting_Engine",
                Specialist,
                PerformanceLab,
                &[("historical_analysis", 0.9), ("simulation_accuracy", 0.85), ("validation", 0.8)],
                &["historical_testing", "strategy_validation", "simulation_modeling"],
                0.80,
                0.07,
                None,
            ),
            entry(
                "The_Ghost",
                Analyst,
                PerformanceLab,
                &[("meta_analysis", 0.8), ("emergent_behavior", 0.9), ("intuition", 0.7)],
                &["emotional_intelligence", "meta_layer_analysis", "emergent_patterns"],
                0.75,
                0.15,
                None,
            ),
            // Communications
            entry(
                "Report_Generator",
                Director,
                Communications,
                &[("communication_clarity", 0.9), ("synthesis_ability", 0.85), ("insight_presentation", 0.8)],
                &["report_generation", "executive_summaries", "stakeholder_communication"],
                0.83,
                0.10,
                None,
            ),
            entry(
                "Market_Narrator",
                Senior,
                Communications,
                &[("storytelling", 0.85), ("market_interpretation", 0.8), ("narrative_construction", 0.9)],
                &["market_storytelling", "trend_narration", "insight_communication"],
                0.78,
                0.11,
                None,
            ),
            entry(
                "Alert_Coordinator",
                Specialist,
                Communications,
                &[("urgency_assessment", 0.9), ("priority_management", 0.85), ("notification_precision", 0.8)],
                &["alert_management", "notification_systems", "escalation_protocols"],
                0.79,
                0.08,
                None,
            ),
        ],
    }
}

/// Registry pre-populated with the default firm
pub fn build_firm() -> RegistryResult<SharedAgentRegistry> {
    let registry = AgentRegistry::new();
    default_roster().install(&registry)?;
    Ok(registry.shared())
}
