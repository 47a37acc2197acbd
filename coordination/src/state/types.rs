//! Core types for desk coordination state
//!
//! These types form the shared vocabulary of the engine: the agent record
//! owned by the registry, the per-round decision, the tallied voting
//! session, and the outcome feedback that drives adaptation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for registered agents
pub type AgentId = String;

/// Unique identifier for voting sessions
pub type SessionId = String;

/// Generate a fresh identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Floor for mutable agent state (confidence, performance score)
pub const STATE_FLOOR: f64 = 0.1;

/// Ceiling for mutable agent state
pub const STATE_CEIL: f64 = 1.0;

/// Lower bound of the per-agent learning rate band
pub const LEARNING_RATE_MIN: f64 = 0.05;

/// Upper bound of the per-agent learning rate band
pub const LEARNING_RATE_MAX: f64 = 0.15;

/// Clamp a confidence or performance value into its legal band
pub fn clamp_state(value: f64) -> f64 {
    value.clamp(STATE_FLOOR, STATE_CEIL)
}

/// Seniority rank of a registered agent
///
/// A closed ranking: the voting weight of an agent is a pure function of
/// its rank, assigned once at registration and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Director,
    Senior,
    Specialist,
    Analyst,
}

impl AgentRole {
    /// Voting weight for this rank
    pub fn vote_weight(&self) -> f64 {
        match self {
            AgentRole::Director => 1.0,
            AgentRole::Senior => 0.8,
            AgentRole::Specialist => 0.6,
            AgentRole::Analyst => 0.4,
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Director => write!(f, "director"),
            AgentRole::Senior => write!(f, "senior"),
            AgentRole::Specialist => write!(f, "specialist"),
            AgentRole::Analyst => write!(f, "analyst"),
        }
    }
}

/// Department a registered agent belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    MarketIntelligence,
    TradeOperations,
    RiskControl,
    PerformanceLab,
    Communications,
}

impl Department {
    /// All departments, in firm org-chart order
    pub fn all() -> &'static [Department] {
        &[
            Department::MarketIntelligence,
            Department::TradeOperations,
            Department::RiskControl,
            Department::PerformanceLab,
            Department::Communications,
        ]
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Department::MarketIntelligence => write!(f, "market_intelligence"),
            Department::TradeOperations => write!(f, "trade_operations"),
            Department::RiskControl => write!(f, "risk_control"),
            Department::PerformanceLab => write!(f, "performance_lab"),
            Department::Communications => write!(f, "communications"),
        }
    }
}

/// A registered scoring agent
///
/// Static identity (id, name, role, department, vote weight) is fixed at
/// registration. Mutable state (confidence, performance score, active
/// flag) is only written by the performance tracker and the registry's
/// activation toggle; both keep values inside the
/// [`STATE_FLOOR`]..[`STATE_CEIL`] band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: AgentRole,
    pub department: Department,
    /// Named personality-trait weights in [0, 1]
    pub personality_traits: HashMap<String, f64>,
    /// Expertise tags matched against the decision context
    pub expertise: Vec<String>,
    pub confidence_level: f64,
    pub performance_score: f64,
    /// Fixed for the agent's lifetime, inside [0.05, 0.15]
    pub learning_rate: f64,
    /// Derived once from role, immutable thereafter
    pub vote_weight: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_decision_type() -> String {
    "trading".to_string()
}

fn default_market_type() -> String {
    "general".to_string()
}

fn default_volatility() -> f64 {
    0.1
}

/// Decision context submitted by the caller
///
/// Recognized keys are typed fields; anything else lands in `extra` and
/// is visible to individual agent capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    #[serde(default = "default_decision_type")]
    pub decision_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default = "default_market_type")]
    pub market_type: String,
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for DecisionContext {
    fn default() -> Self {
        Self {
            decision_type: default_decision_type(),
            symbol: None,
            market_type: default_market_type(),
            volatility: default_volatility(),
            risk_score: None,
            extra: HashMap::new(),
        }
    }
}

impl DecisionContext {
    /// Create a context for the given decision type
    pub fn new(decision_type: impl Into<String>) -> Self {
        Self {
            decision_type: decision_type.into(),
            ..Self::default()
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_market_type(mut self, market_type: impl Into<String>) -> Self {
        self.market_type = market_type.into();
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn with_risk_score(mut self, risk_score: f64) -> Self {
        self.risk_score = Some(risk_score);
        self
    }

    /// Attach an arbitrary capability-specific key
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Numeric lookup into `extra`
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(|v| v.as_f64())
    }

    /// String lookup into `extra`
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

/// One agent's recommendation for a specific coordination round
///
/// Immutable once created. The vote weight is captured at decision time
/// so later registry mutation cannot retroactively rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDecision {
    pub agent_id: AgentId,
    pub timestamp: DateTime<Utc>,
    pub decision_type: String,
    pub recommendation: String,
    pub confidence: f64,
    pub reasoning: String,
    pub supporting_data: serde_json::Value,
    pub vote_weight: f64,
}

/// Why an agent was left out of a voting session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The agent's capability did not answer within the deadline
    Timeout,
    /// The agent's capability returned an error
    Failure(String),
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::Timeout => write!(f, "timed out"),
            ExclusionReason::Failure(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Session metadata for an agent that did not participate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedAgent {
    pub agent_id: AgentId,
    pub name: String,
    pub reason: ExclusionReason,
}

/// Accumulated weight for one recommendation string
///
/// Entries are kept in first-seen elicitation order; that order is the
/// deterministic tie-break key when two recommendations land on exactly
/// the same weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyEntry {
    pub recommendation: String,
    pub weight: f64,
    /// weight / total weight, 0 when the total is 0
    pub share: f64,
}

/// The tallied outcome of one coordination round
///
/// Created once per call, never mutated, appended to the session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingSession {
    pub id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub decision_type: String,
    /// Participating decisions in elicitation (registry) order
    pub decisions: Vec<AgentDecision>,
    /// Per-recommendation weights in first-seen order
    pub tally: Vec<TallyEntry>,
    pub winning_recommendation: String,
    /// Winning weight / total weight, in [0, 1]
    pub consensus_strength: f64,
    pub total_weight: f64,
    pub participants: Vec<AgentId>,
    /// Agents elicited but excluded, with the reason on record
    pub exclusions: Vec<ExcludedAgent>,
}

impl VotingSession {
    /// Weight share per recommendation
    pub fn distribution(&self) -> HashMap<String, f64> {
        self.tally
            .iter()
            .map(|entry| (entry.recommendation.clone(), entry.share))
            .collect()
    }

    /// Share of one recommendation, 0 if it received no votes
    pub fn share_of(&self, recommendation: &str) -> f64 {
        self.tally
            .iter()
            .find(|entry| entry.recommendation == recommendation)
            .map(|entry| entry.share)
            .unwrap_or(0.0)
    }
}

/// Realized-outcome feedback for one agent
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome quality in [0, 1], blended into the performance score
    pub score: f64,
    /// Prediction accuracy in [0, 1], nudges confidence
    pub accuracy: f64,
}

/// Append-only record of one outcome for one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub agent_id: AgentId,
    pub timestamp: DateTime<Utc>,
    pub outcome: Outcome,
}

/// Direction of an agent's recent performance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
}

/// Rolling performance aggregate over a time window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub records: usize,
    pub mean_score: f64,
    pub latest_score: f64,
    pub trend: Trend,
}

impl PerformanceSummary {
    /// Summary for an agent with no records in the window
    pub fn empty() -> Self {
        Self {
            records: 0,
            mean_score: 0.0,
            latest_score: 0.0,
            trend: Trend::Stable,
        }
    }
}

/// Final, reasoned decision from the override authority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideDecision {
    pub session_id: SessionId,
    /// The session winner when ratified, the policy fallback otherwise
    pub final_recommendation: String,
    pub approved: bool,
    pub confidence: f64,
    /// Cites the consensus strength and the policy basis for audit
    pub reasoning: String,
    /// The superseded session winner, set only when overridden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridden_recommendation: Option<String>,
    pub timestamp: DateTime<Utc>,
}
