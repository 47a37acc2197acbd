//! Shared state for desk coordination
//!
//! The data model of the engine plus the append-only session log:
//!
//! - `types`: agents, decisions, voting sessions, outcome feedback
//! - `log`: in-memory append-only history of voting sessions
//!
//! Voting sessions and performance records are never mutated after
//! creation; all adaptive state lives on the `Agent` records owned by the
//! registry.

pub mod log;
pub mod types;

// Re-export core types
pub use log::{SessionLog, SharedSessionLog};
pub use types::{
    clamp_state, new_id, Agent, AgentDecision, AgentId, AgentRole, DecisionContext, Department,
    ExcludedAgent, ExclusionReason, Outcome, OverrideDecision, PerformanceRecord,
    PerformanceSummary, SessionId, TallyEntry, Trend, VotingSession, LEARNING_RATE_MAX,
    LEARNING_RATE_MIN, STATE_CEIL, STATE_FLOOR,
};
