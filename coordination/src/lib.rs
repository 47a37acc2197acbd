//! Desk Coordination Library
//!
//! Agent coordination and performance-adaptive voting engine for an
//! autonomous trading desk:
//!
//! - Agent registry with role-derived vote weights and per-record locks
//! - Bounded-parallel decision elicitation with per-capability deadlines
//! - Weighted voting with deterministic first-seen tie-breaking
//! - Outcome feedback loop adapting agent confidence and performance
//! - Override authority reviewing consensus against policy thresholds
//!
//! # Usage
//!
//! ```ignore
//! use coordination::council::{CouncilCoordinator, PolicyContext, TrendDirection};
//! use coordination::registry::{AgentRegistry, AgentSpec};
//! use coordination::state::{AgentRole, DecisionContext, Department, Outcome};
//!
//! let registry = AgentRegistry::new().shared();
//! registry.register(AgentSpec::new(
//!     "Warren",
//!     AgentRole::Director,
//!     Department::MarketIntelligence,
//! ))?;
//!
//! let coordinator = CouncilCoordinator::new(registry);
//!
//! // One coordination round
//! let ctx = DecisionContext::new("trading").with_symbol("BTC");
//! let session = coordinator.coordinate(&ctx).await?;
//!
//! // Strategic review of the recorded session
//! let review = coordinator.review_session(
//!     &session.id,
//!     &PolicyContext::new(TrendDirection::Bullish, 0.2),
//! )?;
//!
//! // Outcome feedback closes the loop
//! coordinator
//!     .record_outcome(&session.participants[0], Outcome { score: 0.9, accuracy: 0.85 })
//!     .await?;
//! ```

pub mod council;
pub mod events;
pub mod performance;
pub mod provider;
pub mod registry;
pub mod state;

// Re-export the primary surface
pub use council::{
    AgentStatus, CouncilConfig, CouncilCoordinator, CouncilError, CouncilResult, PolicyContext,
    ReviewPolicy, SharedCouncilCoordinator, TrendDirection,
};
pub use events::{DeskEvent, EventBus, SharedEventBus};
pub use performance::{PerformanceConfig, PerformanceError, PerformanceTracker};
pub use provider::{CapabilityError, CapabilityResult, Recommendation, RecommendationProvider};
pub use registry::{
    AgentRegistry, AgentSpec, RegistryError, RegistryResult, RosterFilter, SharedAgentRegistry,
};
pub use state::{
    Agent, AgentDecision, AgentId, AgentRole, DecisionContext, Department, ExcludedAgent,
    ExclusionReason, Outcome, OverrideDecision, PerformanceRecord, PerformanceSummary, SessionId,
    Trend, VotingSession,
};
