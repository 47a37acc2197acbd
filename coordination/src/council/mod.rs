//! Council — the desk's decision pipeline
//!
//! Orchestrates one coordination round from context to final decision.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   CouncilCoordinator                       │
//! │  • snapshots the active roster                             │
//! │  • runs elicitation, tally, review                         │
//! │  • records sessions and publishes events                   │
//! └─────────────────────────┬─────────────────────────────────┘
//!                           │
//!           ┌───────────────┼───────────────┐
//!           ▼               ▼               ▼
//!     ┌───────────┐   ┌───────────┐   ┌───────────┐
//!     │ Elicitor  │   │  Voting   │   │ Override  │
//!     │ (fan-out) │   │  (tally)  │   │ Authority │
//!     └───────────┘   └───────────┘   └───────────┘
//! ```
//!
//! # Workflow
//!
//! 1. A caller submits a [`DecisionContext`](crate::state::DecisionContext)
//!    via `coordinate`
//! 2. The elicitor queries every active agent's capability concurrently,
//!    bounded and per-agent deadlined; failures become recorded exclusions
//! 3. The voting tally reduces the decisions single-threadedly, with
//!    first-seen-order tie-breaking, and appends the session to the log
//! 4. A strategic-review caller may later `review_session`, which either
//!    ratifies the winner or overrides it with the policy fallback
//! 5. Realized outcomes flow back through `record_outcome`, adapting
//!    agent confidence and performance for future rounds

pub mod coordinator;
pub mod elicit;
pub mod oversight;
pub mod voting;

// Re-export core types
pub use coordinator::{
    AgentStatus, CouncilConfig, CouncilCoordinator, CouncilError, CouncilResult,
    SharedCouncilCoordinator,
};
pub use elicit::{adjusted_confidence, Elicitor};
pub use oversight::{
    strategic_confidence, OverrideAuthority, PolicyContext, ReviewPolicy, TrendDirection,
};
pub use voting::{VotingCoordinator, VotingError, VotingResult};
