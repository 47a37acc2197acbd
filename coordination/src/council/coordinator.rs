//! Council coordinator — central facade for the decision pipeline
//!
//! Wires the registry, elicitor, voting tally, performance tracker, and
//! override authority into one explicitly constructed engine. There are
//! no global singletons: callers build a registry, hand it to the
//! coordinator, and every collaborator is reachable for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::events::{DeskEvent, EventBus, SharedEventBus};
use crate::performance::{PerformanceConfig, PerformanceError, PerformanceTracker};
use crate::registry::{RosterFilter, SharedAgentRegistry};
use crate::state::{
    Agent, AgentRole, DecisionContext, Department, OverrideDecision, PerformanceSummary,
    SessionLog, SharedSessionLog, VotingSession,
};

use super::elicit::Elicitor;
use super::oversight::{OverrideAuthority, PolicyContext, ReviewPolicy};
use super::voting::{VotingCoordinator, VotingError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error type for coordinator operations
#[derive(Debug, thiserror::Error)]
pub enum CouncilError {
    #[error("no active agents participated in coordination")]
    NoParticipants,

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("coordination cancelled before tally")]
    Cancelled,
}

/// Result type for coordinator operations
pub type CouncilResult<T> = Result<T, CouncilError>;

/// Shared reference to a CouncilCoordinator
pub type SharedCouncilCoordinator = Arc<CouncilCoordinator>;

/// Configuration for the council pipeline
#[derive(Debug, Clone)]
pub struct CouncilConfig {
    /// Upper bound on concurrent capability invocations
    pub parallelism: usize,
    /// Deadline for a single capability invocation
    pub capability_timeout: Duration,
    /// Override authority thresholds
    pub review: ReviewPolicy,
    /// Outcome feedback tuning
    pub performance: PerformanceConfig,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            parallelism: 8,
            capability_timeout: Duration::from_secs(5),
            review: ReviewPolicy::default(),
            performance: PerformanceConfig::default(),
        }
    }
}

/// Central facade for desk coordination
pub struct CouncilCoordinator {
    registry: SharedAgentRegistry,
    event_bus: SharedEventBus,
    log: SharedSessionLog,
    config: CouncilConfig,
    elicitor: Elicitor,
    voting: VotingCoordinator,
    oversight: OverrideAuthority,
    tracker: PerformanceTracker,
}

impl CouncilCoordinator {
    /// Create a coordinator with default configuration
    pub fn new(registry: SharedAgentRegistry) -> Self {
        Self::with_config(registry, CouncilConfig::default())
    }

    /// Create a coordinator with explicit configuration
    pub fn with_config(registry: SharedAgentRegistry, config: CouncilConfig) -> Self {
        let event_bus = EventBus::new().shared();
        let log = SessionLog::new().shared();

        let elicitor = Elicitor::new(config.parallelism, config.capability_timeout);
        let voting = VotingCoordinator::new(log.clone(), event_bus.clone());
        let oversight = OverrideAuthority::new(config.review.clone(), event_bus.clone());
        let tracker = PerformanceTracker::with_config(
            registry.clone(),
            event_bus.clone(),
            config.performance.clone(),
        );

        Self {
            registry,
            event_bus,
            log,
            config,
            elicitor,
            voting,
            oversight,
            tracker,
        }
    }

    /// Create a shared reference to this coordinator
    pub fn shared(self) -> SharedCouncilCoordinator {
        Arc::new(self)
    }

    /// The event bus for subscribers
    pub fn event_bus(&self) -> &SharedEventBus {
        &self.event_bus
    }

    /// The agent registry
    pub fn registry(&self) -> &SharedAgentRegistry {
        &self.registry
    }

    /// The session history
    pub fn sessions(&self) -> &SharedSessionLog {
        &self.log
    }

    /// The performance tracker
    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    // =========================================================================
    // Coordination
    // =========================================================================

    /// Run one coordination round: elicit every active agent, tally the
    /// weighted votes, record and return the session
    ///
    /// Fails with `NoParticipants` when no active agent produced a
    /// decision — either none are active, or every capability was
    /// excluded.
    pub async fn coordinate(&self, ctx: &DecisionContext) -> CouncilResult<VotingSession> {
        let roster = self.registry.snapshot_active().await;
        if roster.is_empty() {
            return Err(CouncilError::NoParticipants);
        }

        info!(
            decision_type = %ctx.decision_type,
            agents = roster.len(),
            "Coordination round started"
        );
        self.event_bus.publish(DeskEvent::CoordinationStarted {
            decision_type: ctx.decision_type.clone(),
            agents: roster.len(),
            timestamp: Utc::now(),
        });

        let (decisions, exclusions) = self.elicitor.elicit(ctx, roster).await;
        for excluded in &exclusions {
            self.event_bus.publish(DeskEvent::AgentExcluded {
                agent_id: excluded.agent_id.clone(),
                name: excluded.name.clone(),
                reason: excluded.reason.clone(),
                timestamp: Utc::now(),
            });
        }

        if decisions.is_empty() {
            return Err(CouncilError::NoParticipants);
        }

        self.voting
            .tally(&ctx.decision_type, decisions, exclusions)
            .map_err(|e| match e {
                VotingError::NoParticipants => CouncilError::NoParticipants,
            })
    }

    /// `coordinate`, cancellable by the caller
    ///
    /// If the token fires before the tally, partially collected decisions
    /// are dropped and nothing is recorded.
    pub async fn coordinate_with_cancel(
        &self,
        ctx: &DecisionContext,
        cancel: &CancellationToken,
    ) -> CouncilResult<VotingSession> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CouncilError::Cancelled),
            result = self.coordinate(ctx) => result,
        }
    }

    // =========================================================================
    // Feedback and review
    // =========================================================================

    /// Feed a realized outcome back into an agent's adaptive state
    pub async fn record_outcome(
        &self,
        agent_id: &str,
        outcome: crate::state::Outcome,
    ) -> CouncilResult<()> {
        self.tracker
            .record_outcome(agent_id, outcome)
            .await
            .map_err(|e| match e {
                PerformanceError::NotFound(id) => CouncilError::AgentNotFound(id),
            })
    }

    /// Activate or deactivate an agent; idempotent, never deletes
    pub async fn set_agent_active(&self, agent_id: &str, active: bool) -> CouncilResult<()> {
        self.registry
            .set_active(agent_id, active)
            .await
            .map_err(|_| CouncilError::AgentNotFound(agent_id.to_string()))?;

        self.event_bus.publish(DeskEvent::AgentActivationChanged {
            agent_id: agent_id.to_string(),
            active,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Review a recorded session against policy, ratifying or overriding
    pub fn review_session(
        &self,
        session_id: &str,
        ctx: &PolicyContext,
    ) -> CouncilResult<OverrideDecision> {
        let session = self
            .log
            .get(session_id)
            .ok_or_else(|| CouncilError::SessionNotFound(session_id.to_string()))?;
        Ok(self.oversight.review(&session, ctx))
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Read-only status for one agent by display name
    pub async fn agent_status(&self, name: &str) -> CouncilResult<AgentStatus> {
        let agent = self
            .registry
            .get_by_name(name)
            .await
            .map_err(|_| CouncilError::AgentNotFound(name.to_string()))?;
        Ok(self.status_of(&agent))
    }

    /// Read-only status of the whole firm, grouped by department
    pub async fn firm_status(&self) -> HashMap<Department, Vec<AgentStatus>> {
        let mut status: HashMap<Department, Vec<AgentStatus>> = Department::all()
            .iter()
            .map(|department| (*department, Vec::new()))
            .collect();

        for agent in self.registry.list(RosterFilter::default()).await {
            let entry = self.status_of(&agent);
            status.entry(agent.department).or_default().push(entry);
        }
        status
    }

    fn status_of(&self, agent: &Agent) -> AgentStatus {
        let recent_performance = self
            .tracker
            .summary(&agent.id, self.config.performance.default_window_days)
            .unwrap_or_else(|_| PerformanceSummary::empty());

        AgentStatus {
            id: agent.id.clone(),
            name: agent.name.clone(),
            role: agent.role,
            department: agent.department,
            active: agent.active,
            confidence_level: agent.confidence_level,
            performance_score: agent.performance_score,
            vote_weight: agent.vote_weight,
            expertise: agent.expertise.clone(),
            personality_summary: summarize_traits(&agent.personality_traits),
            recent_performance,
            created_at: agent.created_at,
        }
    }
}

/// Read-only agent status for introspection callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    pub department: Department,
    pub active: bool,
    pub confidence_level: f64,
    pub performance_score: f64,
    pub vote_weight: f64,
    pub expertise: Vec<String>,
    /// Human-readable summary of the two dominant traits
    pub personality_summary: String,
    pub recent_performance: PerformanceSummary,
    pub created_at: DateTime<Utc>,
}

/// Two dominant traits, strongest first, ties broken by name
fn summarize_traits(traits: &HashMap<String, f64>) -> String {
    let mut ranked: Vec<(&String, &f64)> = traits.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    ranked
        .iter()
        .take(2)
        .map(|(name, _)| name.replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_traits_picks_dominant_pair() {
        let traits = HashMap::from([
            ("risk_aversion".to_string(), 0.8),
            ("patience".to_string(), 0.9),
            ("fundamentals_focus".to_string(), 0.5),
        ]);
        assert_eq!(summarize_traits(&traits), "patience, risk aversion");
    }

    #[test]
    fn test_summarize_traits_empty() {
        assert_eq!(summarize_traits(&HashMap::new()), "");
    }

    #[test]
    fn test_config_defaults() {
        let config = CouncilConfig::default();
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.review.approval_threshold, 0.6);
        assert_eq!(config.review.fallback_recommendation, "HOLD");
    }
}
