//! Performance tracking — outcome feedback and adaptive agent state
//!
//! The tracker is the only writer of an agent's performance score and
//! confidence level. Feedback is applied under the agent's per-record
//! write lock, so concurrent outcomes for different agents never contend
//! and updates to the same agent are serialized. The raw records are an
//! append-only log per agent.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::events::{DeskEvent, SharedEventBus};
use crate::registry::SharedAgentRegistry;
use crate::state::types::{
    clamp_state, AgentId, Outcome, PerformanceRecord, PerformanceSummary, Trend,
};

/// Error type for performance operations
#[derive(Debug, thiserror::Error)]
pub enum PerformanceError {
    #[error("agent not found: {0}")]
    NotFound(String),
}

/// Result type for performance operations
pub type PerformanceResult<T> = Result<T, PerformanceError>;

/// Tuning constants for outcome feedback
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// Confidence multiplier after a high-accuracy outcome
    pub confidence_boost: f64,
    /// Confidence multiplier after a low-accuracy outcome
    pub confidence_penalty: f64,
    /// Accuracy above which confidence is boosted
    pub high_accuracy: f64,
    /// Accuracy below which confidence is penalized
    pub low_accuracy: f64,
    /// Window used by status summaries
    pub default_window_days: i64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            confidence_boost: 1.05,
            confidence_penalty: 0.95,
            high_accuracy: 0.8,
            low_accuracy: 0.3,
            default_window_days: 7,
        }
    }
}

/// Tracks outcome history and adapts agent state
pub struct PerformanceTracker {
    registry: SharedAgentRegistry,
    event_bus: SharedEventBus,
    config: PerformanceConfig,
    history: RwLock<HashMap<AgentId, Vec<PerformanceRecord>>>,
}

impl PerformanceTracker {
    /// Create a tracker writing to agents in the given registry
    pub fn new(registry: SharedAgentRegistry, event_bus: SharedEventBus) -> Self {
        Self::with_config(registry, event_bus, PerformanceConfig::default())
    }

    pub fn with_config(
        registry: SharedAgentRegistry,
        event_bus: SharedEventBus,
        config: PerformanceConfig,
    ) -> Self {
        Self {
            registry,
            event_bus,
            config,
            history: RwLock::new(HashMap::new()),
        }
    }

    /// The active config
    pub fn config(&self) -> &PerformanceConfig {
        &self.config
    }

    /// Record an outcome and fold it into the agent's adaptive state
    ///
    /// The performance score moves by an exponential moving average with
    /// the agent's fixed learning rate; confidence is nudged only outside
    /// the neutral accuracy band. Both stay clamped in [0.1, 1.0].
    pub async fn record_outcome(
        &self,
        agent_id: &str,
        outcome: Outcome,
    ) -> PerformanceResult<()> {
        let handle = self
            .registry
            .handle(agent_id)
            .map_err(|_| PerformanceError::NotFound(agent_id.to_string()))?;

        {
            let mut history = self.history.write().unwrap_or_else(|e| e.into_inner());
            history
                .entry(agent_id.to_string())
                .or_default()
                .push(PerformanceRecord {
                    agent_id: agent_id.to_string(),
                    timestamp: Utc::now(),
                    outcome,
                });
        }

        {
            let mut agent = handle.write().await;
            agent.performance_score = clamp_state(
                agent.performance_score * (1.0 - agent.learning_rate)
                    + outcome.score * agent.learning_rate,
            );

            if outcome.accuracy > self.config.high_accuracy {
                agent.confidence_level =
                    clamp_state(agent.confidence_level * self.config.confidence_boost);
            } else if outcome.accuracy < self.config.low_accuracy {
                agent.confidence_level =
                    clamp_state(agent.confidence_level * self.config.confidence_penalty);
            }

            debug!(
                agent = %agent.name,
                performance_score = agent.performance_score,
                confidence_level = agent.confidence_level,
                "Outcome applied"
            );
        }

        self.event_bus.publish(DeskEvent::OutcomeRecorded {
            agent_id: agent_id.to_string(),
            score: outcome.score,
            accuracy: outcome.accuracy,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Rolling summary of records newer than `window_days`
    ///
    /// Fails for unknown agents; an agent with no records in the window
    /// gets a zero-valued summary, not an error.
    pub fn summary(&self, agent_id: &str, window_days: i64) -> PerformanceResult<PerformanceSummary> {
        if !self.registry.contains(agent_id) {
            return Err(PerformanceError::NotFound(agent_id.to_string()));
        }

        let cutoff = Utc::now() - Duration::days(window_days);
        let history = self.history.read().unwrap_or_else(|e| e.into_inner());

        let scores: Vec<f64> = history
            .get(agent_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.timestamp > cutoff)
                    .map(|record| record.outcome.score)
                    .collect()
            })
            .unwrap_or_default();

        if scores.is_empty() {
            return Ok(PerformanceSummary::empty());
        }

        let latest = *scores.last().unwrap_or(&0.0);
        let earliest = *scores.first().unwrap_or(&0.0);
        let trend = if scores.len() > 1 && latest > earliest {
            Trend::Improving
        } else {
            Trend::Stable
        };

        Ok(PerformanceSummary {
            records: scores.len(),
            mean_score: scores.iter().sum::<f64>() / scores.len() as f64,
            latest_score: latest,
            trend,
        })
    }

    /// All records for one agent, oldest first
    pub fn records(&self, agent_id: &str) -> Vec<PerformanceRecord> {
        let history = self.history.read().unwrap_or_else(|e| e.into_inner());
        history.get(agent_id).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    fn push_record_at(&self, agent_id: &str, outcome: Outcome, timestamp: chrono::DateTime<Utc>) {
        let mut history = self.history.write().unwrap_or_else(|e| e.into_inner());
        history
            .entry(agent_id.to_string())
            .or_default()
            .push(PerformanceRecord {
                agent_id: agent_id.to_string(),
                timestamp,
                outcome,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::registry::{AgentRegistry, AgentSpec};
    use crate::state::types::{AgentRole, Department};

    async fn setup() -> (PerformanceTracker, String) {
        let registry = AgentRegistry::new().shared();
        let id = registry
            .register(
                AgentSpec::new("Warren", AgentRole::Director, Department::MarketIntelligence)
                    .with_confidence(0.85)
                    .with_learning_rate(0.1),
            )
            .unwrap();
        let tracker = PerformanceTracker::new(registry, EventBus::new().shared());
        (tracker, id)
    }

    #[tokio::test]
    async fn test_ema_moves_toward_outcome() {
        let (tracker, id) = setup().await;

        tracker
            .record_outcome(&id, Outcome { score: 1.0, accuracy: 0.5 })
            .await
            .unwrap();

        // 0.75 * 0.9 + 1.0 * 0.1 = 0.775
        let agent = tracker.registry.get(&id).await.unwrap();
        assert!((agent.performance_score - 0.775).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_ema_fixpoint_leaves_score_unchanged() {
        let (tracker, id) = setup().await;
        let before = tracker.registry.get(&id).await.unwrap().performance_score;

        tracker
            .record_outcome(
                &id,
                Outcome {
                    score: before,
                    accuracy: 0.5,
                },
            )
            .await
            .unwrap();

        let after = tracker.registry.get(&id).await.unwrap().performance_score;
        assert!((after - before).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_neutral_accuracy_leaves_confidence_unchanged() {
        let (tracker, id) = setup().await;
        let before = tracker.registry.get(&id).await.unwrap().confidence_level;

        for accuracy in [0.3, 0.5, 0.8] {
            tracker
                .record_outcome(&id, Outcome { score: 0.5, accuracy })
                .await
                .unwrap();
        }

        let after = tracker.registry.get(&id).await.unwrap().confidence_level;
        assert!((after - before).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_confidence_never_exceeds_ceiling() {
        let (tracker, id) = setup().await;

        for _ in 0..50 {
            tracker
                .record_outcome(&id, Outcome { score: 0.9, accuracy: 0.95 })
                .await
                .unwrap();
        }

        let agent = tracker.registry.get(&id).await.unwrap();
        assert_eq!(agent.confidence_level, 1.0);
    }

    #[tokio::test]
    async fn test_confidence_never_drops_below_floor() {
        let (tracker, id) = setup().await;

        for _ in 0..200 {
            tracker
                .record_outcome(&id, Outcome { score: 0.2, accuracy: 0.1 })
                .await
                .unwrap();
        }

        let agent = tracker.registry.get(&id).await.unwrap();
        assert_eq!(agent.confidence_level, 0.1);
    }

    #[tokio::test]
    async fn test_unknown_agent_rejected() {
        let (tracker, _) = setup().await;
        assert!(matches!(
            tracker
                .record_outcome("missing", Outcome { score: 0.5, accuracy: 0.5 })
                .await,
            Err(PerformanceError::NotFound(_))
        ));
        assert!(matches!(
            tracker.summary("missing", 7),
            Err(PerformanceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_summary_without_records_is_zero_valued() {
        let (tracker, id) = setup().await;
        let summary = tracker.summary(&id, 7).unwrap();
        assert_eq!(summary.records, 0);
        assert_eq!(summary.mean_score, 0.0);
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[tokio::test]
    async fn test_summary_trend_and_mean() {
        let (tracker, id) = setup().await;

        tracker
            .record_outcome(&id, Outcome { score: 0.4, accuracy: 0.5 })
            .await
            .unwrap();
        tracker
            .record_outcome(&id, Outcome { score: 0.8, accuracy: 0.5 })
            .await
            .unwrap();

        let summary = tracker.summary(&id, 7).unwrap();
        assert_eq!(summary.records, 2);
        assert!((summary.mean_score - 0.6).abs() < 1e-9);
        assert!((summary.latest_score - 0.8).abs() < 1e-9);
        assert_eq!(summary.trend, Trend::Improving);
    }

    #[tokio::test]
    async fn test_summary_window_excludes_old_records() {
        let (tracker, id) = setup().await;

        tracker.push_record_at(
            &id,
            Outcome { score: 0.9, accuracy: 0.5 },
            Utc::now() - Duration::days(30),
        );
        tracker
            .record_outcome(&id, Outcome { score: 0.4, accuracy: 0.5 })
            .await
            .unwrap();

        let summary = tracker.summary(&id, 7).unwrap();
        assert_eq!(summary.records, 1);
        assert!((summary.latest_score - 0.4).abs() < 1e-9);
        // A single in-window record is stable, not improving
        assert_eq!(summary.trend, Trend::Stable);

        let wide = tracker.summary(&id, 90).unwrap();
        assert_eq!(wide.records, 2);
    }
}
