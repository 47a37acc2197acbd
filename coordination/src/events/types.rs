//! Event types for desk coordination
//!
//! These events drive the pub/sub system. Every exclusion and override is
//! published here as well as recorded in session metadata, so no agent
//! drops out of a round silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{AgentId, ExclusionReason, SessionId};

/// All desk coordination events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    /// A coordination round started elicitation
    CoordinationStarted {
        decision_type: String,
        agents: usize,
        timestamp: DateTime<Utc>,
    },

    /// An agent was excluded from the round
    AgentExcluded {
        agent_id: AgentId,
        name: String,
        reason: ExclusionReason,
        timestamp: DateTime<Utc>,
    },

    /// A voting session was tallied
    ConsensusReached {
        session_id: SessionId,
        winning_recommendation: String,
        consensus_strength: f64,
        participants: usize,
        timestamp: DateTime<Utc>,
    },

    /// Outcome feedback was applied to an agent
    OutcomeRecorded {
        agent_id: AgentId,
        score: f64,
        accuracy: f64,
        timestamp: DateTime<Utc>,
    },

    /// The override authority reviewed a session
    OverrideIssued {
        session_id: SessionId,
        approved: bool,
        final_recommendation: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent was activated or deactivated
    AgentActivationChanged {
        agent_id: AgentId,
        active: bool,
        timestamp: DateTime<Utc>,
    },
}

impl DeskEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DeskEvent::CoordinationStarted { timestamp, .. } => *timestamp,
            DeskEvent::AgentExcluded { timestamp, .. } => *timestamp,
            DeskEvent::ConsensusReached { timestamp, .. } => *timestamp,
            DeskEvent::OutcomeRecorded { timestamp, .. } => *timestamp,
            DeskEvent::OverrideIssued { timestamp, .. } => *timestamp,
            DeskEvent::AgentActivationChanged { timestamp, .. } => *timestamp,
        }
    }

    /// Get a short type name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            DeskEvent::CoordinationStarted { .. } => "coordination_started",
            DeskEvent::AgentExcluded { .. } => "agent_excluded",
            DeskEvent::ConsensusReached { .. } => "consensus_reached",
            DeskEvent::OutcomeRecorded { .. } => "outcome_recorded",
            DeskEvent::OverrideIssued { .. } => "override_issued",
            DeskEvent::AgentActivationChanged { .. } => "agent_activation_changed",
        }
    }

    /// Session this event belongs to, if any
    pub fn session_id(&self) -> Option<&str> {
        match self {
            DeskEvent::ConsensusReached { session_id, .. } => Some(session_id),
            DeskEvent::OverrideIssued { session_id, .. } => Some(session_id),
            _ => None,
        }
    }
}
