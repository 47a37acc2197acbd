//! Agent Registry — canonical roster of scoring agents
//!
//! Owns every `Agent` record for the firm. Static attributes (role,
//! department, vote weight) are fixed at registration; mutable state
//! (confidence, performance score, active flag) is reached through a
//! per-record lock so writes to one agent never contend with reads of
//! another. Agents are never deleted — deactivation flips a flag.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tokio::sync::RwLock as AsyncRwLock;
use tracing::info;

use crate::provider::RecommendationProvider;
use crate::state::types::{
    clamp_state, new_id, Agent, AgentId, AgentRole, Department, LEARNING_RATE_MAX,
    LEARNING_RATE_MIN,
};

/// Error type for registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),

    #[error("agent not found: {0}")]
    NotFound(String),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Shared reference to an AgentRegistry
pub type SharedAgentRegistry = Arc<AgentRegistry>;

/// Per-record lock handle for one agent
///
/// The performance tracker takes the write half to serialize feedback
/// updates per agent; everything else reads.
pub type AgentHandle = Arc<AsyncRwLock<Agent>>;

/// Registration request for a new agent
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub name: String,
    pub role: AgentRole,
    pub department: Department,
    pub personality_traits: HashMap<String, f64>,
    pub expertise: Vec<String>,
    /// Starting confidence level, clamped into [0.1, 1.0]
    pub base_confidence: f64,
    /// Fixed learning rate, clamped into [0.05, 0.15]
    pub learning_rate: f64,
}

impl AgentSpec {
    /// Create a spec with default confidence (0.75) and learning rate (0.1)
    pub fn new(name: impl Into<String>, role: AgentRole, department: Department) -> Self {
        Self {
            name: name.into(),
            role,
            department,
            personality_traits: HashMap::new(),
            expertise: Vec::new(),
            base_confidence: 0.75,
            learning_rate: 0.1,
        }
    }

    pub fn with_traits(mut self, traits: &[(&str, f64)]) -> Self {
        self.personality_traits = traits
            .iter()
            .map(|(name, weight)| (name.to_string(), *weight))
            .collect();
        self
    }

    pub fn with_expertise(mut self, expertise: &[&str]) -> Self {
        self.expertise = expertise.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn with_confidence(mut self, base_confidence: f64) -> Self {
        self.base_confidence = base_confidence;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }
}

/// Filter for listing agents
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterFilter {
    pub department: Option<Department>,
    pub active_only: bool,
}

impl RosterFilter {
    pub fn active() -> Self {
        Self {
            department: None,
            active_only: true,
        }
    }

    pub fn department(department: Department) -> Self {
        Self {
            department: Some(department),
            active_only: false,
        }
    }
}

struct RegistryInner {
    /// Registration order — the iteration order every listing preserves
    agents: Vec<AgentHandle>,
    by_id: HashMap<AgentId, AgentHandle>,
    by_name: HashMap<String, AgentId>,
    providers: HashMap<AgentId, Arc<dyn RecommendationProvider>>,
}

/// Registry of all firm agents with per-record synchronization
pub struct AgentRegistry {
    inner: RwLock<RegistryInner>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                agents: Vec::new(),
                by_id: HashMap::new(),
                by_name: HashMap::new(),
                providers: HashMap::new(),
            }),
        }
    }

    /// Create a shared reference to this registry
    pub fn shared(self) -> SharedAgentRegistry {
        Arc::new(self)
    }

    /// Register an agent without a specialized capability
    pub fn register(&self, spec: AgentSpec) -> RegistryResult<AgentId> {
        self.insert(spec, None)
    }

    /// Register an agent carrying a recommendation capability
    pub fn register_with_provider(
        &self,
        spec: AgentSpec,
        provider: Arc<dyn RecommendationProvider>,
    ) -> RegistryResult<AgentId> {
        self.insert(spec, Some(provider))
    }

    fn insert(
        &self,
        spec: AgentSpec,
        provider: Option<Arc<dyn RecommendationProvider>>,
    ) -> RegistryResult<AgentId> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        if inner.by_name.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateName(spec.name));
        }

        let id = new_id();
        let agent = Agent {
            id: id.clone(),
            name: spec.name.clone(),
            role: spec.role,
            department: spec.department,
            personality_traits: spec.personality_traits,
            expertise: spec.expertise,
            confidence_level: clamp_state(spec.base_confidence),
            performance_score: 0.75,
            learning_rate: spec.learning_rate.clamp(LEARNING_RATE_MIN, LEARNING_RATE_MAX),
            // Derived from role exactly once; never recomputed
            vote_weight: spec.role.vote_weight(),
            active: true,
            created_at: Utc::now(),
        };

        info!(
            agent = %agent.name,
            role = %agent.role,
            department = %agent.department,
            vote_weight = agent.vote_weight,
            "Agent registered"
        );

        let handle: AgentHandle = Arc::new(AsyncRwLock::new(agent));
        inner.agents.push(handle.clone());
        inner.by_id.insert(id.clone(), handle);
        inner.by_name.insert(spec.name, id.clone());
        if let Some(provider) = provider {
            inner.providers.insert(id.clone(), provider);
        }

        Ok(id)
    }

    /// Snapshot of one agent by id
    pub async fn get(&self, id: &str) -> RegistryResult<Agent> {
        let handle = self.handle(id)?;
        let agent = handle.read().await.clone();
        Ok(agent)
    }

    /// Snapshot of one agent by display name
    pub async fn get_by_name(&self, name: &str) -> RegistryResult<Agent> {
        let id = self.id_of(name)?;
        self.get(&id).await
    }

    /// Resolve a display name to an agent id
    pub fn id_of(&self, name: &str) -> RegistryResult<AgentId> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Whether an agent id is registered
    pub fn contains(&self, id: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.by_id.contains_key(id)
    }

    /// Per-record lock handle for an agent
    pub fn handle(&self, id: &str) -> RegistryResult<AgentHandle> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Capability registered for an agent, if any
    pub fn provider_for(&self, id: &str) -> Option<Arc<dyn RecommendationProvider>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.providers.get(id).cloned()
    }

    /// List agent snapshots in registration order, optionally filtered
    pub async fn list(&self, filter: RosterFilter) -> Vec<Agent> {
        let handles: Vec<AgentHandle> = {
            let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
            inner.agents.clone()
        };

        let mut agents = Vec::with_capacity(handles.len());
        for handle in handles {
            let agent = handle.read().await.clone();
            if let Some(department) = filter.department {
                if agent.department != department {
                    continue;
                }
            }
            if filter.active_only && !agent.active {
                continue;
            }
            agents.push(agent);
        }
        agents
    }

    /// Active agents with their capabilities, in registration order
    ///
    /// This is the elicitation roster; its order is the tie-break key for
    /// voting, so callers must not re-order it.
    pub async fn snapshot_active(
        &self,
    ) -> Vec<(Agent, Option<Arc<dyn RecommendationProvider>>)> {
        let (handles, providers) = {
            let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
            (inner.agents.clone(), inner.providers.clone())
        };

        let mut roster = Vec::with_capacity(handles.len());
        for handle in handles {
            let agent = handle.read().await.clone();
            if agent.active {
                let provider = providers.get(&agent.id).cloned();
                roster.push((agent, provider));
            }
        }
        roster
    }

    /// Flip an agent's active flag; idempotent
    pub async fn set_active(&self, id: &str, active: bool) -> RegistryResult<()> {
        let handle = self.handle(id)?;
        let mut agent = handle.write().await;
        agent.active = active;
        Ok(())
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
