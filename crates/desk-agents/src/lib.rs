//! Desk Agents Library
//!
//! Persona recommendation capabilities and the default firm roster for
//! the desk coordination engine. The engine consumes personas only
//! through the `RecommendationProvider` interface; everything here is
//! replaceable per deployment via a TOML roster.

pub mod personas;
pub mod roster;

pub use personas::{GrowthScout, RiskAuditor, SignalDesk, ValueAnalyst};
pub use roster::{build_firm, default_roster, provider_for, PersonaKind, RosterAgent, RosterConfig};
