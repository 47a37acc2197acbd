//! Event-driven observability for desk coordination
//!
//! Pub/sub messaging for every notable step of a coordination round, so
//! exclusions and overrides are attributable outside the session records
//! themselves.
//!
//! 1. **Event Types** (`types.rs`): the desk events, from round start to
//!    override issuance.
//!
//! 2. **Event Bus** (`bus.rs`): Tokio broadcast-based pub/sub.
//!
//! # Event Flow
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Producer   │────▶│  Event Bus   │────▶│  Subscribers │
//! │  (publish)   │     │  (broadcast) │     │   (recv)     │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use coordination::events::{DeskEvent, EventBus};
//! use chrono::Utc;
//!
//! let bus = EventBus::new().shared();
//! let mut receiver = bus.subscribe();
//!
//! bus.publish(DeskEvent::CoordinationStarted {
//!     decision_type: "trading".to_string(),
//!     agents: 20,
//!     timestamp: Utc::now(),
//! });
//!
//! let event = receiver.recv().await?;
//! ```

pub mod bus;
pub mod types;

// Re-export core types
pub use bus::{EventBus, SharedEventBus};
pub use types::DeskEvent;
