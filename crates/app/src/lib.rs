//! # homehub-app
//!
//! Application layer: the event router, the automation engine and the
//! **port definitions** (traits) adapters implement.
//!
//! ## Responsibilities
//! - Define **port traits** for the outside world:
//!   - `Adapter`: accepts outbound commands for one device ecosystem
//!   - `EventSink`: where inbound events are handed to the hub
//!   - `StateStore`: loads and saves the device state snapshot
//!   - `DaylightOracle`: tells whether it is light outside
//! - Provide the **inbound fabric** (multi-producer, single-consumer channel)
//! - Own the **device registry** and the **adapter table**
//! - Run **subscriptions** through the `AutomationEngine`
//! - Route events in the `Router`, the only task mutating hub state
//! - **Bootstrap** a router from a configuration `Topology`
//!
//! ## Dependency rule
//! Depends on `homehub-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod adapter_table;
pub mod automation_engine;
pub mod bootstrap;
pub mod device_registry;
pub mod dispatch;
pub mod fabric;
pub mod ports;
pub mod router;
