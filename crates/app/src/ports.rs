//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the core and the adapter
//! crates can depend on them without creating circular dependencies.

pub mod adapter;
pub mod daylight;
pub mod event_sink;
pub mod state_store;

pub use adapter::Adapter;
pub use daylight::DaylightOracle;
pub use event_sink::EventSink;
pub use state_store::StateStore;
