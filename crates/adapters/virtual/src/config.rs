//! Virtual adapter configuration.

use serde::Deserialize;

/// Kind-specific parameters of a `virtual` adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// When set, a simulated remote reports this key periodically.
    pub simulate_ir_key: Option<String>,
    /// Seconds between two simulated key presses.
    pub simulate_interval_secs: u64,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            simulate_ir_key: None,
            simulate_interval_secs: 5,
        }
    }
}
