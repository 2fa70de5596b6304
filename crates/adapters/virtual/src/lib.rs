//! # homehub-adapter-virtual
//!
//! Virtual adapter that stands in for real hardware.
//!
//! ## Behaviour
//!
//! | Concern | What happens |
//! |---------|--------------|
//! | Outbound commands | Logged at `info`; the last [`SENT_LOG_CAPACITY`] are kept in order |
//! | Power | The last commanded on/off state is remembered per device |
//! | Simulated remote | With `simulate_ir_key` set, a raw infrared event from remote `simulated_remote` is emitted every `simulate_interval_secs` |
//!
//! ```toml
//! [[adapter]]
//! id = "demo"
//! type = "virtual"
//! simulate_ir_key = "KEY_POWER"
//! simulate_interval_secs = 5
//! ```
//!
//! ## Dependency rule
//!
//! Depends on `homehub-app` (port traits) and `homehub-domain` only.

mod config;

pub use config::VirtualConfig;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use homehub_app::fabric::InboundSender;
use homehub_app::ports::{Adapter, EventSink};
use homehub_domain::command::OutboundCommand;
use homehub_domain::config::AdapterConfig;
use homehub_domain::error::{ConfigurationError, HubError};
use homehub_domain::event::InboundEvent;
use homehub_domain::id::AdapterId;

/// Adapter kind handled by this crate.
pub const KIND: &str = "virtual";

/// Remote name used by the simulated infrared remote.
pub const SIMULATED_REMOTE: &str = "simulated_remote";

/// How many outbound commands are kept for inspection.
pub const SENT_LOG_CAPACITY: usize = 256;

/// Adapter recording everything it is asked to do.
#[derive(Debug)]
pub struct VirtualAdapter {
    id: AdapterId,
    sent: Mutex<VecDeque<OutboundCommand>>,
    power: Mutex<HashMap<String, bool>>,
    simulator: Option<JoinHandle<()>>,
}

impl VirtualAdapter {
    /// An adapter without a simulated remote.
    #[must_use]
    pub fn new(id: AdapterId) -> Self {
        Self {
            id,
            sent: Mutex::default(),
            power: Mutex::default(),
            simulator: None,
        }
    }

    /// Build from configuration, spawning the simulated remote if asked to.
    ///
    /// Must be called from within a tokio runtime when a remote is simulated.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the parameters are malformed or the
    /// simulation interval is zero.
    pub fn start<S>(config: &AdapterConfig, sink: S) -> Result<Self, HubError>
    where
        S: EventSink + 'static,
    {
        let params: VirtualConfig = config.params()?;
        let mut adapter = Self::new(config.id.clone());
        if let Some(key) = params.simulate_ir_key {
            if params.simulate_interval_secs == 0 {
                return Err(ConfigurationError::Settings(format!(
                    "adapter {}: simulate_interval_secs must be positive",
                    config.id
                ))
                .into());
            }
            let period = Duration::from_secs(params.simulate_interval_secs);
            tracing::info!(adapter = %config.id, %key, secs = period.as_secs(), "simulating infrared remote");
            adapter.simulator = Some(tokio::spawn(simulate_remote(key, period, sink)));
        }
        Ok(adapter)
    }

    /// The most recent commands, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundCommand> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Last commanded power state of an adapter-local device.
    #[must_use]
    pub fn is_on(&self, device: &str) -> Option<bool> {
        self.power
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(device)
            .copied()
    }
}

impl Adapter for VirtualAdapter {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn kind(&self) -> &str {
        KIND
    }

    fn send(&self, command: OutboundCommand) -> Result<(), HubError> {
        tracing::info!(adapter = %self.id, %command, "virtual command");
        if let OutboundCommand::Power { device, on, .. } = &command {
            self.power
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(device.clone(), *on);
        }
        let mut sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        if sent.len() == SENT_LOG_CAPACITY {
            sent.pop_front();
        }
        sent.push_back(command);
        Ok(())
    }
}

impl Drop for VirtualAdapter {
    fn drop(&mut self) {
        if let Some(handle) = self.simulator.take() {
            handle.abort();
            tracing::debug!(adapter = %self.id, "simulated remote aborted");
        }
    }
}

/// Factory registered for the `virtual` kind.
///
/// # Errors
///
/// See [`VirtualAdapter::start`].
pub fn factory(
    config: &AdapterConfig,
    sender: InboundSender,
) -> Result<Arc<dyn Adapter>, HubError> {
    Ok(Arc::new(VirtualAdapter::start(config, sender)?))
}

async fn simulate_remote<S: EventSink>(key: String, period: Duration, sink: S) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        ticker.tick().await;
        let event = InboundEvent::RawInfrared {
            remote: SIMULATED_REMOTE.to_string(),
            event: key.clone(),
        };
        if let Err(err) = sink.receive(event) {
            tracing::warn!(%err, "simulated remote stopped");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homehub_app::fabric::InboundFabric;
    use homehub_domain::device::Rgb;

    fn config(params: &[(&str, serde_json::Value)]) -> AdapterConfig {
        let mut config = AdapterConfig::new("demo", KIND);
        for (key, value) in params {
            config.params.insert((*key).to_string(), value.clone());
        }
        config
    }

    #[test]
    fn should_record_commands_in_order() {
        let adapter = VirtualAdapter::new(AdapterId::from("demo"));
        let color = OutboundCommand::Color {
            device: "bulb".to_string(),
            color: Rgb::new(1, 2, 3),
        };
        let blink = OutboundCommand::Blink {
            device: "bulb".to_string(),
        };

        adapter.send(color.clone()).unwrap();
        adapter.send(blink.clone()).unwrap();

        assert_eq!(adapter.sent(), vec![color, blink]);
    }

    #[test]
    fn should_keep_only_most_recent_commands() {
        let adapter = VirtualAdapter::new(AdapterId::from("demo"));
        let blink = |index: usize| OutboundCommand::Blink {
            device: format!("bulb{index}"),
        };

        for index in 0..SENT_LOG_CAPACITY + 10 {
            adapter.send(blink(index)).unwrap();
        }

        let sent = adapter.sent();
        assert_eq!(sent.len(), SENT_LOG_CAPACITY);
        assert_eq!(sent.first(), Some(&blink(10)));
        assert_eq!(sent.last(), Some(&blink(SENT_LOG_CAPACITY + 9)));
    }

    #[test]
    fn should_remember_last_power_state() {
        let adapter = VirtualAdapter::new(AdapterId::from("demo"));
        assert_eq!(adapter.is_on("plug"), None);

        for on in [true, false] {
            adapter
                .send(OutboundCommand::Power {
                    device: "plug".to_string(),
                    command: String::new(),
                    on,
                })
                .unwrap();
        }

        assert_eq!(adapter.is_on("plug"), Some(false));
    }

    #[test]
    fn should_return_virtual_as_kind() {
        let adapter = VirtualAdapter::new(AdapterId::from("demo"));
        assert_eq!(adapter.kind(), "virtual");
        assert_eq!(adapter.id().as_str(), "demo");
    }

    #[tokio::test]
    async fn should_not_simulate_without_key() {
        let fabric = InboundFabric::new();
        let adapter = VirtualAdapter::start(&config(&[]), fabric.sender()).unwrap();
        assert!(adapter.simulator.is_none());
    }

    #[tokio::test]
    async fn should_reject_malformed_params() {
        let fabric = InboundFabric::new();
        let result = VirtualAdapter::start(
            &config(&[("simulate_interval_secs", "often".into())]),
            fabric.sender(),
        );
        assert!(matches!(
            result,
            Err(HubError::Configuration(ConfigurationError::AdapterParams { .. }))
        ));
    }

    #[tokio::test]
    async fn should_reject_zero_interval() {
        let fabric = InboundFabric::new();
        let result = VirtualAdapter::start(
            &config(&[
                ("simulate_ir_key", "KEY_POWER".into()),
                ("simulate_interval_secs", 0.into()),
            ]),
            fabric.sender(),
        );
        assert!(matches!(
            result,
            Err(HubError::Configuration(ConfigurationError::Settings(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn should_emit_simulated_key_presses() {
        let mut fabric = InboundFabric::new();
        let _adapter = VirtualAdapter::start(
            &config(&[
                ("simulate_ir_key", "KEY_POWER".into()),
                ("simulate_interval_secs", 5.into()),
            ]),
            fabric.sender(),
        )
        .unwrap();

        let event = fabric.next().await;

        assert_eq!(
            event,
            Some(InboundEvent::RawInfrared {
                remote: SIMULATED_REMOTE.to_string(),
                event: "KEY_POWER".to_string(),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_simulating_when_dropped() {
        let mut fabric = InboundFabric::new();
        let adapter = VirtualAdapter::start(
            &config(&[("simulate_ir_key", "KEY_POWER".into())]),
            fabric.sender(),
        )
        .unwrap();
        drop(adapter);

        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(fabric.try_next().is_none());
    }
}
