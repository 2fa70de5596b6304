//! Router: the single consumer of the inbound fabric.
//!
//! The router owns every piece of mutable hub state (device registry,
//! boolean store) and is therefore the only task touching it. It pulls one
//! event at a time, mutates state, dispatches commands and publishes trigger
//! events to the automation engine. A periodic tick refreshes the
//! environment boolean and writes a state snapshot.
//!
//! No event-processing error ends the loop; errors are logged and the event
//! is dropped.

use std::future::Future;
use std::time::Duration;

use homehub_domain::automation::trigger;
use homehub_domain::boolean::BooleanStore;
use homehub_domain::command::OutboundCommand;
use homehub_domain::device::{Capability, Device, Rgb, RuntimeUpdate};
use homehub_domain::error::HubError;
use homehub_domain::event::{InboundEvent, PowerKind};
use homehub_domain::location::Location;
use homehub_domain::time;

use crate::adapter_table::AdapterTable;
use crate::automation_engine::{AutomationEngine, DEFAULT_MAX_CASCADE_DEPTH, EngineContext};
use crate::device_registry::DeviceRegistry;
use crate::dispatch;
use crate::fabric::{InboundFabric, InboundSender};
use crate::ports::{DaylightOracle, StateStore};

/// Boolean refreshed from the daylight oracle unless configured otherwise.
pub const DEFAULT_ENVIRONMENT_BOOLEAN: &str = "environmentHasLight";

/// Runtime knobs of the router.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterSettings {
    pub tick_interval: Duration,
    pub location: Location,
    pub environment_boolean: String,
    pub max_cascade_depth: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
            location: Location::default(),
            environment_boolean: DEFAULT_ENVIRONMENT_BOOLEAN.to_string(),
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
        }
    }
}

/// The hub's event loop and the state it owns.
///
/// Built by [`configure`](crate::bootstrap::configure).
pub struct Router<S, D> {
    pub(crate) registry: DeviceRegistry,
    pub(crate) booleans: BooleanStore,
    pub(crate) adapters: AdapterTable,
    pub(crate) engine: AutomationEngine,
    pub(crate) fabric: InboundFabric,
    pub(crate) state_store: S,
    pub(crate) daylight: D,
    pub(crate) settings: RouterSettings,
}

impl<S, D> std::fmt::Debug for Router<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("devices", &self.registry.len())
            .field("adapters", &self.adapters.len())
            .field("subscriptions", &self.engine.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S, D> Router<S, D>
where
    S: StateStore,
    D: DaylightOracle,
{
    /// A producer handle on the router's fabric.
    #[must_use]
    pub fn sender(&self) -> InboundSender {
        self.fabric.sender()
    }

    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn booleans(&self) -> &BooleanStore {
        &self.booleans
    }

    #[must_use]
    pub fn adapters(&self) -> &AdapterTable {
        &self.adapters
    }

    #[must_use]
    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Run until `shutdown` resolves, then write a final snapshot.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        let period = self.settings.tick_interval;
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(
            devices = self.registry.len(),
            subscriptions = self.engine.len(),
            tick_secs = period.as_secs(),
            "router started"
        );
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                event = self.fabric.next() => {
                    let Some(event) = event else { break };
                    if let Err(err) = self.handle_event(event).await {
                        tracing::warn!(%err, "dropping event");
                    }
                }
                _ = ticker.tick() => self.tick().await,
            }
        }

        if let Err(err) = self.save_snapshot().await {
            tracing::error!(%err, "final snapshot failed");
        }
        tracing::info!("router stopped");
    }

    /// Handle every event already queued on the fabric, including those
    /// queued while handling. Returns how many were handled.
    pub async fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.fabric.try_next() {
            if let Err(err) = self.handle_event(event).await {
                tracing::warn!(%err, "dropping event");
            }
            handled += 1;
        }
        handled
    }

    /// Route one inbound event.
    ///
    /// # Errors
    ///
    /// Returns the error that made the event unprocessable (unknown device,
    /// unsupported capability, adapter failure).
    #[tracing::instrument(skip(self, event), fields(kind = event.kind()))]
    pub async fn handle_event(&mut self, event: InboundEvent) -> Result<(), HubError> {
        match event {
            InboundEvent::Power { device, kind } => self.power(device.as_str(), kind).await,
            InboundEvent::Color { device, color } => self.color(device.as_str(), color),
            InboundEvent::ColorTemperature { device, kelvin } => {
                self.send(device.as_str(), Capability::ColorTemperature, |target| {
                    OutboundCommand::ColorTemperature {
                        device: target.adapter_device_id().to_string(),
                        kelvin,
                    }
                })
            }
            InboundEvent::Brightness { device, brightness } => {
                self.send(device.as_str(), Capability::Brightness, |target| {
                    OutboundCommand::Brightness {
                        device: target.adapter_device_id().to_string(),
                        brightness,
                        color: target.last_color,
                    }
                })
            }
            InboundEvent::Playback { device, action } => {
                self.send(device.as_str(), Capability::Playback, |target| {
                    OutboundCommand::Playback {
                        device: target.adapter_device_id().to_string(),
                        action: action.clone(),
                    }
                })
            }
            InboundEvent::Blink { device } => {
                self.send(device.as_str(), Capability::Blink, |target| {
                    OutboundCommand::Blink {
                        device: target.adapter_device_id().to_string(),
                    }
                })
            }
            InboundEvent::Infrared { device, command } => {
                self.send(device.as_str(), Capability::Infrared, |target| {
                    OutboundCommand::Infrared {
                        device: target.adapter_device_id().to_string(),
                        command: command.clone(),
                    }
                })
            }
            InboundEvent::RawInfrared { remote, event } => {
                self.publish(&trigger::infrared(&remote, &event)).await;
                Ok(())
            }
            InboundEvent::PersonPresence { person, present } => {
                tracing::info!(%person, present, "presence changed");
                self.publish(&trigger::presence(&person, present)).await;
                Ok(())
            }
            InboundEvent::Contact { device, contact } => {
                self.mark_seen(device.as_str())?;
                self.publish(&trigger::contact(&device, contact)).await;
                Ok(())
            }
            InboundEvent::PushButton { device, specifier } => {
                self.mark_seen(device.as_str())?;
                self.publish(&trigger::push_button(&device, &specifier)).await;
                Ok(())
            }
            InboundEvent::WaterLeak { device, detected } => {
                self.mark_seen(device.as_str())?;
                if detected {
                    tracing::warn!(%device, "water leak detected");
                }
                self.publish(&trigger::water_leak(&device, detected)).await;
                Ok(())
            }
            InboundEvent::LinkQuality { device, quality } => {
                self.mark_seen(device.as_str())?;
                self.registry.update(device.as_str(), RuntimeUpdate::LinkQuality(quality))
            }
            InboundEvent::BatteryStatus { device, status } => {
                self.mark_seen(device.as_str())?;
                self.registry.update(device.as_str(), RuntimeUpdate::Battery(status))
            }
            InboundEvent::EnvironmentReading { device, reading } => {
                self.mark_seen(device.as_str())?;
                self.registry.update(device.as_str(), RuntimeUpdate::Reading(reading))
            }
            InboundEvent::Publish { topic } => {
                self.publish(&topic).await;
                Ok(())
            }
        }
    }

    /// Publish a trigger event to the automation engine.
    ///
    /// Returns the trigger names whose actions ran.
    pub async fn publish(&mut self, event: &str) -> Vec<String> {
        let sender = self.fabric.sender();
        let mut ctx = EngineContext {
            booleans: &mut self.booleans,
            registry: &self.registry,
            adapters: &self.adapters,
            inbound: &sender,
        };
        self.engine.publish(event, &mut ctx).await
    }

    /// One periodic tick: refresh the environment boolean, then persist.
    pub async fn tick(&mut self) {
        self.update_environment().await;
        if let Err(err) = self.save_snapshot().await {
            tracing::error!(%err, "snapshot failed, retrying next tick");
        }
    }

    /// Ask the daylight oracle and store the answer, publishing the change
    /// event when the value flips.
    pub async fn update_environment(&mut self) {
        let daylight = self
            .daylight
            .has_daylight(time::now(), &self.settings.location);
        let name = self.settings.environment_boolean.clone();
        match self.booleans.set(&name, daylight) {
            Ok(true) => {
                tracing::info!(boolean = %name, daylight, "environment changed");
                self.publish(&trigger::boolean_changed(&name, daylight)).await;
            }
            Ok(false) => {}
            Err(err) => tracing::warn!(%err, "cannot update environment boolean"),
        }
    }

    /// Write the persisted fields of every device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Persistence`] when the state store fails.
    pub async fn save_snapshot(&self) -> Result<(), HubError> {
        self.state_store.save(self.registry.snapshot_all()).await?;
        tracing::debug!(devices = self.registry.len(), "snapshot written");
        Ok(())
    }

    async fn power(&mut self, id: &str, kind: PowerKind) -> Result<(), HubError> {
        let device = self.registry.lookup(id)?;
        let on = kind.resolve(device.probably_turned_on);
        if !device.is_group() {
            self.switch(id, on)?;
            self.publish(&trigger::device_power(id, on)).await;
            return Ok(());
        }

        let members = device.members.clone();
        self.registry.update(id, RuntimeUpdate::Power(on))?;
        for member in &members {
            match self.switch(member.as_str(), on) {
                Ok(()) => {
                    self.publish(&trigger::device_power(member, on)).await;
                }
                Err(err) => {
                    tracing::warn!(%err, group = %id, device = %member, "group member power failed");
                }
            }
        }
        self.publish(&trigger::device_power(id, on)).await;
        Ok(())
    }

    /// Send the configured power command and update the optimistic flag.
    fn switch(&mut self, id: &str, on: bool) -> Result<(), HubError> {
        let device = self.registry.lookup(id)?;
        dispatch::send_one(&self.adapters, device, Capability::Power, |target| {
            OutboundCommand::Power {
                device: target.adapter_device_id().to_string(),
                command: if on {
                    target.config.power_on_cmd.clone()
                } else {
                    target.config.power_off_cmd.clone()
                },
                on,
            }
        })?;
        self.registry.update(id, RuntimeUpdate::Power(on))
    }

    /// Send a color and record it as last color on every device that
    /// accepted it.
    fn color(&mut self, id: &str, color: Rgb) -> Result<(), HubError> {
        let command = |target: &Device| OutboundCommand::Color {
            device: target.adapter_device_id().to_string(),
            color,
        };
        let device = self.registry.lookup(id)?;
        if !device.is_group() {
            dispatch::send_one(&self.adapters, device, Capability::Color, &command)?;
            return self.registry.update(id, RuntimeUpdate::Color(color));
        }

        let members = device.members.clone();
        for member in &members {
            let sent = self.registry.lookup(member.as_str()).and_then(|target| {
                dispatch::send_one(&self.adapters, target, Capability::Color, &command)
            });
            match sent {
                Ok(()) => self.registry.update(member.as_str(), RuntimeUpdate::Color(color))?,
                Err(err) => {
                    tracing::warn!(%err, group = %id, device = %member, "group member rejected command");
                }
            }
        }
        self.registry.update(id, RuntimeUpdate::Color(color))
    }

    fn send<F>(&self, device: &str, capability: Capability, command: F) -> Result<(), HubError>
    where
        F: Fn(&Device) -> OutboundCommand,
    {
        dispatch::send(&self.registry, &self.adapters, device, capability, command)
    }

    fn mark_seen(&mut self, device: &str) -> Result<(), HubError> {
        self.registry.update(device, RuntimeUpdate::Seen(time::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use homehub_domain::automation::{Action, Condition, Subscription};
    use homehub_domain::device::{DeviceConfig, DeviceType, Statefile};
    use homehub_domain::id::{AdapterId, DeviceId};

    use crate::ports::{Adapter, EventSink};

    // ── Spy adapter ────────────────────────────────────────────────

    struct SpyAdapter {
        id: AdapterId,
        sent: Mutex<Vec<OutboundCommand>>,
    }

    impl SpyAdapter {
        fn sent(&self) -> Vec<OutboundCommand> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Adapter for SpyAdapter {
        fn id(&self) -> &AdapterId {
            &self.id
        }

        fn kind(&self) -> &str {
            "spy"
        }

        fn send(&self, command: OutboundCommand) -> Result<(), HubError> {
            self.sent.lock().unwrap().push(command);
            Ok(())
        }
    }

    // ── In-memory state store ──────────────────────────────────────

    #[derive(Clone, Default)]
    struct InMemoryStateStore {
        saved: Arc<Mutex<Vec<Statefile>>>,
        fail: bool,
    }

    impl StateStore for InMemoryStateStore {
        async fn load(&self) -> Result<Statefile, HubError> {
            Ok(Statefile::default())
        }

        async fn save(&self, statefile: Statefile) -> Result<(), HubError> {
            if self.fail {
                return Err(HubError::Persistence("disk full".into()));
            }
            self.saved.lock().unwrap().push(statefile);
            Ok(())
        }
    }

    // ── Harness ────────────────────────────────────────────────────

    type DaylightFn = fn(time::Timestamp, &Location) -> bool;

    fn config(id: &str, device_type: DeviceType, on: &str, off: &str) -> DeviceConfig {
        DeviceConfig {
            id: DeviceId::from(id),
            device_type,
            adapter: AdapterId::from("spy"),
            adapters_device_id: None,
            name: id.to_string(),
            description: String::new(),
            power_on_cmd: on.to_string(),
            power_off_cmd: off.to_string(),
            category: None,
        }
    }

    fn router(
        subscriptions: Vec<Subscription>,
        store: InMemoryStateStore,
        daylight: DaylightFn,
    ) -> (Router<InMemoryStateStore, DaylightFn>, Arc<SpyAdapter>) {
        let spy = Arc::new(SpyAdapter {
            id: AdapterId::from("spy"),
            sent: Mutex::default(),
        });
        let mut adapters = AdapterTable::new();
        adapters.insert(spy.clone()).unwrap();

        let mut registry = DeviceRegistry::new();
        registry
            .insert(Device::new(config("plug1", DeviceType::Switch, "C1_ON", "C1_OFF")))
            .unwrap();
        registry
            .insert(Device::new(config("plug2", DeviceType::Switch, "C2_ON", "C2_OFF")))
            .unwrap();
        registry
            .insert(Device::new(config("bulb", DeviceType::ColorLight, "on", "off")))
            .unwrap();
        registry
            .insert(Device::group(
                config("plugs", DeviceType::Switch, "", ""),
                vec![DeviceId::from("plug1"), DeviceId::from("plug2")],
            ))
            .unwrap();

        let mut engine = AutomationEngine::default();
        for subscription in subscriptions {
            engine.subscribe(subscription).unwrap();
        }

        let router = Router {
            registry,
            booleans: [("anybodyHome", true), (DEFAULT_ENVIRONMENT_BOOLEAN, false)]
                .into_iter()
                .collect(),
            adapters,
            engine,
            fabric: InboundFabric::new(),
            state_store: store,
            daylight,
            settings: RouterSettings::default(),
        };
        (router, spy)
    }

    fn dark(_: time::Timestamp, _: &Location) -> bool {
        false
    }

    fn light(_: time::Timestamp, _: &Location) -> bool {
        true
    }

    fn power(device: &str, command: &str, on: bool) -> OutboundCommand {
        OutboundCommand::Power {
            device: device.to_string(),
            command: command.to_string(),
            on,
        }
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_send_configured_power_command() {
        let (mut router, spy) = router(vec![], InMemoryStateStore::default(), dark);

        router
            .handle_event(InboundEvent::power("plug1", PowerKind::On))
            .await
            .unwrap();

        assert_eq!(spy.sent(), vec![power("plug1", "C1_ON", true)]);
        assert!(router.registry().lookup("plug1").unwrap().probably_turned_on);
    }

    #[tokio::test]
    async fn should_restore_flag_after_toggling_twice() {
        let (mut router, spy) = router(vec![], InMemoryStateStore::default(), dark);

        for _ in 0..2 {
            router
                .handle_event(InboundEvent::power("plug1", PowerKind::Toggle))
                .await
                .unwrap();
        }

        assert_eq!(
            spy.sent(),
            vec![power("plug1", "C1_ON", true), power("plug1", "C1_OFF", false)]
        );
        assert!(!router.registry().lookup("plug1").unwrap().probably_turned_on);
    }

    #[tokio::test]
    async fn should_fan_group_power_out_to_each_member() {
        let (mut router, spy) = router(vec![], InMemoryStateStore::default(), dark);

        router
            .handle_event(InboundEvent::power("plugs", PowerKind::Toggle))
            .await
            .unwrap();

        assert_eq!(
            spy.sent(),
            vec![power("plug1", "C1_ON", true), power("plug2", "C2_ON", true)]
        );
        for id in ["plugs", "plug1", "plug2"] {
            assert!(router.registry().lookup(id).unwrap().probably_turned_on);
        }
    }

    #[tokio::test]
    async fn should_publish_power_change_of_device() {
        let subscription = Subscription::builder()
            .event("device:plug1:power:on")
            .action(Action::SetBooleanFalse {
                boolean: "anybodyHome".to_string(),
            })
            .build()
            .unwrap();
        let (mut router, _spy) = router(vec![subscription], InMemoryStateStore::default(), dark);

        router
            .handle_event(InboundEvent::power("plug1", PowerKind::On))
            .await
            .unwrap();

        assert!(!router.booleans().get("anybodyHome").unwrap());
    }

    #[tokio::test]
    async fn should_publish_power_trigger_again_on_repeated_power_on() {
        let subscription = Subscription::builder()
            .event("device:plug2:power:on")
            .action(Action::SetBooleanFalse {
                boolean: "anybodyHome".to_string(),
            })
            .build()
            .unwrap();
        let (mut router, spy) = router(vec![subscription], InMemoryStateStore::default(), dark);

        router
            .handle_event(InboundEvent::power("plug2", PowerKind::On))
            .await
            .unwrap();
        router.booleans.set("anybodyHome", true).unwrap();
        router
            .handle_event(InboundEvent::power("plug2", PowerKind::On))
            .await
            .unwrap();

        assert_eq!(spy.sent().len(), 2);
        assert!(!router.booleans().get("anybodyHome").unwrap());
    }

    #[tokio::test]
    async fn should_publish_power_trigger_of_members_and_group() {
        let (mut router, _spy) = router(vec![], InMemoryStateStore::default(), dark);
        let plug1 = Subscription::builder()
            .event("device:plug1:power:off")
            .action(Action::SetBooleanFalse {
                boolean: "anybodyHome".to_string(),
            })
            .build()
            .unwrap();
        let plugs = Subscription::builder()
            .event("device:plugs:power:off")
            .action(Action::SetBooleanTrue {
                boolean: DEFAULT_ENVIRONMENT_BOOLEAN.to_string(),
            })
            .build()
            .unwrap();
        router.engine.subscribe(plug1).unwrap();
        router.engine.subscribe(plugs).unwrap();

        // everything already off
        router
            .handle_event(InboundEvent::power("plugs", PowerKind::Off))
            .await
            .unwrap();

        assert!(!router.booleans().get("anybodyHome").unwrap());
        assert!(router.booleans().get(DEFAULT_ENVIRONMENT_BOOLEAN).unwrap());
    }

    #[tokio::test]
    async fn should_keep_last_color_when_color_is_rejected() {
        let (mut router, spy) = router(vec![], InMemoryStateStore::default(), dark);

        let result = router
            .handle_event(InboundEvent::Color {
                device: DeviceId::from("plug1"),
                color: Rgb::new(255, 0, 0),
            })
            .await;

        assert!(matches!(
            result,
            Err(HubError::UnsupportedCapability {
                capability: Capability::Color,
                ..
            })
        ));
        assert!(spy.sent().is_empty());
        assert_eq!(router.registry().lookup("plug1").unwrap().last_color, Rgb::WHITE);
        let snapshot = router.registry().snapshot_all();
        assert_eq!(snapshot.devices[&DeviceId::from("plug1")].last_color, Rgb::WHITE);
    }

    #[tokio::test]
    async fn should_record_color_only_on_group_members_that_accept_it() {
        let (mut router, spy) = router(vec![], InMemoryStateStore::default(), dark);
        let red = Rgb::new(255, 0, 0);
        router
            .registry
            .insert(Device::group(
                config("mixed", DeviceType::Generic, "", ""),
                vec![DeviceId::from("plug1"), DeviceId::from("bulb")],
            ))
            .unwrap();

        router
            .handle_event(InboundEvent::Color {
                device: DeviceId::from("mixed"),
                color: red,
            })
            .await
            .unwrap();

        assert_eq!(
            spy.sent(),
            vec![OutboundCommand::Color {
                device: "bulb".to_string(),
                color: red,
            }]
        );
        assert_eq!(router.registry().lookup("bulb").unwrap().last_color, red);
        assert_eq!(router.registry().lookup("plug1").unwrap().last_color, Rgb::WHITE);
    }

    #[tokio::test]
    async fn should_reject_unsupported_capability() {
        let (mut router, spy) = router(vec![], InMemoryStateStore::default(), dark);

        let result = router
            .handle_event(InboundEvent::Brightness {
                device: DeviceId::from("plug1"),
                brightness: 50,
            })
            .await;

        assert!(matches!(
            result,
            Err(HubError::UnsupportedCapability {
                capability: Capability::Brightness,
                ..
            })
        ));
        assert!(spy.sent().is_empty());
    }

    #[tokio::test]
    async fn should_fail_on_unknown_device() {
        let (mut router, _spy) = router(vec![], InMemoryStateStore::default(), dark);

        let result = router
            .handle_event(InboundEvent::power("ghost", PowerKind::On))
            .await;

        assert!(matches!(result, Err(HubError::UnknownDevice(id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn should_carry_last_color_in_brightness_command() {
        let (mut router, spy) = router(vec![], InMemoryStateStore::default(), dark);
        let red = Rgb::new(255, 0, 0);

        router
            .handle_event(InboundEvent::Color {
                device: DeviceId::from("bulb"),
                color: red,
            })
            .await
            .unwrap();
        router
            .handle_event(InboundEvent::Brightness {
                device: DeviceId::from("bulb"),
                brightness: 40,
            })
            .await
            .unwrap();

        assert_eq!(
            spy.sent().last(),
            Some(&OutboundCommand::Brightness {
                device: "bulb".to_string(),
                brightness: 40,
                color: red,
            })
        );
        assert_eq!(router.registry().lookup("bulb").unwrap().last_color, red);
    }

    #[tokio::test]
    async fn should_turn_on_light_when_door_opens_and_somebody_home() {
        let subscription = Subscription::builder()
            .event("contact:bulb:true")
            .condition(Condition::BooleanIsTrue {
                boolean: "anybodyHome".to_string(),
            })
            .action(Action::PowerOn {
                device: DeviceId::from("plug1"),
            })
            .build()
            .unwrap();
        let (mut router, spy) = router(vec![subscription], InMemoryStateStore::default(), dark);

        router
            .sender()
            .receive(InboundEvent::Contact {
                device: DeviceId::from("bulb"),
                contact: true,
            })
            .unwrap();
        let handled = router.process_pending().await;

        assert_eq!(handled, 2);
        assert_eq!(spy.sent(), vec![power("plug1", "C1_ON", true)]);
        assert!(router.registry().lookup("bulb").unwrap().last_online.is_some());
    }

    #[tokio::test]
    async fn should_publish_raw_infrared_as_trigger() {
        let subscription = Subscription::builder()
            .event("infrared:mceusb:KEY_POWER")
            .action(Action::PowerToggle {
                device: DeviceId::from("plugs"),
            })
            .build()
            .unwrap();
        let (mut router, spy) = router(vec![subscription], InMemoryStateStore::default(), dark);

        router
            .sender()
            .receive(InboundEvent::RawInfrared {
                remote: "mceusb".to_string(),
                event: "KEY_POWER".to_string(),
            })
            .unwrap();
        router.process_pending().await;

        assert_eq!(spy.sent().len(), 2);
    }

    #[tokio::test]
    async fn should_publish_environment_change_once() {
        let subscription = Subscription::builder()
            .event("boolean:environmentHasLight:changes-to-true")
            .action(Action::PowerOff {
                device: DeviceId::from("plug1"),
            })
            .build()
            .unwrap();
        let store = InMemoryStateStore::default();
        let (mut router, _spy) = router(vec![subscription], store.clone(), light);

        router.tick().await;
        router.tick().await;

        assert!(router.booleans().get(DEFAULT_ENVIRONMENT_BOOLEAN).unwrap());
        assert_eq!(router.process_pending().await, 1);
        assert_eq!(store.saved.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_survive_snapshot_failure() {
        let store = InMemoryStateStore {
            fail: true,
            ..Default::default()
        };
        let (mut router, _spy) = router(vec![], store, dark);

        router.tick().await;

        assert!(matches!(
            router.save_snapshot().await,
            Err(HubError::Persistence(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn should_write_final_snapshot_on_shutdown() {
        let store = InMemoryStateStore::default();
        let (router, _spy) = router(vec![], store.clone(), dark);
        let sender = router.sender();
        sender
            .receive(InboundEvent::power("plug2", PowerKind::On))
            .unwrap();

        router
            .run(tokio::time::sleep(Duration::from_millis(10)))
            .await;

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].devices[&DeviceId::from("plug2")].probably_turned_on);
    }

    #[tokio::test(start_paused = true)]
    async fn should_snapshot_on_every_tick() {
        let store = InMemoryStateStore::default();
        let (router, _spy) = router(vec![], store.clone(), dark);

        router
            .run(tokio::time::sleep(Duration::from_secs(150)))
            .await;

        // two ticks at 60s and 120s, then the final one
        assert_eq!(store.saved.lock().unwrap().len(), 3);
    }
}
