//! Automation engine: runs subscriptions when their trigger is published.
//!
//! For a published event name the engine looks up the one subscription
//! listening to it, evaluates its conditions in order and, if all hold,
//! executes its actions in order. A failing action is logged and the next
//! one still runs.
//!
//! Setting a boolean that actually changes publishes
//! `boolean:<name>:changes-to-<value>` again. Those cascades are processed
//! on an explicit depth-first stack: a cascade runs to completion before the
//! next action of its parent, and any cascade nested deeper than
//! `max_cascade_depth` is skipped with [`HubError::CascadeLimitExceeded`].

use std::collections::HashMap;
use std::time::Duration;

use homehub_domain::automation::{Action, Subscription, trigger};
use homehub_domain::boolean::BooleanStore;
use homehub_domain::command::OutboundCommand;
use homehub_domain::device::Capability;
use homehub_domain::error::{ConfigurationError, HubError};
use homehub_domain::event::{InboundEvent, PowerKind};
use homehub_domain::time;

use crate::adapter_table::AdapterTable;
use crate::device_registry::DeviceRegistry;
use crate::dispatch;
use crate::ports::EventSink;

/// Default bound on nested boolean cascades.
pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 16;

/// Everything an action may touch, borrowed from the router for one publish.
pub struct EngineContext<'a> {
    pub booleans: &'a mut BooleanStore,
    pub registry: &'a DeviceRegistry,
    pub adapters: &'a AdapterTable,
    /// Where power and blink actions re-enter the hub.
    pub inbound: &'a dyn EventSink,
}

struct Frame<'s> {
    actions: std::slice::Iter<'s, Action>,
    depth: usize,
}

/// Subscriptions keyed by trigger event name.
#[derive(Debug)]
pub struct AutomationEngine {
    subscriptions: HashMap<String, Subscription>,
    max_cascade_depth: usize,
}

impl Default for AutomationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CASCADE_DEPTH)
    }
}

impl AutomationEngine {
    #[must_use]
    pub fn new(max_cascade_depth: usize) -> Self {
        Self {
            subscriptions: HashMap::new(),
            max_cascade_depth,
        }
    }

    /// Register a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateSubscription`] if another
    /// subscription already listens to the same event, or the validation
    /// error of an empty trigger or action list.
    pub fn subscribe(&mut self, subscription: Subscription) -> Result<(), HubError> {
        subscription.validate()?;
        if self.subscriptions.contains_key(&subscription.event) {
            return Err(ConfigurationError::DuplicateSubscription(subscription.event).into());
        }
        self.subscriptions
            .insert(subscription.event.clone(), subscription);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Publish a named event.
    ///
    /// Returns the trigger names whose actions ran: the published one first,
    /// then every cascade in the order it happened. Nothing is ever returned
    /// as an error; failures are logged where they occur.
    pub async fn publish(&self, event: &str, ctx: &mut EngineContext<'_>) -> Vec<String> {
        let mut fired = Vec::new();
        let Some(actions) = self.enter(event, ctx.booleans) else {
            return fired;
        };
        fired.push(event.to_string());

        let mut stack = vec![Frame {
            actions: actions.iter(),
            depth: 0,
        }];
        while let Some(frame) = stack.last_mut() {
            let Some(action) = frame.actions.next() else {
                stack.pop();
                continue;
            };
            let depth = frame.depth;

            let cascade = match self.run_action(action, ctx).await {
                Ok(Some(cascade)) => cascade,
                Ok(None) => continue,
                Err(source) => {
                    let err = HubError::ActionFailed {
                        action: action.to_string(),
                        source: Box::new(source),
                    };
                    tracing::warn!(%err, cause = %source_of(&err), event = %event, "action failed");
                    continue;
                }
            };

            if depth >= self.max_cascade_depth {
                let err = HubError::CascadeLimitExceeded {
                    event: cascade,
                    limit: self.max_cascade_depth,
                };
                tracing::error!(%err, event = %event, "skipping cascade");
                continue;
            }
            if let Some(actions) = self.enter(&cascade, ctx.booleans) {
                fired.push(cascade);
                stack.push(Frame {
                    actions: actions.iter(),
                    depth: depth + 1,
                });
            }
        }
        fired
    }

    /// Find the subscription for `event` and check its conditions.
    fn enter(&self, event: &str, booleans: &BooleanStore) -> Option<&[Action]> {
        let Some(subscription) = self.subscriptions.get(event) else {
            tracing::debug!(event, "no subscription");
            return None;
        };
        let at = time::now();
        for condition in &subscription.conditions {
            match condition.evaluate(booleans, at) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(event, %condition, "condition does not hold");
                    return None;
                }
                Err(err) => {
                    tracing::error!(%err, event, %condition, "condition could not be evaluated");
                    return None;
                }
            }
        }
        Some(&subscription.actions)
    }

    /// Execute one action, returning the event it cascades into, if any.
    async fn run_action(
        &self,
        action: &Action,
        ctx: &mut EngineContext<'_>,
    ) -> Result<Option<String>, HubError> {
        tracing::debug!(%action, "running action");
        match action {
            Action::PowerOn { device } => {
                ctx.inbound
                    .receive(InboundEvent::power(device.clone(), PowerKind::On))?;
            }
            Action::PowerOff { device } => {
                ctx.inbound
                    .receive(InboundEvent::power(device.clone(), PowerKind::Off))?;
            }
            Action::PowerToggle { device } => {
                ctx.inbound
                    .receive(InboundEvent::power(device.clone(), PowerKind::Toggle))?;
            }
            Action::Blink { device } => {
                ctx.inbound.receive(InboundEvent::Blink {
                    device: device.clone(),
                })?;
            }
            Action::Ir { device, ir_command } => {
                dispatch::send(
                    ctx.registry,
                    ctx.adapters,
                    device.as_str(),
                    Capability::Infrared,
                    |target| OutboundCommand::Infrared {
                        device: target.adapter_device_id().to_string(),
                        command: ir_command.clone(),
                    },
                )?;
            }
            Action::Playback {
                device,
                playback_action,
            } => {
                dispatch::send(
                    ctx.registry,
                    ctx.adapters,
                    device.as_str(),
                    Capability::Playback,
                    |target| OutboundCommand::Playback {
                        device: target.adapter_device_id().to_string(),
                        action: playback_action.clone(),
                    },
                )?;
            }
            Action::SetBooleanTrue { boolean } => {
                return set_boolean(ctx.booleans, boolean, true);
            }
            Action::SetBooleanFalse { boolean } => {
                return set_boolean(ctx.booleans, boolean, false);
            }
            Action::Sleep { duration_seconds } => {
                tokio::time::sleep(Duration::from_secs(*duration_seconds)).await;
            }
        }
        Ok(None)
    }
}

fn set_boolean(
    booleans: &mut BooleanStore,
    name: &str,
    value: bool,
) -> Result<Option<String>, HubError> {
    let changed = booleans.set(name, value)?;
    Ok(changed.then(|| trigger::boolean_changed(name, value)))
}

fn source_of(err: &HubError) -> String {
    std::error::Error::source(err).map_or_else(String::new, ToString::to_string)
}
