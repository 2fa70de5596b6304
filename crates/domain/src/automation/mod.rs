//! Subscription: trigger → condition → action rules.
//!
//! A [`Subscription`] listens to one named trigger event. When that event is
//! published and every [`Condition`] holds, its [`Action`]s run in order.
//! There is at most one subscription per trigger.

mod action;
mod condition;
pub mod trigger;

pub use action::Action;
pub use condition::Condition;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, HubError};

/// A rule that reacts to a named event by executing actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Trigger event name, e.g. `contact:frontdoor:true`.
    pub event: String,
    #[serde(default, rename = "condition")]
    pub conditions: Vec<Condition>,
    #[serde(default, rename = "action")]
    pub actions: Vec<Action>,
}

impl Subscription {
    /// Create a builder for constructing a [`Subscription`].
    #[must_use]
    pub fn builder() -> SubscriptionBuilder {
        SubscriptionBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Configuration`] when:
    /// - `event` is empty ([`ConfigurationError::EmptyTrigger`])
    /// - `actions` is empty ([`ConfigurationError::NoActions`])
    pub fn validate(&self) -> Result<(), HubError> {
        if self.event.is_empty() {
            return Err(ConfigurationError::EmptyTrigger.into());
        }
        if self.actions.is_empty() {
            return Err(ConfigurationError::NoActions(self.event.clone()).into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Subscription`].
#[derive(Debug, Default)]
pub struct SubscriptionBuilder {
    event: Option<String>,
    conditions: Vec<Condition>,
    actions: Vec<Action>,
}

impl SubscriptionBuilder {
    #[must_use]
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return a [`Subscription`].
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Configuration`] if the trigger or actions are missing.
    pub fn build(self) -> Result<Subscription, HubError> {
        let subscription = Subscription {
            event: self.event.unwrap_or_default(),
            conditions: self.conditions,
            actions: self.actions,
        };
        subscription.validate()?;
        Ok(subscription)
    }
}
