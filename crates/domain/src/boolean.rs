//! Boolean store: a fixed set of named flags with last-change times.
//!
//! The set of names is decided at construction. Touching any other name is
//! an [`HubError::UnknownBoolean`], never an implicit create.
//!
//! [`BooleanStore::set`] reports whether the value actually changed and only
//! then moves the last-change timestamp. Subscriptions rely on this to fire
//! `boolean:<name>:changes-to-*` cascades exactly once per transition, even
//! when a periodic job re-asserts the same value every tick.

use std::collections::HashMap;

use crate::error::HubError;
use crate::time::{Timestamp, now};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flag {
    value: bool,
    last_change: Timestamp,
}

/// Named booleans with last-change tracking.
#[derive(Debug, Clone, Default)]
pub struct BooleanStore {
    flags: HashMap<String, Flag>,
}

impl BooleanStore {
    /// Create a store where every name starts `false`, changed "now".
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(|name| (name.into(), false)).collect()
    }

    /// Current value of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownBoolean`] if `name` was not declared.
    pub fn get(&self, name: &str) -> Result<bool, HubError> {
        self.flag(name).map(|flag| flag.value)
    }

    /// Write `value`, returning `true` only when it differs from the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownBoolean`] if `name` was not declared.
    pub fn set(&mut self, name: &str, value: bool) -> Result<bool, HubError> {
        self.set_at(name, value, now())
    }

    /// Same as [`set`](Self::set) with an explicit change time.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownBoolean`] if `name` was not declared.
    pub fn set_at(&mut self, name: &str, value: bool, at: Timestamp) -> Result<bool, HubError> {
        let flag = self
            .flags
            .get_mut(name)
            .ok_or_else(|| HubError::UnknownBoolean(name.to_string()))?;
        if flag.value == value {
            return Ok(false);
        }
        flag.value = value;
        flag.last_change = at;
        Ok(true)
    }

    /// When `name` last changed value.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownBoolean`] if `name` was not declared.
    pub fn last_change_time(&self, name: &str) -> Result<Timestamp, HubError> {
        self.flag(name).map(|flag| flag.last_change)
    }

    /// Whether `name` belongs to the declared set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Declared names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    fn flag(&self, name: &str) -> Result<&Flag, HubError> {
        self.flags
            .get(name)
            .ok_or_else(|| HubError::UnknownBoolean(name.to_string()))
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for BooleanStore {
    /// Build a store from `(name, initial value)` pairs, all changed "now".
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let at = now();
        let flags = iter
            .into_iter()
            .map(|(name, value)| {
                (
                    name.into(),
                    Flag {
                        value,
                        last_change: at,
                    },
                )
            })
            .collect();
        Self { flags }
    }
}
