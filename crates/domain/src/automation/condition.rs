//! Condition: a guard that must be true for the subscription to proceed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::boolean::BooleanStore;
use crate::error::HubError;
use crate::time::{Timestamp, is_within};

/// A predicate over the boolean store.
///
/// All conditions of a subscription must hold (logical AND), evaluated in
/// order and stopping at the first one that does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Condition {
    BooleanIsTrue {
        boolean: String,
    },
    BooleanIsFalse {
        boolean: String,
    },
    /// Holds once the boolean has kept its value for at least the duration.
    BooleanNotChangedWithin {
        boolean: String,
        duration_seconds: u64,
    },
}

impl Condition {
    /// Evaluate against `booleans` as of `at`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownBoolean`] if the referenced boolean is not
    /// declared in the store.
    pub fn evaluate(&self, booleans: &BooleanStore, at: Timestamp) -> Result<bool, HubError> {
        match self {
            Self::BooleanIsTrue { boolean } => booleans.get(boolean),
            Self::BooleanIsFalse { boolean } => booleans.get(boolean).map(|value| !value),
            Self::BooleanNotChangedWithin {
                boolean,
                duration_seconds,
            } => {
                let last_change = booleans.last_change_time(boolean)?;
                let window = Duration::from_secs(*duration_seconds);
                Ok(!is_within(last_change, at, window))
            }
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BooleanIsTrue { boolean } => write!(f, "boolean-is-true({boolean})"),
            Self::BooleanIsFalse { boolean } => write!(f, "boolean-is-false({boolean})"),
            Self::BooleanNotChangedWithin {
                boolean,
                duration_seconds,
            } => write!(f, "boolean-not-changed-within({boolean}, {duration_seconds}s)"),
        }
    }
}
