//! # homehub-domain
//!
//! Pure domain model for the homehub home automation hub.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (configuration, optimistic runtime state, snapshots)
//! - Define **Inbound events** (what integrations report or request)
//! - Define **Outbound commands** (what adapters are asked to do)
//! - Define the **Boolean store** (named flags with last-change times)
//! - Define **Subscriptions** (trigger → condition → action rules)
//! - Define the **configuration document** the hub is built from
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod boolean;
pub mod command;
pub mod config;
pub mod device;
pub mod event;
pub mod location;
