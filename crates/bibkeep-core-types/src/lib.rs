//! Core types shared across bibkeep facilities
//!
//! This crate provides the canonical field keys and event names used by the
//! logging facility and by every crate that emits lifecycle events.

pub mod schema;
