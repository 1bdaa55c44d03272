//! Module Exports
//!
//! This file exports the key modules used for the remote command link.
//!
//! # Modules
//! - `link`: byte handoff, line reassembly, and the command grammar.
//! - `telemetry`: acknowledgement and periodic status output.

pub mod link;
pub mod telemetry;
