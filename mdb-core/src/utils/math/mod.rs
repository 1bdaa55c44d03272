//! Math utilities for the Motion-Drive Bot.
//!
//! This module provides the pure speed-mapping law that converts a motion
//! magnitude into a motor demand.

pub mod speed;
