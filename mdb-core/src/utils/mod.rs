//! Utility re-exports and helper macros for the Motion-Drive Bot.
//!
//! This module re-exports the control cycle, timing, speed mapping, and
//! command link components:
//!
//! - `connection`: serial command link parsing and telemetry output
//! - `controllers`: sensor, motor, and arbitration components
//! - `math`: the magnitude-to-demand speed law
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod connection;
pub mod controllers;
pub mod math;

pub use connection::link::{rx_byte, Command, RX_CHANNEL};
pub use controllers::SystemController;
pub use embassy_time::*;
pub use math::speed::SpeedLaw;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
