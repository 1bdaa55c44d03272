//! Core control loop and drivers for the Motion-Drive Bot on no-std embedded
//! platforms.
//!
//! The crate fuses a 3-axis motion sensor with a line-oriented remote command
//! link and arbitrates the two into a single motor speed demand. For a
//! runnable host simulation, see the `mock-mcu` application.
#![no_std]

pub mod utils;
