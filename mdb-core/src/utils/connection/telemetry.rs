//! Telemetry and acknowledgement output to the remote peer.
//!
//! Two independent message classes share one transport: immediate replies
//! (command acks, status responses, echoes) and a rate-limited periodic
//! motion line. All output is machine-parseable ASCII, one message per line.
//! Writes are best-effort; a failed write is logged and never faults the
//! control cycle.

use core::fmt::Write as _;

use embedded_io::Write;
use heapless::String;

use crate::utils::controllers::arbiter::{ArbiterStatus, DriveMode};
use crate::utils::controllers::imu::MotionSample;

/// Default periodic divisor: one motion line every N cycles.
pub const DEFAULT_EVERY: u32 = 3;

/// Formats and emits status lines over a byte transport.
pub struct TelemetryEmitter<TX> {
    tx: TX,
    every: u32,
}

impl<TX> TelemetryEmitter<TX>
where
    TX: Write,
{
    /// Create an emitter with the given periodic divisor (defaults to
    /// [`DEFAULT_EVERY`] when `None` or zero).
    pub fn new(tx: TX, every: Option<u32>) -> Self {
        let every = match every {
            Some(0) | None => DEFAULT_EVERY,
            Some(n) => n,
        };
        Self { tx, every }
    }

    /// Acknowledge an accepted `MOTOR_SET` command.
    pub fn ack_set_speed(&mut self, value: u8) {
        let mut line: String<32> = String::new();
        let _ = write!(line, "ACK:MOTOR_SET:{}\n", value);
        self.send(line.as_bytes());
    }

    /// Acknowledge an accepted `AUTO` command.
    pub fn ack_auto(&mut self) {
        self.send(b"ACK:AUTO\n");
    }

    /// Echo a peer self-test line back verbatim.
    pub fn echo(&mut self, raw: &str) {
        let mut line: String<80> = String::new();
        let _ = write!(line, "ECHO:{}\n", raw);
        self.send(line.as_bytes());
    }

    /// Immediate reply to a `STATUS` query.
    ///
    /// Mode flags are encoded as the pair (Manual, ForceStop), so Autonomous
    /// reads as `Manual=0,ForceStop=0`.
    pub fn status(&mut self, status: &ArbiterStatus) {
        let manual = (status.mode == DriveMode::Manual) as u8;
        let force_stop = (status.mode == DriveMode::ForceStop) as u8;
        let mut line: String<96> = String::new();
        let _ = write!(
            line,
            "STATUS:Manual={},ForceStop={},ManualSpeed={},AutoSpeed={},FinalSpeed={}\n",
            manual, force_stop, status.manual_demand, status.auto_demand, status.final_demand
        );
        self.send(line.as_bytes());
    }

    /// Rate-limited motion line; emits on every `every`-th cycle.
    pub fn periodic(&mut self, cycle: u32, final_demand: u8, sample: &MotionSample) {
        if cycle % self.every != 0 {
            return;
        }
        let mut line: String<96> = String::new();
        let _ = write!(
            line,
            "MOTOR:{},X:{:.1},Y:{:.1},Z:{:.1}\n",
            final_demand, sample.x, sample.y, sample.z
        );
        self.send(line.as_bytes());
    }

    fn send(&mut self, bytes: &[u8]) {
        if let Err(e) = self.tx.write_all(bytes) {
            tracing::warn!("telemetry write failed: {:?}", e);
        }
    }
}
