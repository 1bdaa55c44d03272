//! Speed arbitration between autonomous and manual control.
//!
//! The arbiter owns the drive mode and the competing demands, and decides
//! once per cycle which demand reaches the motor. Precedence is strict:
//! ForceStop over Manual over Autonomous. Mode changes happen only in
//! response to commands, never spontaneously.

use crate::utils::connection::link::Command;
use crate::utils::math::speed::DEMAND_MAX;

/// Who is in control of the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveMode {
    /// Sensor-driven speed (initial mode).
    #[default]
    Autonomous,
    /// Remote peer commanded a fixed speed.
    Manual,
    /// Latched stop; cleared only by a nonzero `SetSpeed` or `SetAuto`.
    ForceStop,
}

/// Read-only view of the arbiter for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterStatus {
    pub mode: DriveMode,
    pub manual_demand: u8,
    pub auto_demand: u8,
    pub final_demand: u8,
}

/// Stateful demand arbiter.
///
/// `final_demand` always equals the value dictated by the current mode; it is
/// recomputed by [`SpeedArbiter::update`] every cycle, not just on mode
/// transitions.
#[derive(Debug, Default)]
pub struct SpeedArbiter {
    mode: DriveMode,
    manual_demand: u8,
    auto_demand: u8,
    final_demand: u8,
}

impl SpeedArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one command to the state machine.
    ///
    /// `SetSpeed(0)` latches ForceStop; `SetSpeed(v > 0)` enters Manual and
    /// clears any prior force-stop; `SetAuto` returns to Autonomous without
    /// clearing the remembered manual demand. `QueryStatus`, `Echo`, and
    /// `Malformed` leave the state untouched.
    pub fn handle(&mut self, command: &Command) {
        match command {
            Command::SetSpeed(0) => {
                self.mode = DriveMode::ForceStop;
                self.manual_demand = 0;
            }
            Command::SetSpeed(v) => {
                self.mode = DriveMode::Manual;
                self.manual_demand = (*v).min(DEMAND_MAX);
            }
            Command::SetAuto => {
                self.mode = DriveMode::Autonomous;
            }
            Command::QueryStatus | Command::Echo(_) | Command::Malformed => {}
        }
    }

    /// Record this cycle's autonomous demand and compute the output demand.
    ///
    /// Clamps at the boundary so no out-of-range upstream value can reach the
    /// duty-cycle computation.
    pub fn update(&mut self, auto_demand: u8) -> u8 {
        self.auto_demand = auto_demand.min(DEMAND_MAX);
        self.final_demand = match self.mode {
            DriveMode::ForceStop => 0,
            DriveMode::Manual => self.manual_demand,
            DriveMode::Autonomous => self.auto_demand,
        };
        self.final_demand
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn status(&self) -> ArbiterStatus {
        ArbiterStatus {
            mode: self.mode,
            manual_demand: self.manual_demand,
            auto_demand: self.auto_demand,
            final_demand: self.final_demand,
        }
    }
}
