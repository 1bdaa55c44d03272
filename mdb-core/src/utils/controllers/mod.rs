//! Module Exports
//!
//! This file exports the components of the motor control cycle.
//!
//! - `imu`: motion sensor drivers (L3GD20, LSM303DLHC).
//! - `motor`: HW-153 actuator driver.
//! - `arbiter`: autonomous/manual/force-stop speed arbitration.

pub mod arbiter;
pub mod imu;
pub mod motor;

use embassy_time::{Duration, Timer};
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::utils::connection::link::{Command, LineParser, RX_CHANNEL};
use crate::utils::connection::telemetry::TelemetryEmitter;
use crate::utils::math::speed::SpeedLaw;
use arbiter::SpeedArbiter;
use imu::{MotionSample, MotionSense};
use motor::{Direction, Hw153};

/// Default control cycle period.
const DEFAULT_PERIOD: Duration = Duration::from_millis(500);

/// Owns every component of the control cycle and runs them in a fixed order:
/// drain one command, sample the sensor, arbitrate, actuate, report.
///
/// A sensor that failed initialization is passed as `None`; the motor then
/// follows manual commands only, with the autonomous demand held at its last
/// known value.
pub struct SystemController<S, PWM, PIN, TX> {
    sensor: Option<S>,
    parser: LineParser,
    arbiter: SpeedArbiter,
    motor: Hw153<PWM, PIN>,
    telemetry: TelemetryEmitter<TX>,
    law: SpeedLaw,
    period: Duration,
    last_sample: MotionSample,
    cycle: u32,
}

impl<S, PWM, PIN, TX> SystemController<S, PWM, PIN, TX>
where
    S: MotionSense,
    PWM: SetDutyCycle,
    PIN: OutputPin,
    TX: embedded_io::Write,
{
    pub fn new(
        sensor: Option<S>,
        motor: Hw153<PWM, PIN>,
        telemetry: TelemetryEmitter<TX>,
        law: Option<SpeedLaw>,
        period: Option<Duration>,
    ) -> Self {
        if sensor.is_none() {
            tracing::warn!("no motion sensor, autonomous control unavailable");
        }
        Self {
            sensor,
            parser: LineParser::new(),
            arbiter: SpeedArbiter::new(),
            motor,
            telemetry,
            law: law.unwrap_or_default(),
            period: period.unwrap_or(DEFAULT_PERIOD),
            last_sample: MotionSample::default(),
            cycle: 0,
        }
    }

    /// Run the control loop at the configured cadence.
    pub async fn run(&mut self) -> ! {
        loop {
            self.tick();
            Timer::after(self.period).await;
        }
    }

    /// Execute one control cycle.
    pub fn tick(&mut self) {
        let mut status_requested = false;

        if let Some(command) = self.drain_command() {
            tracing::debug!("command: {:?}", command);
            match &command {
                Command::SetSpeed(v) => {
                    self.arbiter.handle(&command);
                    self.telemetry.ack_set_speed(*v);
                }
                Command::SetAuto => {
                    self.arbiter.handle(&command);
                    self.telemetry.ack_auto();
                }
                // Deferred until this cycle's demands are computed.
                Command::QueryStatus => status_requested = true,
                Command::Echo(raw) => self.telemetry.echo(raw),
                Command::Malformed => {}
            }
        }

        if let Some(sensor) = self.sensor.as_mut() {
            match sensor.sample() {
                Ok(sample) => self.last_sample = sample,
                // Keep the previous vector; the demand degrades to
                // last-known-good instead of faulting the motor.
                Err(e) => tracing::warn!("sensor sample failed: {:?}", e),
            }
        }

        let auto_demand = self.law.demand(self.last_sample.magnitude);
        let final_demand = self.arbiter.update(auto_demand);

        if let Err(e) = self.motor.apply(final_demand, Direction::Forward) {
            tracing::error!("motor apply failed: {:?}", e);
        }

        if status_requested {
            self.telemetry.status(&self.arbiter.status());
        }
        self.telemetry
            .periodic(self.cycle, final_demand, &self.last_sample);

        self.cycle = self.cycle.wrapping_add(1);
    }

    /// Pull buffered bytes through the line parser until one command
    /// completes or the channel is empty. At most one command per cycle
    /// keeps command application and actuation strictly ordered.
    fn drain_command(&mut self) -> Option<Command> {
        while let Ok(byte) = RX_CHANNEL.try_receive() {
            if let Some(command) = self.parser.feed(byte) {
                return Some(command);
            }
        }
        None
    }

    /// Current arbiter state, for diagnostics.
    pub fn status(&self) -> arbiter::ArbiterStatus {
        self.arbiter.status()
    }

    /// Most recent good motion sample.
    pub fn last_sample(&self) -> MotionSample {
        self.last_sample
    }
}
