//! Host-side mock MCU for the Motion-Drive Bot.
//!
//! Runs the full control cycle without hardware: a simulated gyroscope feeds
//! the autonomous path, stdin plays the remote command link, the motor and
//! direction pin log their writes, and telemetry goes to stdout. Type
//! `MOTOR_SET:<0-100>`, `AUTO`, or `STATUS` and press enter.

use std::convert::Infallible;
use std::io::{Read, Write as _};

use clap::Parser;
use embassy_executor::{Executor, Spawner};
use mdb_core::utils::connection::link::rx_byte;
use mdb_core::utils::connection::telemetry::TelemetryEmitter;
use mdb_core::utils::controllers::imu::{MotionSample, MotionSense, SensorError};
use mdb_core::utils::controllers::motor::Hw153;
use mdb_core::mk_static;
use mdb_core::utils::{Duration, SpeedLaw, SystemController};
use tracing::info;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Control cycle period in milliseconds
    #[clap(long, default_value_t = 500)]
    period_ms: u64,
    /// Emit a MOTOR telemetry line every N cycles
    #[clap(long, default_value_t = 3)]
    every: u32,
    /// Speed law low threshold (dead band), sensor units
    #[clap(long, default_value_t = 0.5)]
    low: f32,
    /// Speed law high threshold (full speed), sensor units
    #[clap(long, default_value_t = 10.0)]
    high: f32,
    /// Start without a motion sensor (manual commands only)
    #[clap(long)]
    no_sensor: bool,
}

/// Gyroscope stand-in producing the dashboard demo waveforms.
struct SimGyro {
    t: u32,
}

impl SimGyro {
    fn new() -> Self {
        Self { t: 0 }
    }
}

impl MotionSense for SimGyro {
    fn sample(&mut self) -> Result<MotionSample, SensorError> {
        let t = self.t as f32;
        self.t = self.t.wrapping_add(1);
        Ok(MotionSample::from_axes(
            10.0 * (0.1 * t).sin(),
            5.0 * (0.15 * t).cos(),
            8.0 * (0.08 * t).sin(),
        ))
    }
}

/// PWM channel that logs duty writes instead of driving a timer.
struct ConsolePwm;

impl embedded_hal::pwm::ErrorType for ConsolePwm {
    type Error = Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for ConsolePwm {
    fn max_duty_cycle(&self) -> u16 {
        999
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        info!("motor INA duty: {}/999", duty);
        Ok(())
    }
}

/// Direction pin that logs level changes.
struct ConsolePin;

impl embedded_hal::digital::ErrorType for ConsolePin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for ConsolePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        info!("motor INB: low");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        info!("motor INB: high");
        Ok(())
    }
}

/// Telemetry transport writing straight to stdout.
struct StdoutLink;

impl embedded_io::ErrorType for StdoutLink {
    type Error = Infallible;
}

impl embedded_io::Write for StdoutLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(buf);
        let _ = stdout.flush();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

type MockController = SystemController<SimGyro, ConsolePwm, ConsolePin, StdoutLink>;

#[embassy_executor::task]
async fn ctrl_task(mut controller: MockController) -> ! {
    controller.run().await
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();

    let sensor = if opts.no_sensor {
        None
    } else {
        Some(SimGyro::new())
    };

    let controller = SystemController::new(
        sensor,
        Hw153::new(ConsolePwm, ConsolePin),
        TelemetryEmitter::new(StdoutLink, Some(opts.every)),
        Some(SpeedLaw::new(opts.low, opts.high)),
        Some(Duration::from_millis(opts.period_ms)),
    );

    // Stdin plays the byte-per-interrupt remote link.
    std::thread::spawn(|| {
        for byte in std::io::stdin().lock().bytes() {
            match byte {
                Ok(b) => rx_byte(b),
                Err(_) => break,
            }
        }
    });

    info!("mock MCU ready; commands: MOTOR_SET:<0-100>, AUTO, STATUS");
    spawner.spawn(ctrl_task(controller)).unwrap();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = mk_static!(Executor, Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
