//! HW-153 single-motor driver.
//!
//! The HW-153 (L9110-class) driver stage exposes two inputs: INA, fed from a
//! PWM channel, and INB, driven as a static level. The truth table:
//!
//! | demand | direction | INA (PWM) | INB (pin) |
//! | ------ | --------- | --------- | --------- |
//! | 0      | any       | 0         | low       |
//! | v > 0  | Forward   | duty(v)   | low       |
//! | v > 0  | Backward  | 0         | high      |
//!
//! A zero demand coasts the motor regardless of the requested direction.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::utils::math::speed::DEMAND_MAX;

/// Motor rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Errors from the underlying PWM channel or direction pin.
#[derive(Debug)]
pub enum DriveError<P, D> {
    Pwm(P),
    Pin(D),
}

/// Driver bound to one PWM channel (INA) and one output pin (INB).
pub struct Hw153<PWM, PIN> {
    pwm: PWM,
    pin: PIN,
}

impl<PWM, PIN> Hw153<PWM, PIN>
where
    PWM: SetDutyCycle,
    PIN: OutputPin,
{
    pub fn new(pwm: PWM, pin: PIN) -> Self {
        Self { pwm, pin }
    }

    /// Release the PWM channel and pin.
    pub fn free(self) -> (PWM, PIN) {
        (self.pwm, self.pin)
    }

    /// Convert a percent demand into a duty register value.
    ///
    /// Truncating integer scale over the channel's full range; the demand is
    /// clamped to 100 first so the result never exceeds `max_duty_cycle()`.
    fn duty(&self, demand: u8) -> u16 {
        let demand = demand.min(DEMAND_MAX) as u32;
        let max = self.pwm.max_duty_cycle() as u32;
        (demand * max / 100) as u16
    }

    /// Apply a (demand, direction) pair to the driver stage.
    ///
    /// Pure register writes, idempotent: repeating the same pair produces the
    /// same outputs with no further state change.
    pub fn apply(
        &mut self,
        demand: u8,
        direction: Direction,
    ) -> Result<(), DriveError<PWM::Error, PIN::Error>> {
        if demand == 0 {
            self.pwm.set_duty_cycle(0).map_err(DriveError::Pwm)?;
            self.pin.set_low().map_err(DriveError::Pin)?;
            return Ok(());
        }

        match direction {
            Direction::Forward => {
                let duty = self.duty(demand);
                self.pwm.set_duty_cycle(duty).map_err(DriveError::Pwm)?;
                self.pin.set_low().map_err(DriveError::Pin)?;
            }
            Direction::Backward => {
                // INB has no PWM behind it, so reverse is a static level.
                self.pwm.set_duty_cycle(0).map_err(DriveError::Pwm)?;
                self.pin.set_high().map_err(DriveError::Pin)?;
            }
        }
        Ok(())
    }
}
