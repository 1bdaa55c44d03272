//! Remote command link: byte handoff and line parsing.
//!
//! Reception is split across two contexts. The interrupt (or reader-thread)
//! side pushes raw bytes into `RX_CHANNEL` via [`rx_byte`] and never touches
//! control state. The control cycle drains the channel through a
//! [`LineParser`], which reassembles terminated lines and parses the command
//! grammar:
//!
//! - `MOTOR_SET:<digits>`: set manual speed, clamped to 0..=100
//! - `AUTO`: return to sensor-driven control
//! - `STATUS`: request a status report
//! - `ESP32_*`: echoed back verbatim
//!
//! Anything else parses as `Command::Malformed` and is dropped without a
//! reply; the peer receives no NACK.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};

/// Line buffer capacity in bytes. Lines longer than this are discarded.
pub const LINE_CAP: usize = 64;

/// Channel carrying raw received bytes from interrupt context to the control
/// cycle. Capacity covers one full line plus slack at the 0.5–1 s cadence.
pub static RX_CHANNEL: Channel<CriticalSectionRawMutex, u8, LINE_CAP> = Channel::new();

/// Hand one received byte to the control cycle.
///
/// Safe to call from interrupt context: non-blocking, and bytes that arrive
/// while the channel is full are dropped rather than waited on.
pub fn rx_byte(byte: u8) {
    let _ = RX_CHANNEL.try_send(byte);
}

/// One parsed command from the remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the manual speed demand in percent. Zero is a force stop.
    SetSpeed(u8),
    /// Return control to the motion sensor.
    SetAuto,
    /// Request a status line.
    QueryStatus,
    /// Peer self-test message, echoed back verbatim.
    Echo(String<LINE_CAP>),
    /// Unrecognized or unparseable line; dropped silently.
    Malformed,
}

/// Accumulates bytes into lines and parses them.
#[derive(Default)]
pub struct LineParser {
    buf: Vec<u8, LINE_CAP>,
    overflowed: bool,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns a command when a terminator completes a
    /// non-empty line.
    ///
    /// An overflowing line is discarded in full: the parser drops every byte
    /// up to and including the next terminator, so no fragment of an overlong
    /// line can concatenate into the following one or parse as a command of
    /// its own.
    pub fn feed(&mut self, byte: u8) -> Option<Command> {
        if byte == b'\n' || byte == b'\r' {
            if self.overflowed {
                self.overflowed = false;
                return None;
            }
            if self.buf.is_empty() {
                return None;
            }
            let command = parse_line(&self.buf);
            self.buf.clear();
            return Some(command);
        }

        if self.overflowed {
            return None;
        }
        if self.buf.push(byte).is_err() {
            tracing::debug!("command line overflow, discarding until terminator");
            self.buf.clear();
            self.overflowed = true;
        }
        None
    }
}

/// Parse one complete line. Prefixes are matched in priority order.
fn parse_line(line: &[u8]) -> Command {
    let Ok(line) = core::str::from_utf8(line) else {
        return Command::Malformed;
    };

    if let Some(rest) = line.strip_prefix("MOTOR_SET:") {
        return match rest.parse::<u32>() {
            Ok(value) => Command::SetSpeed(value.min(100) as u8),
            // The grammar says digits; anything else must not move the motor.
            Err(_) => Command::Malformed,
        };
    }
    if line == "AUTO" {
        return Command::SetAuto;
    }
    if line == "STATUS" {
        return Command::QueryStatus;
    }
    if line.starts_with("ESP32_") {
        let mut echo = String::new();
        // Line length is bounded by the buffer, so this cannot fail.
        let _ = echo.push_str(line);
        return Command::Echo(echo);
    }
    Command::Malformed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut LineParser, bytes: &[u8]) -> heapless::Vec<Command, 8> {
        let mut out = heapless::Vec::new();
        for &b in bytes {
            if let Some(cmd) = parser.feed(b) {
                out.push(cmd).unwrap();
            }
        }
        out
    }

    #[test]
    fn set_speed_round_trip_byte_at_a_time() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"MOTOR_SET:42\n");
        assert_eq!(commands.as_slice(), &[Command::SetSpeed(42)]);
    }

    #[test]
    fn accepts_carriage_return_terminator() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"AUTO\r");
        assert_eq!(commands.as_slice(), &[Command::SetAuto]);
    }

    #[test]
    fn crlf_does_not_emit_twice() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"STATUS\r\n");
        assert_eq!(commands.as_slice(), &[Command::QueryStatus]);
    }

    #[test]
    fn value_is_clamped_to_100() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"MOTOR_SET:250\n");
        assert_eq!(commands.as_slice(), &[Command::SetSpeed(100)]);
    }

    #[test]
    fn zero_parses_as_set_speed_zero() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"MOTOR_SET:0\n");
        assert_eq!(commands.as_slice(), &[Command::SetSpeed(0)]);
    }

    #[test]
    fn non_numeric_speed_is_malformed() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"MOTOR_SET:fast\n");
        assert_eq!(commands.as_slice(), &[Command::Malformed]);
    }

    #[test]
    fn esp32_prefix_is_echoed() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"ESP32_PING\n");
        let mut expected = String::new();
        expected.push_str("ESP32_PING").unwrap();
        assert_eq!(commands.as_slice(), &[Command::Echo(expected)]);
    }

    #[test]
    fn garbage_is_malformed() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"garbage\n");
        assert_eq!(commands.as_slice(), &[Command::Malformed]);
    }

    #[test]
    fn grammar_is_case_sensitive() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"auto\n");
        assert_eq!(commands.as_slice(), &[Command::Malformed]);
    }

    #[test]
    fn empty_lines_produce_nothing() {
        let mut parser = LineParser::new();
        assert!(feed_all(&mut parser, b"\n\r\n").is_empty());
    }

    #[test]
    fn overflowed_line_is_discarded_in_full() {
        let mut parser = LineParser::new();
        // Two buffers' worth of noise; its terminator resynchronizes the
        // parser without emitting anything.
        let mut commands = feed_all(&mut parser, &[b'A'; LINE_CAP * 2]);
        assert!(commands.is_empty());
        commands = feed_all(&mut parser, b"\nMOTOR_SET:42\n");
        assert_eq!(commands.as_slice(), &[Command::SetSpeed(42)]);
    }

    #[test]
    fn unaligned_overflow_tail_never_parses_as_command() {
        let mut parser = LineParser::new();
        // One byte past capacity. Everything up to the next terminator is
        // still the same overlong line; no fragment of it may parse, least
        // of all one that looks like a force stop.
        let mut commands = feed_all(&mut parser, &[b'A'; LINE_CAP + 1]);
        assert!(commands.is_empty());
        commands = feed_all(&mut parser, b"MOTOR_SET:0\n");
        assert!(commands.is_empty());
        // The terminator above resynchronized the parser.
        commands = feed_all(&mut parser, b"MOTOR_SET:42\n");
        assert_eq!(commands.as_slice(), &[Command::SetSpeed(42)]);
    }

    #[test]
    fn parser_recovers_after_malformed_line() {
        let mut parser = LineParser::new();
        let commands = feed_all(&mut parser, b"bogus\nMOTOR_SET:7\n");
        assert_eq!(
            commands.as_slice(),
            &[Command::Malformed, Command::SetSpeed(7)]
        );
    }
}
