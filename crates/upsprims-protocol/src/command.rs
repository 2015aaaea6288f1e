//! Operator control commands.
//!
//! Parameters are validated when a command is built, so a
//! [`ControlCommand`] always encodes to a well-formed wire string.

use std::fmt;

use crate::error::CommandValidationError;

const MAX_RAW_LEN: usize = 64;

/// Battery test duration, 1-99 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestMinutes(u8);

impl TestMinutes {
    pub fn new(minutes: u32) -> Result<Self, CommandValidationError> {
        match u8::try_from(minutes) {
            Ok(m) if (1..=99).contains(&m) => Ok(Self(m)),
            _ => Err(CommandValidationError::TestMinutes(minutes)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Shutdown or restart delay, 0-9999 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelayMinutes(u16);

impl DelayMinutes {
    pub fn new(field: &'static str, minutes: u32) -> Result<Self, CommandValidationError> {
        match u16::try_from(minutes) {
            Ok(m) if m <= 9999 => Ok(Self(m)),
            _ => Err(CommandValidationError::Delay { field, minutes }),
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

/// A free-form command: printable ASCII, no line terminators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawCommand(String);

impl RawCommand {
    pub fn new(command: &str) -> Result<Self, CommandValidationError> {
        let command = command.trim();
        let reject = |reason| CommandValidationError::Raw {
            command: command.to_string(),
            reason,
        };
        if command.is_empty() {
            return Err(reject("empty"));
        }
        if command.len() > MAX_RAW_LEN {
            return Err(reject("longer than 64 characters"));
        }
        if !command.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(reject("not printable ASCII"));
        }
        Ok(Self(command.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryTest {
    /// Ten-second self test (`T`).
    Quick,
    /// Timed test (`T<NN>`).
    Minutes(TestMinutes),
    /// Run until the battery reports low (`TL`).
    UntilLow,
}

/// A control action that can be sent through the command channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    ToggleBeeper,
    BatteryTest(BatteryTest),
    CancelTest,
    Shutdown {
        delay: DelayMinutes,
        restart: Option<DelayMinutes>,
    },
    CancelShutdown,
    Raw(RawCommand),
}

impl ControlCommand {
    pub fn toggle_beeper() -> Self {
        ControlCommand::ToggleBeeper
    }

    pub fn battery_test() -> Self {
        ControlCommand::BatteryTest(BatteryTest::Quick)
    }

    pub fn battery_test_minutes(minutes: u32) -> Result<Self, CommandValidationError> {
        let minutes = TestMinutes::new(minutes)?;
        Ok(ControlCommand::BatteryTest(BatteryTest::Minutes(minutes)))
    }

    pub fn battery_test_until_low() -> Self {
        ControlCommand::BatteryTest(BatteryTest::UntilLow)
    }

    pub fn cancel_test() -> Self {
        ControlCommand::CancelTest
    }

    /// Shut down after `delay` minutes, optionally restarting `restart`
    /// minutes after that.
    pub fn shutdown(delay: u32, restart: Option<u32>) -> Result<Self, CommandValidationError> {
        let delay = DelayMinutes::new("delay", delay)?;
        let restart = restart
            .map(|minutes| DelayMinutes::new("restart", minutes))
            .transpose()?;
        Ok(ControlCommand::Shutdown { delay, restart })
    }

    pub fn cancel_shutdown() -> Self {
        ControlCommand::CancelShutdown
    }

    pub fn raw(command: &str) -> Result<Self, CommandValidationError> {
        RawCommand::new(command).map(ControlCommand::Raw)
    }

    /// Wire form, without terminator.
    pub fn encode(&self) -> String {
        match self {
            ControlCommand::ToggleBeeper => "Q".to_string(),
            ControlCommand::BatteryTest(BatteryTest::Quick) => "T".to_string(),
            ControlCommand::BatteryTest(BatteryTest::Minutes(m)) => format!("T{:02}", m.get()),
            ControlCommand::BatteryTest(BatteryTest::UntilLow) => "TL".to_string(),
            ControlCommand::CancelTest => "CT".to_string(),
            ControlCommand::Shutdown { delay, restart } => match restart {
                Some(restart) => format!("S{:04}R{:04}", delay.get(), restart.get()),
                None => format!("S{:04}", delay.get()),
            },
            ControlCommand::CancelShutdown => "C".to_string(),
            ControlCommand::Raw(raw) => raw.as_str().to_string(),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ControlCommand::ToggleBeeper => "toggle_beeper",
            ControlCommand::BatteryTest(_) => "battery_test",
            ControlCommand::CancelTest => "cancel_test",
            ControlCommand::Shutdown { .. } => "shutdown",
            ControlCommand::CancelShutdown => "cancel_shutdown",
            ControlCommand::Raw(_) => "raw",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
