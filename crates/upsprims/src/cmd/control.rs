use upsprims::protocol::ControlCommand;

use crate::cmd::{dispatch, ControlAction, ControlArgs};
use crate::exit::{command_error, CliError, CliResult};
use crate::output::OutputFormat;

pub fn run(args: ControlArgs, format: OutputFormat) -> CliResult<i32> {
    let command = build(&args)?;
    dispatch(&args.target, &command, format)
}

fn build(args: &ControlArgs) -> CliResult<ControlCommand> {
    let test_flags = args.minutes.is_some() || args.until_low;
    let shutdown_flags = args.delay.is_some() || args.restart.is_some();

    if test_flags && !matches!(args.action, ControlAction::Test) {
        return Err(CliError::usage("--minutes/--until-low only apply to `test`"));
    }
    if shutdown_flags && !matches!(args.action, ControlAction::Shutdown) {
        return Err(CliError::usage("--delay/--restart only apply to `shutdown`"));
    }

    let validated = match args.action {
        ControlAction::Beeper => Ok(ControlCommand::toggle_beeper()),
        ControlAction::Test => match (args.minutes, args.until_low) {
            (Some(minutes), _) => ControlCommand::battery_test_minutes(minutes),
            (None, true) => Ok(ControlCommand::battery_test_until_low()),
            (None, false) => Ok(ControlCommand::battery_test()),
        },
        ControlAction::CancelTest => Ok(ControlCommand::cancel_test()),
        ControlAction::Shutdown => {
            let Some(delay) = args.delay else {
                return Err(CliError::usage("shutdown requires --delay"));
            };
            ControlCommand::shutdown(delay, args.restart)
        }
        ControlAction::CancelShutdown => Ok(ControlCommand::cancel_shutdown()),
    };

    validated.map_err(|err| command_error("control", &err.into()))
}

#[cfg(test)]
mod tests {
    use upsprims::transport::DEFAULT_PORT;

    use super::*;
    use crate::cmd::TargetArgs;
    use crate::exit::USAGE;

    fn args(action: ControlAction) -> ControlArgs {
        ControlArgs {
            action,
            minutes: None,
            until_low: false,
            delay: None,
            restart: None,
            target: TargetArgs {
                host: None,
                port: DEFAULT_PORT,
                timeout: "5s".into(),
                config: None,
                device: None,
            },
        }
    }

    fn encoded(args: &ControlArgs) -> String {
        build(args).map(|c| c.encode()).unwrap()
    }

    #[test]
    fn builds_wire_commands() {
        assert_eq!(encoded(&args(ControlAction::Beeper)), "Q");
        assert_eq!(encoded(&args(ControlAction::Test)), "T");
        assert_eq!(encoded(&args(ControlAction::CancelTest)), "CT");
        assert_eq!(encoded(&args(ControlAction::CancelShutdown)), "C");

        let mut test = args(ControlAction::Test);
        test.minutes = Some(5);
        assert_eq!(encoded(&test), "T05");
        test.minutes = None;
        test.until_low = true;
        assert_eq!(encoded(&test), "TL");

        let mut shutdown = args(ControlAction::Shutdown);
        shutdown.delay = Some(5);
        shutdown.restart = Some(10);
        assert_eq!(encoded(&shutdown), "S0005R0010");
    }

    #[test]
    fn rejects_out_of_range_and_misplaced_flags() {
        let mut test = args(ControlAction::Test);
        test.minutes = Some(100);
        assert_eq!(build(&test).unwrap_err().code, USAGE);

        let mut beeper = args(ControlAction::Beeper);
        beeper.delay = Some(1);
        assert_eq!(build(&beeper).unwrap_err().code, USAGE);

        assert_eq!(build(&args(ControlAction::Shutdown)).unwrap_err().code, USAGE);
    }
}
