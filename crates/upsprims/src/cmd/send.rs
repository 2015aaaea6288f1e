use upsprims::protocol::ControlCommand;

use crate::cmd::{dispatch, SendArgs};
use crate::exit::{command_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command =
        ControlCommand::raw(&args.command).map_err(|err| command_error("send", &err.into()))?;
    dispatch(&args.target, &command, format)
}
