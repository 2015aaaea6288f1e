use upsprims::session::Poller;

use crate::cmd::{device_exporter, PollArgs};
use crate::exit::{export_error, CliError, CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::{print_poll, OutputFormat};

pub fn run(args: PollArgs, format: OutputFormat) -> CliResult<i32> {
    let targets = args.target.resolve()?;
    let devices = targets.selected()?;

    let influx = match (args.export, &targets.influx) {
        (false, _) => None,
        (true, Some(influx)) => Some(influx),
        (true, None) => {
            return Err(CliError::usage(
                "--export needs an [influx] section in the config file",
            ))
        }
    };

    let mut code = SUCCESS;
    for device in devices {
        let exporter = influx
            .map(|influx| device_exporter(influx, &device))
            .transpose()?;
        let poller = Poller::from_config(device.session_config());
        let result = poller.poll_once();
        print_poll(&device.id, &result, format);

        if !result.ups_responding {
            code = HEALTH_CHECK_FAILED;
        }
        if let Some(exporter) = &exporter {
            exporter
                .push(&result)
                .map_err(|err| export_error(&device.id, &err))?;
        }
    }

    Ok(code)
}
