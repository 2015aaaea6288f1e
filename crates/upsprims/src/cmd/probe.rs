use upsprims::session::Exchanger;

use crate::cmd::ProbeArgs;
use crate::exit::{CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_probe, OutputFormat};

pub fn run(args: ProbeArgs, format: OutputFormat) -> CliResult<i32> {
    let targets = args.target.resolve()?;

    let mut code = SUCCESS;
    for device in targets.selected()? {
        let exchanger = Exchanger::new(device.session_config());
        let reachable = exchanger.probe();
        print_probe(&device.id, device.endpoint.to_string(), reachable, format);
        if !reachable {
            code = TRANSPORT_ERROR;
        }
    }
    Ok(code)
}
