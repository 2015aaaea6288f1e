use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use upsprims::export::{InfluxConfig, InfluxExporter};
use upsprims::protocol::ControlCommand;
use upsprims::session::{Poller, Registry};
use upsprims::transport::{Endpoint, DEFAULT_PORT};

use crate::config::{Device, DeviceFile, DEFAULT_SCAN_INTERVAL_SECS};
use crate::exit::{command_error, config_error, export_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_command, OutputFormat};

pub mod control;
pub mod poll;
pub mod probe;
pub mod send;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one poll cycle per device and print the merged status.
    Poll(PollArgs),
    /// Poll continuously, optionally exporting to InfluxDB.
    Watch(WatchArgs),
    /// Check whether the adapter accepts TCP connections.
    Probe(ProbeArgs),
    /// Send a free-form command and print the raw reply.
    Send(SendArgs),
    /// Send a control action (beeper, battery test, shutdown).
    Control(ControlArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Poll(args) => poll::run(args, format),
        Command::Watch(args) => watch::run(args, format),
        Command::Probe(args) => probe::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Control(args) => control::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Adapter host (10.0.0.5, 10.0.0.5:2001, tcp://adapter.lan:4001).
    #[arg(long, env = "UPSPRIMS_HOST")]
    pub host: Option<String>,
    /// Adapter TCP port, unless the host carries one.
    #[arg(long, env = "UPSPRIMS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Per-read timeout for --host (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// TOML device file, used when --host is not given.
    #[arg(long, value_name = "FILE", env = "UPSPRIMS_CONFIG")]
    pub config: Option<PathBuf>,
    /// Device id from the config file.
    #[arg(long, value_name = "KEY")]
    pub device: Option<String>,
}

/// Devices a command operates on.
pub struct Targets {
    pub devices: Vec<Device>,
    pub influx: Option<InfluxConfig>,
    /// Device key, only meaningful for config-file targets.
    pub key: Option<String>,
}

impl TargetArgs {
    pub fn resolve(&self) -> CliResult<Targets> {
        if let Some(host) = &self.host {
            let endpoint = Endpoint::parse(host, self.port)
                .map_err(|err| transport_error("invalid --host", &err))?;
            let device = Device {
                id: endpoint.to_string(),
                endpoint,
                timeout: parse_duration(&self.timeout)?,
                scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            };
            return Ok(Targets {
                devices: vec![device],
                influx: None,
                key: None,
            });
        }

        let Some(path) = &self.config else {
            return Err(CliError::usage("either --host or --config is required"));
        };
        let file = DeviceFile::load(path).map_err(|err| config_error(&err))?;
        let devices = file.resolve().map_err(|err| config_error(&err))?;
        Ok(Targets {
            devices,
            influx: file.influx,
            key: self.device.clone(),
        })
    }
}

impl Targets {
    /// The keyed device, or every device when no key was given.
    pub fn selected(&self) -> CliResult<Vec<Device>> {
        match &self.key {
            None => Ok(self.devices.clone()),
            Some(key) => self
                .devices
                .iter()
                .find(|d| &d.id == key)
                .map(|d| vec![d.clone()])
                .ok_or_else(|| CliError::usage(format!("unknown device {key:?}"))),
        }
    }
}

#[derive(Args, Debug)]
pub struct PollArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Also push the result to the [influx] section of the config file.
    #[arg(long)]
    pub export: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Override every device's scan interval (e.g. 15s, 500ms).
    #[arg(long)]
    pub interval: Option<String>,
    /// Stop after N cycles per device.
    #[arg(long)]
    pub count: Option<u64>,
    /// Do not push to InfluxDB even when configured.
    #[arg(long)]
    pub no_export: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Command text, sent without terminator (e.g. QPI).
    pub command: String,
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ControlAction {
    /// Toggle the beeper (Q).
    Beeper,
    /// Battery test (T, T<NN> with --minutes, TL with --until-low).
    Test,
    /// Cancel a battery test (CT).
    CancelTest,
    /// Shut down after --delay minutes, restart after --restart (S<DDDD>R<RRRR>).
    Shutdown,
    /// Cancel a pending shutdown (C).
    CancelShutdown,
}

#[derive(Args, Debug)]
pub struct ControlArgs {
    pub action: ControlAction,
    /// Battery test duration in minutes (1-99).
    #[arg(long, conflicts_with = "until_low")]
    pub minutes: Option<u32>,
    /// Run the battery test until the battery is low.
    #[arg(long)]
    pub until_low: bool,
    /// Shutdown delay in minutes (0-9999).
    #[arg(long)]
    pub delay: Option<u32>,
    /// Restart this many minutes after shutdown (0-9999).
    #[arg(long)]
    pub restart: Option<u32>,
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Route a validated command to the targeted device and print the reply.
pub fn dispatch(target: &TargetArgs, command: &ControlCommand, format: OutputFormat) -> CliResult<i32> {
    let targets = target.resolve()?;

    let mut registry = Registry::new();
    for device in &targets.devices {
        registry
            .insert(device.id.clone(), Poller::from_config(device.session_config()))
            .map_err(|err| command_error("registry", &err.into()))?;
    }

    let key = targets.key.as_deref();
    let response = registry
        .send_command(key, command)
        .map_err(|err| command_error(command.name(), &err))?;

    let device = match key {
        Some(key) => key.to_string(),
        None => registry
            .iter()
            .next()
            .map(|(id, _)| id.to_string())
            .unwrap_or_default(),
    };
    print_command(&device, &command.encode(), &response, format);
    Ok(SUCCESS)
}

/// Exporter whose points carry the device's adapter host as `host` tag.
pub fn device_exporter(influx: &InfluxConfig, device: &Device) -> CliResult<InfluxExporter> {
    InfluxExporter::new(influx.clone())
        .map(|exporter| exporter.with_host_tag(device.endpoint.host()))
        .map_err(|err| export_error("influx", &err))
}

/// Parse `5s`, `150ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration: {input}")))?;
    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
