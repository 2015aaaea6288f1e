use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use upsprims::protocol::{FieldValue, PollResult};
use upsprims::session::CommandResponse;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PollOutput<'a> {
    device: &'a str,
    #[serde(flatten)]
    result: &'a PollResult,
}

#[derive(Serialize)]
struct CommandOutput<'a> {
    device: &'a str,
    command: &'a str,
    response: &'a str,
    acknowledged: bool,
}

#[derive(Serialize)]
struct ProbeOutput<'a> {
    device: &'a str,
    endpoint: String,
    reachable: bool,
}

pub fn print_poll(device: &str, result: &PollResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&PollOutput { device, result }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", device]);
            for (name, value) in display_fields(result) {
                table.add_row(vec![name.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line = display_fields(result)
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("device={device} {line}");
        }
        OutputFormat::Raw => println!("{device}\t{}", result.status_summary),
    }
}

pub fn print_command(device: &str, command: &str, response: &CommandResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&CommandOutput {
            device,
            command,
            response: response.as_str(),
            acknowledged: response.is_acknowledged(),
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("device={device} command={command} response={response}");
        }
        OutputFormat::Raw => println!("{response}"),
    }
}

pub fn print_probe(device: &str, endpoint: String, reachable: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ProbeOutput {
            device,
            endpoint,
            reachable,
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            let state = if reachable { "reachable" } else { "unreachable" };
            println!("{device} ({endpoint}): {state}");
        }
        OutputFormat::Raw => println!("{reachable}"),
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Present fields with enumerated values shown by their display label.
fn display_fields(result: &PollResult) -> Vec<(&'static str, String)> {
    let record = &result.record;
    result
        .fields()
        .into_iter()
        .map(|(name, value)| {
            let label = match name {
                "ups_mode" => record.ups_mode.map(|m| m.label()),
                "ups_topology" => record.ups_topology.map(|t| t.label()),
                "protocol_family" => record.protocol_family.map(|d| d.label()),
                "status_summary" => Some(result.status_summary.label()),
                _ => None,
            };
            let shown = match (label, value) {
                (Some(label), _) => label.to_string(),
                (None, FieldValue::Boolean(true)) => "yes".to_string(),
                (None, FieldValue::Boolean(false)) => "no".to_string(),
                (None, other) => other.to_string(),
            };
            (name, shown)
        })
        .collect()
}
