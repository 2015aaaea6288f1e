use std::fmt;

use serde::Serialize;

/// Which query dialect the device answered in during one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Megatec,
    Centurion,
    Unknown,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Megatec => "megatec",
            Dialect::Centurion => "centurion",
            Dialect::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dialect::Megatec => "Megatec",
            Dialect::Centurion => "Centurion",
            Dialect::Unknown => "Unknown",
        }
    }
}

/// Power topology reported in the Centurion status bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    Standby,
    LineInteractive,
    Online,
    Unknown,
}

impl Topology {
    /// Map the two topology bits (`b9 b8`).
    pub fn from_bits(high: bool, low: bool) -> Self {
        match (high, low) {
            (false, false) => Topology::Standby,
            (false, true) => Topology::LineInteractive,
            (true, false) => Topology::Online,
            (true, true) => Topology::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Topology::Standby => "standby",
            Topology::LineInteractive => "line_interactive",
            Topology::Online => "online",
            Topology::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Topology::Standby => "Standby",
            Topology::LineInteractive => "Line Interactive",
            Topology::Online => "Online",
            Topology::Unknown => "Unknown",
        }
    }
}

/// Operating mode from `QMOD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsMode {
    PowerOn,
    Standby,
    Bypass,
    Line,
    Battery,
    BatteryTest,
    Fault,
    Eco,
    Converter,
    Shutdown,
}

impl UpsMode {
    /// Look up a `QMOD` mode code.
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'P' => UpsMode::PowerOn,
            'S' => UpsMode::Standby,
            'Y' => UpsMode::Bypass,
            'L' => UpsMode::Line,
            'B' => UpsMode::Battery,
            'T' => UpsMode::BatteryTest,
            'F' => UpsMode::Fault,
            'E' => UpsMode::Eco,
            'C' => UpsMode::Converter,
            'D' => UpsMode::Shutdown,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpsMode::PowerOn => "power_on",
            UpsMode::Standby => "standby",
            UpsMode::Bypass => "bypass",
            UpsMode::Line => "line",
            UpsMode::Battery => "battery",
            UpsMode::BatteryTest => "battery_test",
            UpsMode::Fault => "fault",
            UpsMode::Eco => "eco",
            UpsMode::Converter => "converter",
            UpsMode::Shutdown => "shutdown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UpsMode::PowerOn => "Power On",
            UpsMode::Standby => "Standby",
            UpsMode::Bypass => "Bypass",
            UpsMode::Line => "Line",
            UpsMode::Battery => "Battery",
            UpsMode::BatteryTest => "Battery Test",
            UpsMode::Fault => "Fault",
            UpsMode::Eco => "ECO",
            UpsMode::Converter => "Converter",
            UpsMode::Shutdown => "Shutdown",
        }
    }

    /// Modes in which the load is carried by the battery.
    pub fn is_on_battery(self) -> bool {
        matches!(self, UpsMode::Battery | UpsMode::BatteryTest)
    }
}

/// One-line availability/health summary, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatusSummary {
    #[serde(rename = "Adapter Disconnected")]
    AdapterDisconnected,
    #[serde(rename = "UPS Not Responding")]
    NotResponding,
    #[serde(rename = "UPS Failed")]
    UpsFailed,
    #[serde(rename = "On Battery")]
    OnBattery,
    #[serde(rename = "Battery Low")]
    BatteryLow,
    #[serde(rename = "Overload")]
    Overload,
    #[serde(rename = "Normal")]
    Normal,
}

impl StatusSummary {
    /// Pick the summary for a record by fixed priority.
    pub fn evaluate(adapter_connected: bool, ups_responding: bool, record: &UpsRecord) -> Self {
        if !adapter_connected {
            StatusSummary::AdapterDisconnected
        } else if !ups_responding {
            StatusSummary::NotResponding
        } else if record.ups_failed == Some(true) {
            StatusSummary::UpsFailed
        } else if record.utility_fail == Some(true) {
            StatusSummary::OnBattery
        } else if record.battery_low == Some(true) {
            StatusSummary::BatteryLow
        } else if record.overload_warning == Some(true) {
            StatusSummary::Overload
        } else {
            StatusSummary::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusSummary::AdapterDisconnected => "Adapter Disconnected",
            StatusSummary::NotResponding => "UPS Not Responding",
            StatusSummary::UpsFailed => "UPS Failed",
            StatusSummary::OnBattery => "On Battery",
            StatusSummary::BatteryLow => "Battery Low",
            StatusSummary::Overload => "Overload",
            StatusSummary::Normal => "Normal",
        }
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A typed value of one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Integer(v) => write!(f, "{v}"),
            FieldValue::Boolean(v) => write!(f, "{v}"),
            FieldValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Dialect> for FieldValue {
    fn from(value: Dialect) -> Self {
        FieldValue::Text(value.as_str().to_string())
    }
}

impl From<Topology> for FieldValue {
    fn from(value: Topology) -> Self {
        FieldValue::Text(value.as_str().to_string())
    }
}

impl From<UpsMode> for FieldValue {
    fn from(value: UpsMode) -> Self {
        FieldValue::Text(value.as_str().to_string())
    }
}

macro_rules! ups_record {
    ($( $(#[$doc:meta])* $name:ident: $ty:ty, )*) => {
        /// Fixed-schema UPS field set. Every member is optional: a parser
        /// fills only the fields its query reports.
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct UpsRecord {
            $( $(#[$doc])* pub $name: Option<$ty>, )*
        }

        impl UpsRecord {
            /// Every field name, in declaration order.
            pub const FIELD_NAMES: &'static [&'static str] = &[$(stringify!($name)),*];

            /// Fill fields that are absent here from `other`. Present
            /// fields are never overwritten.
            pub fn merge_missing(&mut self, other: UpsRecord) {
                $( if self.$name.is_none() { self.$name = other.$name; } )*
            }

            /// Present fields as `(name, value)` pairs.
            pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
                let mut out = Vec::new();
                $( if let Some(value) = &self.$name {
                    out.push((stringify!($name), FieldValue::from(value.clone())));
                } )*
                out
            }

            /// True when no field is present.
            pub fn is_empty(&self) -> bool {
                true $( && self.$name.is_none() )*
            }
        }
    };
}

ups_record! {
    input_voltage: f64,
    fault_voltage: f64,
    output_voltage: f64,
    load_percent: i64,
    input_frequency_hz: f64,
    output_frequency_hz: f64,
    output_current_a: f64,
    positive_bus_voltage: f64,
    negative_bus_voltage: f64,
    battery_voltage: f64,
    negative_battery_voltage: f64,
    temperature_c: f64,

    utility_fail: bool,
    battery_low: bool,
    avr_active: bool,
    ups_failed: bool,
    standby_type: bool,
    test_in_progress: bool,
    shutdown_active: bool,
    beeper_on: bool,
    epo_active: bool,
    battery_silence: bool,
    battery_test_fail: bool,
    battery_test_ok: bool,
    ups_topology: Topology,
    protocol_family: Dialect,

    company: String,
    model: String,
    firmware: String,
    rated_watts: i64,
    output_power_factor_percent: i64,

    rated_voltage: f64,
    rated_current: f64,
    rated_battery_voltage: f64,
    rated_frequency_hz: f64,

    ups_mode: UpsMode,
    ups_mode_code: String,

    /// Derived: `ups_mode` is battery/battery_test, or utility failed.
    on_battery: bool,
    /// Derived: load at or above 100 %. Absent without a load reading.
    overload_warning: bool,
    /// Derived: load in watts from rated watts, or rated V x A.
    estimated_load_watts: f64,
}

impl UpsRecord {
    /// Copy `fault_voltage` from a legacy `Q1` snapshot.
    ///
    /// `QGS` does not report fault voltage. This always overwrites.
    pub fn backfill_fault_voltage(&mut self, legacy: &UpsRecord) {
        if let Some(voltage) = legacy.fault_voltage {
            self.fault_voltage = Some(voltage);
        }
    }

    /// Compute the derived fields from the merged measurements.
    pub fn derive(&mut self) {
        let mode_on_battery = self.ups_mode.is_some_and(UpsMode::is_on_battery);
        self.on_battery = Some(mode_on_battery || self.utility_fail == Some(true));
        self.overload_warning = self.load_percent.map(|load| load >= 100);
        self.estimated_load_watts = self.estimate_load_watts();
    }

    fn estimate_load_watts(&self) -> Option<f64> {
        let load = self.load_percent? as f64;
        let watts = match self.rated_watts {
            Some(rated) => rated as f64 * load / 100.0,
            None => self.rated_voltage? * self.rated_current? * load / 100.0,
        };
        Some((watts * 10.0).round() / 10.0)
    }
}

/// The merged outcome of one poll cycle, handed to collaborators as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollResult {
    #[serde(flatten)]
    pub record: UpsRecord,
    pub adapter_connected: bool,
    pub ups_responding: bool,
    pub status_summary: StatusSummary,
}

impl PollResult {
    /// Result of a successful cycle: derive fields and mark the UPS live.
    pub fn live(mut record: UpsRecord) -> Self {
        record.derive();
        let status_summary = StatusSummary::evaluate(true, true, &record);
        Self {
            record,
            adapter_connected: true,
            ups_responding: true,
            status_summary,
        }
    }

    /// Result of a failed cycle: keep the last known readings and only
    /// flip availability.
    pub fn stale(previous: Option<&UpsRecord>, adapter_connected: bool) -> Self {
        let record = previous.cloned().unwrap_or_default();
        let status_summary = StatusSummary::evaluate(adapter_connected, false, &record);
        Self {
            record,
            adapter_connected,
            ups_responding: false,
            status_summary,
        }
    }

    /// All fields, including the three always-present ones.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        let mut out = self.record.fields();
        out.push(("adapter_connected", self.adapter_connected.into()));
        out.push(("ups_responding", self.ups_responding.into()));
        out.push((
            "status_summary",
            FieldValue::Text(self.status_summary.label().to_string()),
        ));
        out
    }
}
