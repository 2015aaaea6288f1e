use std::fmt::Write;

use upsprims_protocol::{FieldValue, PollResult};

use crate::config::InfluxConfig;

/// Builds one line of InfluxDB line protocol.
#[derive(Debug)]
pub struct LineProtocolBuilder {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
    timestamp: Option<i64>,
}

impl LineProtocolBuilder {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Add a tag. Blank values are skipped; line protocol has no empty tags.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.tags.push((key.into(), value));
        }
        self
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Timestamp in the precision the line will be written with.
    #[must_use]
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> String {
        let mut line = escape(&self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            line.push_str(&escape(value, &[',', '=', ' ']));
        }

        for (i, (key, value)) in self.fields.iter().enumerate() {
            line.push(if i == 0 { ' ' } else { ',' });
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            push_value(&mut line, value);
        }

        if let Some(ts) = self.timestamp {
            let _ = write!(line, " {ts}");
        }
        line
    }
}

fn push_value(line: &mut String, value: &FieldValue) {
    let _ = match value {
        FieldValue::Float(v) => write!(line, "{v}"),
        FieldValue::Integer(v) => write!(line, "{v}i"),
        FieldValue::Boolean(v) => write!(line, "{v}"),
        FieldValue::Text(v) => write!(line, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
    };
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Serialise one poll result as a line of line protocol.
///
/// Tags are `site_id`, `unit_id`, `host` and `protocol_family` when known.
/// Every present record field is written; absent ones are omitted. The
/// availability fields are always written.
pub fn format_poll_result(
    result: &PollResult,
    config: &InfluxConfig,
    host: Option<&str>,
    timestamp: i64,
) -> String {
    let mut builder = LineProtocolBuilder::new(config.measurement());
    for (key, value) in [
        ("site_id", config.site_id.as_deref()),
        ("unit_id", config.unit_id.as_deref()),
        ("host", host),
        ("protocol_family", result.record.protocol_family.map(|d| d.as_str())),
    ] {
        if let Some(value) = value {
            builder = builder.tag(key, value);
        }
    }

    for (key, value) in result.fields() {
        builder = builder.field(key, value);
    }
    builder.timestamp(timestamp).build()
}

#[cfg(test)]
mod tests {
    use upsprims_protocol::{parse_q1, UpsRecord};

    use super::*;

    fn config() -> InfluxConfig {
        let mut config = InfluxConfig::new("influx:8086", "ops", "power", "t");
        config.site_id = Some("dc 1".into());
        config
    }

    #[test]
    fn escaping() {
        let line = LineProtocolBuilder::new("ups,main")
            .tag("site id", "a=b")
            .tag("blank", " ")
            .field("model", FieldValue::Text(r#"PSH "1500" \x"#.into()))
            .field("load", 40i64)
            .build();
        assert_eq!(
            line,
            r#"ups\,main,site\ id=a\=b model="PSH \"1500\" \\x",load=40i"#
        );
    }

    #[test]
    fn live_result_line() {
        let record = parse_q1("(219.7 219.7 219.7 000 50.0 27.3 30.0 01010101").unwrap();
        let result = PollResult::live(record);
        let line = format_poll_result(&result, &config(), Some("10.0.0.5"), 1_700_000_000);

        assert!(line.starts_with("ups,site_id=dc\\ 1,host=10.0.0.5,protocol_family=megatec "));
        assert!(line.contains(" input_voltage=219.7,"));
        assert!(line.contains(",load_percent=0i,"));
        assert!(line.contains(",battery_low=true,"));
        assert!(line.contains(",protocol_family=\"megatec\","));
        assert!(line.contains(",status_summary=\"UPS Failed\""));
        assert!(line.ends_with(" 1700000000"));
        assert!(!line.contains("rated_voltage"));
    }

    #[test]
    fn empty_record_still_reports_availability() {
        let result = PollResult::stale(None::<&UpsRecord>, false);
        let line = format_poll_result(&result, &config(), None, 5);
        assert_eq!(
            line,
            "ups,site_id=dc\\ 1 adapter_connected=false,ups_responding=false,\
             status_summary=\"Adapter Disconnected\" 5"
        );
    }
}
