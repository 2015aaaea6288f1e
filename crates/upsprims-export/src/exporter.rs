use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use upsprims_protocol::PollResult;

use crate::config::InfluxConfig;
use crate::error::{ExportError, Result};
use crate::line::format_poll_result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pushes poll results to an InfluxDB v2 bucket (blocking).
///
/// Must not be created or dropped from inside an async runtime.
#[derive(Debug)]
pub struct InfluxExporter {
    config: InfluxConfig,
    host: Option<String>,
    client: Client,
}

impl InfluxExporter {
    pub fn new(config: InfluxConfig) -> Result<Self> {
        config.validate()?;
        if !config.verify_ssl {
            warn!(url = %config.url, "TLS certificate verification disabled for influx export");
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;
        Ok(Self {
            config,
            host: None,
            client,
        })
    }

    /// Tag every point with the UPS adapter host.
    #[must_use]
    pub fn with_host_tag(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn config(&self) -> &InfluxConfig {
        &self.config
    }

    pub fn host_tag(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Format `result` with the current time and write it.
    pub fn push(&self, result: &PollResult) -> Result<()> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        let line = format_poll_result(result, &self.config, self.host.as_deref(), now);
        self.push_line(&line)
    }

    /// Write one pre-formatted line with second precision.
    pub fn push_line(&self, line: &str) -> Result<()> {
        let response = self
            .client
            .post(self.config.write_url())
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "s"),
            ])
            .bearer_auth(&self.config.token)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line.to_string())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        debug!(bytes = line.len(), bucket = %self.config.bucket, "influx point written");
        Ok(())
    }
}
