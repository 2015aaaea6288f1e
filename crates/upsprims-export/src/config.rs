use serde::Deserialize;

use crate::error::{ExportError, Result};

/// Measurement name used when none is configured.
pub const DEFAULT_MEASUREMENT: &str = "ups";

/// Connection and tagging settings for the InfluxDB v2 write API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfluxConfig {
    pub url: String,
    pub org: String,
    pub bucket: String,
    pub token: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

fn default_measurement() -> String {
    DEFAULT_MEASUREMENT.to_string()
}

fn default_verify_ssl() -> bool {
    true
}

impl InfluxConfig {
    pub fn new(
        url: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            org: org.into(),
            bucket: bucket.into(),
            token: token.into(),
            measurement: default_measurement(),
            site_id: None,
            unit_id: None,
            verify_ssl: true,
        }
    }

    /// Base URL with a scheme and without a trailing slash.
    ///
    /// `influx.local:8086/` becomes `http://influx.local:8086`.
    pub fn normalize_url(url: &str) -> String {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() || url.contains("://") {
            url.to_string()
        } else {
            format!("http://{url}")
        }
    }

    /// Full write endpoint, without query parameters.
    pub fn write_url(&self) -> String {
        format!("{}/api/v2/write", Self::normalize_url(&self.url))
    }

    /// Measurement name, falling back to the default when blank.
    pub fn measurement(&self) -> &str {
        match self.measurement.trim() {
            "" => DEFAULT_MEASUREMENT,
            name => name,
        }
    }

    /// Check that every connection setting is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("url", &self.url),
            ("org", &self.org),
            ("bucket", &self.bucket),
            ("token", &self.token),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ExportError::MissingSetting(name));
            }
        }
        Ok(())
    }
}
