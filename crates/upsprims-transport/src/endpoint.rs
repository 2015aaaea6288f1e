use std::fmt;

use crate::error::{Result, TransportError};

/// Port most TCP-to-serial adapters expose their first serial line on.
pub const DEFAULT_PORT: u16 = 2001;

/// A normalised UPS adapter address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint from an already clean host name.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Normalise user-entered host text into an endpoint.
    ///
    /// Accepts plain hosts (`10.0.0.5`), `host:port`, bracketed IPv6
    /// (`[fe80::1]:2001`) and URLs (`tcp://adapter.lan:4001/`). A port found
    /// in the input overrides `default_port`.
    pub fn parse(input: &str, default_port: u16) -> Result<Self> {
        let mut rest = input.trim();

        if let Some((_, after_scheme)) = rest.split_once("://") {
            rest = after_scheme
                .split(['/', '?', '#'])
                .next()
                .unwrap_or_default();
            if let Some((_, authority)) = rest.rsplit_once('@') {
                rest = authority;
            }
        }

        let (host, port) = if let Some(inner) = rest.strip_prefix('[') {
            let (host, tail) = inner
                .split_once(']')
                .ok_or_else(|| TransportError::InvalidHost(input.to_string()))?;
            let port = match tail.strip_prefix(':') {
                Some(digits) => Some(parse_port(digits, input)?),
                None if tail.is_empty() => None,
                None => return Err(TransportError::InvalidHost(input.to_string())),
            };
            (host, port)
        } else if rest.matches(':').count() == 1 {
            match rest.rsplit_once(':') {
                Some((host, digits))
                    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    (host, Some(parse_port(digits, input)?))
                }
                _ => (rest, None),
            }
        } else {
            (rest, None)
        };

        let host = host.trim();
        if host.is_empty() {
            return Err(TransportError::InvalidHost(input.to_string()));
        }

        Ok(Self::new(host, port.unwrap_or(default_port)))
    }

    /// Host name or address, without brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

fn parse_port(digits: &str, input: &str) -> Result<u16> {
    digits
        .parse::<u16>()
        .map_err(|_| TransportError::InvalidHost(input.to_string()))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
