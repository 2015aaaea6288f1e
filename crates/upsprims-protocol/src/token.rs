use crate::error::{ParseError, Result};

/// Remove the `(` acknowledgment marker and trailing CR around a payload.
pub(crate) fn strip_wrapping(raw: &str) -> &str {
    let payload = raw.trim();
    let payload = payload.strip_prefix('(').unwrap_or(payload);
    let payload = payload.strip_suffix('\r').unwrap_or(payload);
    payload.trim()
}

/// Adapters sometimes prefix numbers with `#`.
pub(crate) fn strip_noise(token: &str) -> &str {
    token.trim().trim_start_matches('#')
}

pub(crate) fn parse_float(query: &'static str, field: &'static str, token: &str) -> Result<f64> {
    strip_noise(token)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| number_error(query, field, token))
}

/// Integer fields are sent as `000`, `45` or occasionally `45.0`.
pub(crate) fn parse_int(query: &'static str, field: &'static str, token: &str) -> Result<i64> {
    let cleaned = strip_noise(token);
    if let Ok(value) = cleaned.parse::<i64>() {
        return Ok(value);
    }
    parse_float(query, field, token).map(|v| v.trunc() as i64)
}

pub(crate) fn is_number(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}

/// Decode an exact-width string of `0`/`1` characters.
pub(crate) fn parse_bits<const N: usize>(query: &'static str, bits: &str) -> Result<[bool; N]> {
    let raw = bits.as_bytes();
    if raw.len() != N || raw.iter().any(|b| *b != b'0' && *b != b'1') {
        return Err(ParseError::Bitfield {
            query,
            bits: bits.to_string(),
        });
    }
    let mut out = [false; N];
    for (slot, b) in out.iter_mut().zip(raw) {
        *slot = *b == b'1';
    }
    Ok(out)
}

fn number_error(query: &'static str, field: &'static str, token: &str) -> ParseError {
    ParseError::Number {
        query,
        field,
        token: token.to_string(),
    }
}
