//! Identity, ratings, mode and firmware parsers for both dialects.

use crate::error::{ParseError, Result};
use crate::record::{UpsMode, UpsRecord};
use crate::token::{is_number, parse_float, parse_int, strip_wrapping};

/// Company reported for devices that answer `QMD`.
pub const CENTURION_VENDOR: &str = "PowerShield";

/// Parse a Megatec `I` identity frame: `#COMPANY MODEL FIRMWARE...`.
///
/// A frame opening with `(` or whose first field is numeric is a status
/// reply that arrived late, not identity data.
pub fn parse_i(raw: &str) -> Result<UpsRecord> {
    const I: &str = "I";

    let trimmed = raw.trim();
    if trimmed.starts_with('(') {
        return Err(shape(I, raw));
    }

    let payload = trimmed.trim_start_matches('#').trim();
    let parts: Vec<&str> = payload.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(shape(I, raw)),
        [first, ..] if is_number(first) => Err(shape(I, raw)),
        [_] | [_, _] => Ok(UpsRecord {
            company: Some(String::new()),
            model: Some(payload.to_string()),
            firmware: Some(String::new()),
            ..UpsRecord::default()
        }),
        [company, model, firmware @ ..] => Ok(UpsRecord {
            company: Some(company.to_string()),
            model: Some(model.to_string()),
            firmware: Some(firmware.join(" ")),
            ..UpsRecord::default()
        }),
    }
}

/// Parse a Centurion `QMD` model frame.
///
/// Only the model, rated VA/W and power factor are kept. Unparsable
/// ratings are left empty rather than failing the frame.
pub fn parse_qmd(raw: &str) -> Result<UpsRecord> {
    const QMD: &str = "QMD";

    let parts: Vec<&str> = strip_wrapping(raw).split_whitespace().collect();
    if parts.len() < 8 {
        return Err(ParseError::FieldCount {
            query: QMD,
            expected: "at least 8",
            found: parts.len(),
            raw: raw.to_string(),
        });
    }

    let model = parts[0].replace('#', "");
    let rated_watts = parse_int(QMD, "rated_watts", parts[1]).ok();
    let power_factor = parse_int(QMD, "output_power_factor_percent", parts[2]).ok();

    Ok(UpsRecord {
        company: Some(CENTURION_VENDOR.to_string()),
        model: Some(model),
        rated_watts,
        output_power_factor_percent: power_factor,
        ..UpsRecord::default()
    })
}

/// Parse a Megatec `F` ratings frame: `#VVV.V CCC VV.VV FF.F`.
pub fn parse_f(raw: &str) -> Result<UpsRecord> {
    let payload = strip_wrapping(raw).trim_start_matches('#');
    parse_ratings("F", raw, payload)
}

/// Parse a Centurion `QRI` ratings frame. Same layout as `F`.
pub fn parse_qri(raw: &str) -> Result<UpsRecord> {
    parse_ratings("QRI", raw, strip_wrapping(raw))
}

fn parse_ratings(query: &'static str, raw: &str, payload: &str) -> Result<UpsRecord> {
    let parts: Vec<&str> = payload.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(ParseError::FieldCount {
            query,
            expected: "at least 4",
            found: parts.len(),
            raw: raw.to_string(),
        });
    }

    Ok(UpsRecord {
        rated_voltage: Some(parse_float(query, "rated_voltage", parts[0])?),
        rated_current: Some(parse_float(query, "rated_current", parts[1])?),
        rated_battery_voltage: Some(parse_float(query, "rated_battery_voltage", parts[2])?),
        rated_frequency_hz: Some(parse_float(query, "rated_frequency_hz", parts[3])?),
        ..UpsRecord::default()
    })
}

/// Parse a `QMOD` frame: a single mode code character.
pub fn parse_qmod(raw: &str) -> Result<UpsRecord> {
    let code = strip_wrapping(raw).chars().next();
    let mode = code.and_then(UpsMode::from_code);
    match (code, mode) {
        (Some(code), Some(mode)) => Ok(UpsRecord {
            ups_mode: Some(mode),
            ups_mode_code: Some(code.to_string()),
            ..UpsRecord::default()
        }),
        _ => Err(shape("QMOD", raw)),
    }
}

/// Parse a `QVFW` frame: `VERFW:<firmware>`.
pub fn parse_qvfw(raw: &str) -> Result<UpsRecord> {
    let firmware = strip_wrapping(raw)
        .strip_prefix("VERFW:")
        .ok_or_else(|| shape("QVFW", raw))?;
    Ok(UpsRecord {
        firmware: Some(firmware.trim().to_string()),
        ..UpsRecord::default()
    })
}

fn shape(query: &'static str, raw: &str) -> ParseError {
    ParseError::Shape {
        query,
        raw: raw.to_string(),
    }
}
