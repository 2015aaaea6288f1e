//! Status snapshot parsers: Megatec `Q1` and Centurion `QGS`.

use crate::error::{ParseError, Result};
use crate::record::{Dialect, Topology, UpsRecord};
use crate::token::{parse_bits, parse_float, parse_int, strip_wrapping};

const Q1: &str = "Q1";
const QGS: &str = "QGS";

/// Parse a Megatec `Q1` status frame.
///
/// ```text
/// (MMM.M NNN.N PPP.P QQQ RR.R S.SS TT.T b7b6b5b4b3b2b1b0
/// ```
///
/// Seven numeric fields then an 8-bit status word: utility fail, battery
/// low, AVR active, UPS failed, standby type, test in progress, shutdown
/// active, beeper on.
pub fn parse_q1(raw: &str) -> Result<UpsRecord> {
    let parts: Vec<&str> = strip_wrapping(raw).split_whitespace().collect();
    if parts.len() != 8 {
        return Err(ParseError::FieldCount {
            query: Q1,
            expected: "exactly 8",
            found: parts.len(),
            raw: raw.to_string(),
        });
    }

    let [utility_fail, battery_low, avr_active, ups_failed, standby_type, test_in_progress, shutdown_active, beeper_on] =
        parse_bits::<8>(Q1, parts[7])?;

    Ok(UpsRecord {
        input_voltage: Some(parse_float(Q1, "input_voltage", parts[0])?),
        fault_voltage: Some(parse_float(Q1, "fault_voltage", parts[1])?),
        output_voltage: Some(parse_float(Q1, "output_voltage", parts[2])?),
        load_percent: Some(parse_int(Q1, "load_percent", parts[3])?),
        input_frequency_hz: Some(parse_float(Q1, "input_frequency_hz", parts[4])?),
        battery_voltage: Some(parse_float(Q1, "battery_voltage", parts[5])?),
        temperature_c: Some(parse_float(Q1, "temperature_c", parts[6])?),
        utility_fail: Some(utility_fail),
        battery_low: Some(battery_low),
        avr_active: Some(avr_active),
        ups_failed: Some(ups_failed),
        standby_type: Some(standby_type),
        test_in_progress: Some(test_in_progress),
        shutdown_active: Some(shutdown_active),
        beeper_on: Some(beeper_on),
        protocol_family: Some(Dialect::Megatec),
        ..UpsRecord::default()
    })
}

/// Parse a Centurion `QGS` status frame.
///
/// Eleven numeric fields then a 12-bit word: two topology bits, eight
/// status bits (utility fail, battery low, AVR active, UPS failed, EPO
/// active, test in progress, shutdown active, battery silence) and two
/// battery-test result bits (fail, ok).
pub fn parse_qgs(raw: &str) -> Result<UpsRecord> {
    let parts: Vec<&str> = strip_wrapping(raw).split_whitespace().collect();
    if parts.len() < 12 {
        return Err(ParseError::FieldCount {
            query: QGS,
            expected: "at least 12",
            found: parts.len(),
            raw: raw.to_string(),
        });
    }

    let [b9, b8, utility_fail, battery_low, avr_active, ups_failed, epo_active, test_in_progress, shutdown_active, battery_silence, test_fail, test_ok] =
        parse_bits::<12>(QGS, parts[11])?;

    Ok(UpsRecord {
        input_voltage: Some(parse_float(QGS, "input_voltage", parts[0])?),
        input_frequency_hz: Some(parse_float(QGS, "input_frequency_hz", parts[1])?),
        output_voltage: Some(parse_float(QGS, "output_voltage", parts[2])?),
        output_frequency_hz: Some(parse_float(QGS, "output_frequency_hz", parts[3])?),
        output_current_a: Some(parse_float(QGS, "output_current_a", parts[4])?),
        load_percent: Some(parse_int(QGS, "load_percent", parts[5])?),
        positive_bus_voltage: Some(parse_float(QGS, "positive_bus_voltage", parts[6])?),
        negative_bus_voltage: Some(parse_float(QGS, "negative_bus_voltage", parts[7])?),
        battery_voltage: Some(parse_float(QGS, "battery_voltage", parts[8])?),
        negative_battery_voltage: Some(parse_float(
            QGS,
            "negative_battery_voltage",
            parts[9],
        )?),
        temperature_c: Some(parse_float(QGS, "temperature_c", parts[10])?),
        utility_fail: Some(utility_fail),
        battery_low: Some(battery_low),
        avr_active: Some(avr_active),
        ups_failed: Some(ups_failed),
        epo_active: Some(epo_active),
        test_in_progress: Some(test_in_progress),
        shutdown_active: Some(shutdown_active),
        battery_silence: Some(battery_silence),
        beeper_on: Some(!battery_silence),
        battery_test_fail: Some(test_fail),
        battery_test_ok: Some(test_ok),
        standby_type: Some(!b9 && !b8),
        ups_topology: Some(Topology::from_bits(b9, b8)),
        protocol_family: Some(Dialect::Centurion),
        ..UpsRecord::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QGS_FRAME: &str = "(229.8 50.0 230.1 50.0 2.1 045 385.2 384.9 27.1 27.0 33.5 010000000010";

    #[test]
    fn q1_reference_frame() {
        let rec = parse_q1("(219.7 219.7 219.7 000 50.0 27.3 30.0 01010101").unwrap();
        assert_eq!(rec.input_voltage, Some(219.7));
        assert_eq!(rec.fault_voltage, Some(219.7));
        assert_eq!(rec.output_voltage, Some(219.7));
        assert_eq!(rec.load_percent, Some(0));
        assert_eq!(rec.input_frequency_hz, Some(50.0));
        assert_eq!(rec.battery_voltage, Some(27.3));
        assert_eq!(rec.temperature_c, Some(30.0));
        assert_eq!(rec.utility_fail, Some(false));
        assert_eq!(rec.battery_low, Some(true));
        assert_eq!(rec.avr_active, Some(false));
        assert_eq!(rec.ups_failed, Some(true));
        assert_eq!(rec.standby_type, Some(false));
        assert_eq!(rec.test_in_progress, Some(true));
        assert_eq!(rec.shutdown_active, Some(false));
        assert_eq!(rec.beeper_on, Some(true));
        assert_eq!(rec.protocol_family, Some(Dialect::Megatec));
    }

    #[test]
    fn q1_each_bit_maps_to_its_flag() {
        for pos in 0..8 {
            let mut bits = [b'0'; 8];
            bits[pos] = b'1';
            let frame = format!(
                "(230.0 180.0 230.0 012 50.0 13.6 25.0 {}\r",
                std::str::from_utf8(&bits).unwrap()
            );
            let rec = parse_q1(&frame).unwrap();
            let flags = [
                rec.utility_fail,
                rec.battery_low,
                rec.avr_active,
                rec.ups_failed,
                rec.standby_type,
                rec.test_in_progress,
                rec.shutdown_active,
                rec.beeper_on,
            ];
            for (i, flag) in flags.iter().enumerate() {
                assert_eq!(*flag, Some(i == pos), "bit {pos}, flag {i}");
            }
        }
    }

    #[test]
    fn q1_hash_noise_on_numbers() {
        let rec = parse_q1("#230.0 #180.0 230.0 #045 50.0 13.6 25.0 00000000").unwrap();
        assert_eq!(rec.input_voltage, Some(230.0));
        assert_eq!(rec.fault_voltage, Some(180.0));
        assert_eq!(rec.load_percent, Some(45));
    }

    #[test]
    fn q1_rejects_bad_bitfields() {
        for bits in ["0101010", "010101010", "0101010x", "01-10101"] {
            let frame = format!("(219.7 219.7 219.7 000 50.0 27.3 30.0 {bits}");
            assert!(
                matches!(parse_q1(&frame), Err(ParseError::Bitfield { .. })),
                "{bits} should be rejected"
            );
        }
    }

    #[test]
    fn q1_rejects_wrong_field_count() {
        assert!(matches!(
            parse_q1("(219.7 219.7 219.7 000 50.0 27.3 01010101"),
            Err(ParseError::FieldCount { found: 7, .. })
        ));
        assert!(matches!(
            parse_q1("(219.7 219.7 219.7 000 50.0 27.3 30.0 01010101 extra"),
            Err(ParseError::FieldCount { found: 9, .. })
        ));
        assert!(parse_q1("").is_err());
    }

    #[test]
    fn q1_rejects_identity_frame() {
        assert!(parse_q1("#LIVIGY PSH-1500 FW1.03").is_err());
    }

    #[test]
    fn q1_rejects_non_numeric_field() {
        let err = parse_q1("(219.7 N/A 219.7 000 50.0 27.3 30.0 00000000").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Number {
                field: "fault_voltage",
                ..
            }
        ));
    }

    #[test]
    fn qgs_reference_frame() {
        let rec = parse_qgs(QGS_FRAME).unwrap();
        assert_eq!(rec.input_voltage, Some(229.8));
        assert_eq!(rec.input_frequency_hz, Some(50.0));
        assert_eq!(rec.output_voltage, Some(230.1));
        assert_eq!(rec.output_frequency_hz, Some(50.0));
        assert_eq!(rec.output_current_a, Some(2.1));
        assert_eq!(rec.load_percent, Some(45));
        assert_eq!(rec.positive_bus_voltage, Some(385.2));
        assert_eq!(rec.negative_bus_voltage, Some(384.9));
        assert_eq!(rec.battery_voltage, Some(27.1));
        assert_eq!(rec.negative_battery_voltage, Some(27.0));
        assert_eq!(rec.temperature_c, Some(33.5));
        assert_eq!(rec.ups_topology, Some(Topology::LineInteractive));
        assert_eq!(rec.standby_type, Some(false));
        assert_eq!(rec.utility_fail, Some(false));
        assert_eq!(rec.battery_silence, Some(false));
        assert_eq!(rec.beeper_on, Some(true));
        assert_eq!(rec.battery_test_fail, Some(true));
        assert_eq!(rec.battery_test_ok, Some(false));
        assert_eq!(rec.fault_voltage, None);
        assert_eq!(rec.protocol_family, Some(Dialect::Centurion));
    }

    #[test]
    fn qgs_topology_codes() {
        let cases = [
            ("00", Topology::Standby, true),
            ("01", Topology::LineInteractive, false),
            ("10", Topology::Online, false),
            ("11", Topology::Unknown, false),
        ];
        for (code, topology, standby) in cases {
            let frame = format!("(1 2 3 4 5 6 7 8 9 10 11 {code}0000000000");
            let rec = parse_qgs(&frame).unwrap();
            assert_eq!(rec.ups_topology, Some(topology), "code {code}");
            assert_eq!(rec.standby_type, Some(standby), "code {code}");
        }
    }

    #[test]
    fn qgs_beeper_is_inverse_of_silence() {
        for (bit, silence) in [('0', false), ('1', true)] {
            let frame = format!("(1 2 3 4 5 6 7 8 9 10 11 100000000{bit}00");
            let rec = parse_qgs(&frame).unwrap();
            assert_eq!(rec.battery_silence, Some(silence));
            assert_eq!(rec.beeper_on, Some(!silence));
        }
    }

    #[test]
    fn qgs_status_bit_positions() {
        let rec = parse_qgs("(1 2 3 4 5 6 7 8 9 10 11 101111111101").unwrap();
        assert_eq!(rec.ups_topology, Some(Topology::Online));
        assert_eq!(rec.utility_fail, Some(true));
        assert_eq!(rec.battery_low, Some(true));
        assert_eq!(rec.avr_active, Some(true));
        assert_eq!(rec.ups_failed, Some(true));
        assert_eq!(rec.epo_active, Some(true));
        assert_eq!(rec.test_in_progress, Some(true));
        assert_eq!(rec.shutdown_active, Some(true));
        assert_eq!(rec.battery_silence, Some(true));
        assert_eq!(rec.battery_test_fail, Some(false));
        assert_eq!(rec.battery_test_ok, Some(true));
    }

    #[test]
    fn qgs_accepts_trailing_fields() {
        let frame = format!("{QGS_FRAME} 99 extra");
        assert!(parse_qgs(&frame).is_ok());
    }

    #[test]
    fn qgs_rejects_short_or_bad_frames() {
        assert!(matches!(
            parse_qgs("(219.7 219.7 219.7 000 50.0 27.3 30.0 01010101"),
            Err(ParseError::FieldCount { .. })
        ));
        assert!(matches!(
            parse_qgs("(1 2 3 4 5 6 7 8 9 10 11 0100000000"),
            Err(ParseError::Bitfield { .. })
        ));
        assert!(matches!(
            parse_qgs("(1 2 3 4 5 6 7 8 9 10 11 01000000002x"),
            Err(ParseError::Bitfield { .. })
        ));
    }
}
