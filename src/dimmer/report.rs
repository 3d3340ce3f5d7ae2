//! Setpoint reports notified by the device.
//!
//! A report lists the current level of each channel as two hex digits,
//! e.g. `"1f00100a"`.

use std::sync::Arc;

use super::{command, Error, CHANNEL_COUNT};

pub fn parse_levels(report: &str) -> Result<Vec<u8>, Error> {
    let invalid = || Error::InvalidReport(Arc::from(report));

    let report_bytes = report.trim().as_bytes();
    if report_bytes.is_empty() || report_bytes.len() % 2 != 0 {
        return Err(invalid());
    }

    report_bytes
        .chunks(2)
        .map(|digits| {
            // `from_str_radix` also accepts a sign
            if !digits.iter().all(u8::is_ascii_hexdigit) {
                return Err(invalid());
            }
            let digits = std::str::from_utf8(digits).map_err(|_| invalid())?;
            let level = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
            if level > command::LEVEL_MAX {
                return Err(invalid());
            }
            Ok(level)
        })
        .collect()
}

/// Parses a report into normalized values for every channel.
pub fn parse_values(report: &str) -> Result<[f32; CHANNEL_COUNT], Error> {
    let levels = parse_levels(report)?;
    if levels.len() != CHANNEL_COUNT {
        return Err(Error::InvalidReport(Arc::from(report)));
    }

    let mut values = [0f32; CHANNEL_COUNT];
    for (value, level) in values.iter_mut().zip(levels) {
        *value = command::level_to_value(level);
    }

    Ok(values)
}

pub fn format_levels(levels: &[u8]) -> String {
    levels.iter().map(|level| format!("{level:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels() {
        assert_eq!(parse_levels("1f00100a").unwrap(), vec![31, 0, 16, 10]);
        assert_eq!(parse_levels("1F\n").unwrap(), vec![31]);
    }

    #[test]
    fn values() {
        let values = parse_values("1f000000").unwrap();
        assert_eq!(values, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn invalid() {
        assert!(parse_levels("").is_err());
        assert!(parse_levels("1f0").is_err());
        assert!(parse_levels("zz").is_err());
        assert!(parse_levels("+1+f+0+0").is_err());
        assert!(parse_levels("-1").is_err());
        assert!(parse_levels(" 1").is_err());
        // above the highest level
        assert!(parse_levels("20").is_err());
        assert!(parse_values("1f00").is_err());
    }

    #[test]
    fn format() {
        assert_eq!(format_levels(&[31, 0, 16, 10]), "1f00100a");
    }
}
