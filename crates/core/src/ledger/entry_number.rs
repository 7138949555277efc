//! Journal entry numbering: `JE-YYYYMMDD-NNNNN`, sequential per entry date.

use chrono::NaiveDate;

const PREFIX: &str = "JE";

/// Formats the display number of the `sequence`-th entry dated `date`.
#[must_use]
pub fn format_entry_number(date: NaiveDate, sequence: i64) -> String {
    format!("{PREFIX}-{}-{sequence:05}", date.format("%Y%m%d"))
}

/// Splits an entry number back into its date and sequence.
#[must_use]
pub fn parse_entry_number(number: &str) -> Option<(NaiveDate, i64)> {
    let mut parts = number.splitn(3, '-');
    if parts.next()? != PREFIX {
        return None;
    }
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y%m%d").ok()?;
    let sequence = parts.next()?.parse().ok()?;
    Some((date, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_sequence() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(format_entry_number(date, 1), "JE-20260309-00001");
        assert_eq!(format_entry_number(date, 123_456), "JE-20260309-123456");
    }

    #[test]
    fn parses_back() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        let number = format_entry_number(date, 42);
        assert_eq!(parse_entry_number(&number), Some((date, 42)));
        assert_eq!(parse_entry_number("INV-20261231-00001"), None);
        assert_eq!(parse_entry_number("JE-2026-1"), None);
    }
}
