//! Parsing and emitting the CSV-like line format: `DATE,VALUE,FLAGS`.
//!
//! Ported from `ts_readline`/`ts_readfile`/`ts_readfromstring`/
//! `ts_writeline`/`ts_write`. The writer returns owned, growable `String`s
//! instead of the original's fixed-size-buffer-with-retry convention, since
//! Rust's `String` has no overflow case to signal.

use crate::csv::CsvTokenizer;
use crate::date;
use crate::error::{Error, Result};
use crate::series::{Record, Series};
use crate::Timestamp;

const MAX_LINE_LEN: usize = 255;

/// Parses one line and inserts the resulting record into `series`,
/// overwriting any existing record at the same timestamp.
pub fn read_line(line: &str, series: &mut Series) -> Result<usize> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    let mut tokens = CsvTokenizer::new(trimmed);

    let date_field = tokens
        .next()
        .ok_or_else(|| Error::InvalidSyntax { line: trimmed.to_string() })?;
    let ts = date::parse_to_epoch(date_field.trim()).map_err(|_| Error::InvalidDate {
        input: date_field.trim().to_string(),
    })?;

    let value_field = tokens
        .next()
        .ok_or_else(|| Error::InvalidSyntax { line: trimmed.to_string() })?;
    let value_trimmed = value_field.trim();
    let (null, value) = if value_trimmed.is_empty() {
        (true, 0.0)
    } else {
        let v: f64 = value_trimmed
            .parse()
            .map_err(|_| Error::InvalidFloat { input: value_trimmed.to_string() })?;
        (false, v)
    };

    let flags = tokens.next().unwrap_or_default().trim().to_string();

    if tokens.next().is_some() {
        tracing::debug!(line = trimmed, "extra field after flags");
        return Err(Error::InvalidSyntax { line: trimmed.to_string() });
    }

    series.insert(ts, null, value, flags, true)
}

/// Splits `text` into lines, enforcing a 255-byte maximum length including
/// the terminator. The final line may omit a terminator if it fits.
fn split_lines(text: &str) -> Result<Vec<String>> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'\n' {
            if i - start + 1 > MAX_LINE_LEN {
                return Err(Error::Line {
                    line: lines.len() + 1,
                    source: Box::new(Error::LineTooLong),
                });
            }
            let mut end = i;
            if end > start && bytes[end - 1] == b'\r' {
                end -= 1;
            }
            lines.push(text[start..end].to_string());
            start = i + 1;
            i = start;
            continue;
        }
        i += 1;
        if i - start > MAX_LINE_LEN {
            return Err(Error::Line {
                line: lines.len() + 1,
                source: Box::new(Error::LineTooLong),
            });
        }
    }

    if start < bytes.len() {
        if bytes.len() - start > MAX_LINE_LEN {
            return Err(Error::Line {
                line: lines.len() + 1,
                source: Box::new(Error::LineTooLong),
            });
        }
        lines.push(text[start..].to_string());
    }

    Ok(lines)
}

/// Reads every line of `text` into `series`, in order. Errors carry the
/// 1-based line number that failed.
pub fn read_str(text: &str, series: &mut Series) -> Result<()> {
    for (idx, line) in split_lines(text)?.iter().enumerate() {
        read_line(line, series).map_err(|e| Error::Line { line: idx + 1, source: Box::new(e) })?;
    }
    Ok(())
}

/// Reads an entire file into `series`. See `read_str` for line semantics.
pub fn read_file(path: impl AsRef<std::path::Path>, series: &mut Series) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Internal { message: e.to_string() })?;
    read_str(&text, series)
}

/// Strips trailing fractional zeros (and a bare trailing `.`) from a
/// formatted number, the way `%g`'s default (non-`#`) conversion does.
fn trim_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Formats `value` the way C's `printf("%G", value)` does with its default
/// precision of 6 significant digits: `%f` style when the decimal exponent
/// is in `[-4, 6)`, `%e` style otherwise, trailing zeros trimmed either way.
fn format_g(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0".to_string() } else { "0".to_string() };
    }
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-INF".to_string() } else { "INF".to_string() };
    }

    const SIG_DIGITS: i32 = 6;
    let sci = format!("{:.*e}", (SIG_DIGITS - 1) as usize, value);
    let (mantissa, exp_str) = sci.split_once('e').expect("scientific notation has an exponent");
    let exp: i32 = exp_str.parse().expect("exponent is a valid integer");

    if exp < -4 || exp >= SIG_DIGITS {
        let mantissa = trim_trailing_zeros(mantissa);
        format!("{mantissa}E{}{:02}", if exp >= 0 { "+" } else { "-" }, exp.abs())
    } else {
        let frac_digits = (SIG_DIGITS - 1 - exp).max(0) as usize;
        let fixed = format!("{value:.frac_digits$}");
        trim_trailing_zeros(&fixed).to_string()
    }
}

/// Output precision: `-9999` selects the original's `%G`-style shortest
/// significant-digit format, any other value is clamped to `[0, 17]` decimal
/// places.
fn format_value(value: f64, null: bool, precision: i32) -> String {
    if null {
        return String::new();
    }
    if precision == -9999 {
        format_g(value)
    } else {
        let digits = precision.clamp(0, 17) as usize;
        format!("{value:.digits$}")
    }
}

/// Formats one record as a `DATE,VALUE,FLAGS\r\n` line.
pub fn format_line(record: &Record, precision: i32) -> String {
    let bdt = date::epoch_to_broken_down(record.ts);
    let date_str = format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        bdt.year, bdt.month, bdt.day, bdt.hour, bdt.minute
    );
    let value_str = format_value(record.value, record.null, precision);
    let flags = crate::csv::csv_quote(&record.flags);
    format!("{date_str},{value_str},{flags}\r\n")
}

/// Formats every record in `[start_ts, end_ts]` as consecutive lines, or
/// `None` if the range contains no records.
pub fn format_range(series: &Series, start_ts: Timestamp, end_ts: Timestamp, precision: i32) -> Option<String> {
    let i1 = series.next_index(start_ts)?;
    let i2 = series.prev_index(end_ts)?;
    if i2 < i1 {
        return None;
    }
    let mut out = String::new();
    for i in i1..=i2 {
        out.push_str(&format_line(series.item(i).expect("index in range"), precision));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_and_inserts_a_well_formed_line() {
        let mut s = Series::new();
        let idx = read_line("2010-01-01 00:00,3.14,GOOD\r\n", &mut s).unwrap();
        assert_eq!(idx, 0);
        let r = s.item(0).unwrap();
        assert!(!r.null);
        assert_eq!(r.value, 3.14);
        assert_eq!(r.flags, "GOOD");
    }

    #[test]
    fn empty_value_field_is_null() {
        let mut s = Series::new();
        read_line("2010-01-01 00:00,,MISSING", &mut s).unwrap();
        assert!(s.item(0).unwrap().null);
    }

    #[rstest]
    #[case("2010-01-01 00:00,notanumber,")]
    #[case("2010-01-01 00:00,1.0,2.0,extra")]
    #[case("not a date,1.0,")]
    fn rejects_malformed_lines(#[case] line: &str) {
        let mut s = Series::new();
        assert!(read_line(line, &mut s).is_err());
    }

    #[test]
    fn read_str_reports_one_based_line_number() {
        let mut s = Series::new();
        let text = "2010-01-01 00:00,1.0,\n2010-01-02 00:00,bad,\n";
        let err = read_str(text, &mut s).unwrap_err();
        match err {
            Error::Line { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Error::Line, got {other:?}"),
        }
    }

    #[test]
    fn overlong_line_without_terminator_fails() {
        let text = "a".repeat(300);
        assert!(split_lines(&text).is_err());
    }

    #[test]
    fn final_line_without_terminator_is_accepted() {
        let text = "2010-01-01 00:00,1.0,FLAG";
        let lines = split_lines(text).unwrap();
        assert_eq!(lines, vec!["2010-01-01 00:00,1.0,FLAG"]);
    }

    #[test]
    fn round_trip_parse_then_emit_precision_two() {
        let mut s = Series::new();
        read_line("2010-01-01 00:00,3.14,GOOD", &mut s).unwrap();
        let line = format_line(s.item(0).unwrap(), 2);
        assert_eq!(line, "2010-01-01 00:00,3.14,GOOD\r\n");
    }

    #[test]
    fn round_trip_bit_exact_at_precision_seventeen() {
        let mut s = Series::new();
        s.append(0, false, 3.14, "").unwrap();
        let line = format_line(s.item(0).unwrap(), 17);
        let mut s2 = Series::new();
        read_line(&line, &mut s2).unwrap();
        assert_eq!(s2.item(0).unwrap().value.to_bits(), s.item(0).unwrap().value.to_bits());
    }

    #[rstest]
    #[case(3.14, "3.14")]
    #[case(100.0, "100")]
    #[case(0.0, "0")]
    #[case(-2.5, "-2.5")]
    #[case(0.0001234, "0.0001234")]
    #[case(1.0e20, "1E+20")]
    #[case(123456789.0, "1.23457E+08")]
    fn sentinel_precision_formats_like_percent_g(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_value(value, false, -9999), expected);
    }

    #[test]
    fn format_range_covers_inclusive_bounds() {
        let mut s = Series::new();
        s.append(0, false, 1.0, "").unwrap();
        s.append(10, false, 2.0, "").unwrap();
        s.append(20, false, 3.0, "").unwrap();
        let text = format_range(&s, 0, 10, 2).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn read_file_loads_records_from_disk() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        write!(file, "2010-01-01 00:00,1.0,\r\n2010-01-02 00:00,2.0,\r\n").unwrap();

        let mut s = Series::new();
        read_file(file.path(), &mut s).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.item(1).unwrap().value, 2.0);
    }
}
