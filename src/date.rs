//! Date-string parsing and epoch/broken-down-time conversion.
//!
//! The accepted date-string patterns and the epoch math are ported from
//! `parsedatestring`, `ydhms_diffl`, and `igmtime` in the original C
//! implementation rather than delegated to a general-purpose date crate,
//! so that epoch round trips hold at the full `i64` range by construction.
//! There is exactly one date parser in this crate, unlike the upstream CLI
//! this library was adapted from, which carried two independent copies.

use crate::error::{Error, Result};
use crate::Timestamp;

/// A broken-down (calendar) time, analogous to `struct tm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenDownTime {
    pub year: i64,
    /// 1-12.
    pub month: u32,
    /// 1-31.
    pub day: u32,
    /// 0-23.
    pub hour: u32,
    /// 0-59.
    pub minute: u32,
    /// 0-59.
    pub second: u32,
    /// 0-based day of year.
    pub year_day: i64,
    /// 0 = Sunday .. 6 = Saturday.
    pub week_day: u32,
    pub is_dst: bool,
}

impl BrokenDownTime {
    /// Converts to seconds since the epoch using the `ydhms_diffl` identity.
    pub fn to_epoch(&self) -> Timestamp {
        ydhms_diff(
            self.year - 1900,
            self.year_day,
            self.hour as i64,
            self.minute as i64,
            self.second as i64,
            70,
            0,
            0,
            0,
            0,
        )
    }
}

const TM_YEAR_BASE: i64 = 1900;

fn shr(a: i64, b: u32) -> i64 {
    a >> b
}

/// The day-count half of the Eggert/glibc leap-day identity: the number of
/// days between (YEAR1, YDAY1) and (YEAR0, YDAY0). Split out from
/// `ydhms_diff` because this part stays small (bounded by `365 * |years|`)
/// for any `year1`/`year0` an `i64` epoch can imply, whereas scaling it up to
/// seconds can overflow when called with a candidate year that overshoots
/// the target epoch, as the bracketing search in `epoch_to_broken_down`
/// necessarily does on its last iteration.
fn ydhms_diff_days(year1: i64, yday1: i64, year0: i64, yday0: i64) -> i64 {
    let a4 = shr(year1, 2) + shr(TM_YEAR_BASE, 2) - i64::from(year1 & 3 == 0);
    let b4 = shr(year0, 2) + shr(TM_YEAR_BASE, 2) - i64::from(year0 & 3 == 0);
    let a100 = a4.div_euclid(25);
    let b100 = b4.div_euclid(25);
    let a400 = shr(a100, 2);
    let b400 = shr(b100, 2);
    let intervening_leap_days = (a4 - b4) - (a100 - b100) + (a400 - b400);

    let years = year1 - year0;
    365 * years + (yday1 - yday0) + intervening_leap_days
}

/// The Eggert/glibc leap-day identity used to compute the number of seconds
/// between two broken-down times without ever materializing an intermediate
/// calendar date.
#[allow(clippy::too_many_arguments)]
fn ydhms_diff(
    year1: i64,
    yday1: i64,
    hour1: i64,
    min1: i64,
    sec1: i64,
    year0: i64,
    yday0: i64,
    hour0: i64,
    min0: i64,
    sec0: i64,
) -> i64 {
    let days = ydhms_diff_days(year1, yday1, year0, yday0);
    let hours = 24 * days + (hour1 - hour0);
    let minutes = 60 * hours + (min1 - min0);
    60 * minutes + (sec1 - sec0)
}

fn is_leap_year(year: i64) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

const DAYS_IN_MONTH: [[u32; 12]; 2] = [
    [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
    [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
];

const CUMULATIVE_DAYS: [[i64; 12]; 2] = [
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334],
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335],
];

fn days_in_month(month1: u32, year: i64) -> u32 {
    DAYS_IN_MONTH[is_leap_year(year) as usize][(month1 - 1) as usize]
}

/// Cumulative days before the start of `month0` (0-based) in `year`.
fn cumulative_days_before(month0: i64, year: i64) -> i64 {
    CUMULATIVE_DAYS[is_leap_year(year) as usize][month0 as usize]
}

/// Converts seconds since the epoch to a broken-down time, using `igmtime`'s
/// approximate-year-then-correct algorithm.
pub fn epoch_to_broken_down(epoch: Timestamp) -> BrokenDownTime {
    let delta_days_1970 = epoch / 86400;
    let mut approx_year = 1970 + (delta_days_1970 * 10000 / 3652425);
    approx_year -= 1;

    // Bracket the year by comparing day counts, not seconds: the seconds
    // form of the start-of-year timestamp can exceed i64 once the search
    // overshoots past the target epoch near the i64 extremes, but the day
    // count underlying it never does.
    let target_day = epoch.div_euclid(86400);
    loop {
        let curr_year_days = ydhms_diff_days(approx_year - 1900, 0, 70, 0);
        if curr_year_days > target_day {
            break;
        }
        approx_year += 1;
    }
    approx_year -= 1;
    let curr_year_t = ydhms_diff(approx_year - 1900, 0, 0, 0, 0, 70, 0, 0, 0, 0);

    let year = approx_year;
    let actual_delta = epoch - curr_year_t;
    let year_day = actual_delta.div_euclid(86400);
    let mut seconds_left = actual_delta.rem_euclid(86400);
    let hour = seconds_left / 3600;
    seconds_left -= hour * 3600;
    let minute = seconds_left / 60;
    let second = seconds_left - minute * 60;

    let mut month0: i64 = 11;
    while year_day < cumulative_days_before(month0, year) {
        month0 -= 1;
    }
    let day = 1 + year_day - cumulative_days_before(month0, year);
    let week_day = (delta_days_1970 + 4).rem_euclid(7);

    BrokenDownTime {
        year,
        month: (month0 + 1) as u32,
        day: day as u32,
        hour: hour as u32,
        minute: minute as u32,
        second: second as u32,
        year_day,
        week_day: week_day as u32,
        is_dst: false,
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { bytes: s.as_bytes(), pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn expect_byte(&mut self, b: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_literal(&mut self, lit: &str) -> bool {
        if self.bytes[self.pos..].starts_with(lit.as_bytes()) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    /// Mirrors the NetBSD `strptime` `conv_num`: reads at least one digit,
    /// then as many more as stay within `ulim`'s digit width.
    fn read_num(&mut self, llim: i64, ulim: i64) -> Option<i64> {
        if self.at_end() || !self.bytes[self.pos].is_ascii_digit() {
            return None;
        }
        let mut result: i64 = 0;
        let mut rulim = ulim;
        loop {
            let ch = self.bytes[self.pos];
            result = result * 10 + i64::from(ch - b'0');
            rulim /= 10;
            self.pos += 1;
            let next_is_digit = self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit();
            if !(result * 10 <= ulim && rulim > 0 && next_is_digit) {
                break;
            }
        }
        if result < llim || result > ulim {
            None
        } else {
            Some(result)
        }
    }
}

fn parse_ymd(c: &mut Cursor) -> Option<(i64, u32, u32)> {
    let year = c.read_num(0, 9999)?;
    if !c.expect_byte(b'-') {
        return None;
    }
    let month = c.read_num(1, 12)? as u32;
    if !c.expect_byte(b'-') {
        return None;
    }
    let day = c.read_num(1, 31)? as u32;
    Some((year, month, day))
}

fn try_ymd_hm(s: &str, literal_seconds: Option<&str>) -> Option<(i64, u32, u32, u32, u32)> {
    let mut c = Cursor::new(s);
    let (year, month, day) = parse_ymd(&mut c)?;
    if !c.expect_byte(b' ') {
        return None;
    }
    let hour = c.read_num(0, 23)? as u32;
    if !c.expect_byte(b':') {
        return None;
    }
    let minute = c.read_num(0, 59)? as u32;
    if let Some(lit) = literal_seconds {
        if !c.expect_literal(lit) {
            return None;
        }
    }
    if !c.at_end() {
        return None;
    }
    Some((year, month, day, hour, minute))
}

fn try_ymd_h(s: &str) -> Option<(i64, u32, u32, u32)> {
    let mut c = Cursor::new(s);
    let (year, month, day) = parse_ymd(&mut c)?;
    if !c.expect_byte(b' ') {
        return None;
    }
    let hour = c.read_num(0, 23)? as u32;
    if !c.at_end() {
        return None;
    }
    Some((year, month, day, hour))
}

fn try_ymd(s: &str) -> Option<(i64, u32, u32)> {
    let mut c = Cursor::new(s);
    let r = parse_ymd(&mut c)?;
    if !c.at_end() {
        return None;
    }
    Some(r)
}

fn try_ym(s: &str) -> Option<(i64, u32)> {
    let mut c = Cursor::new(s);
    let year = c.read_num(0, 9999)?;
    if !c.expect_byte(b'-') {
        return None;
    }
    let month = c.read_num(1, 12)? as u32;
    if !c.at_end() {
        return None;
    }
    Some((year, month))
}

fn try_y(s: &str) -> Option<i64> {
    let mut c = Cursor::new(s);
    let year = c.read_num(0, 9999)?;
    if !c.at_end() {
        return None;
    }
    Some(year)
}

/// Replaces the first `T`/`t` with a space, then all `.` with `:` and `/`
/// with `-`, exactly as `parsedatestring`'s preprocessing pass does.
fn preprocess(input: &str) -> String {
    let mut s = input.to_string();
    if let Some(pos) = s.find(['T', 't']) {
        s.replace_range(pos..pos + 1, " ");
    }
    s.chars()
        .map(|c| match c {
            '.' => ':',
            '/' => '-',
            other => other,
        })
        .collect()
}

/// Parses a date string against the fixed list of accepted patterns, trying
/// each in turn until one consumes the whole (preprocessed) string. `%s`
/// (raw epoch seconds) is intentionally not supported.
pub fn parse(input: &str) -> Result<BrokenDownTime> {
    if input.is_empty() {
        return Err(Error::InvalidDate { input: input.to_string() });
    }
    let preprocessed = preprocess(input);

    let (year, month, day, hour, minute, second) = if let Some((y, mo, d, h, mi)) =
        try_ymd_hm(&preprocessed, None)
    {
        (y, mo, d, h, mi, 0)
    } else if let Some((y, mo, d, h, mi)) = try_ymd_hm(&preprocessed, Some(":00")) {
        (y, mo, d, h, mi, 0)
    } else if let Some((y, mo, d, h, mi)) = try_ymd_hm(&preprocessed, Some(":00:00")) {
        (y, mo, d, h, mi, 0)
    } else if let Some((y, mo, d, h)) = try_ymd_h(&preprocessed) {
        (y, mo, d, h, 0, 0)
    } else if let Some((y, mo, d)) = try_ymd(&preprocessed) {
        (y, mo, d, 0, 0, 0)
    } else if let Some((y, mo)) = try_ym(&preprocessed) {
        (y, mo, 1, 0, 0, 0)
    } else if let Some(y) = try_y(&preprocessed) {
        (y, 1, 1, 0, 0, 0)
    } else {
        return Err(Error::InvalidDate { input: input.to_string() });
    };

    if day < 1 || day > days_in_month(month, year) {
        return Err(Error::InvalidDate { input: input.to_string() });
    }

    let year_day = cumulative_days_before(month as i64 - 1, year) + (day as i64 - 1);
    let mut bdt = BrokenDownTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
        year_day,
        week_day: 0,
        is_dst: false,
    };
    let epoch = bdt.to_epoch();
    bdt.week_day = epoch_to_broken_down(epoch).week_day;
    Ok(bdt)
}

/// Convenience: parse directly to epoch seconds.
pub fn parse_to_epoch(input: &str) -> Result<Timestamp> {
    parse(input).map(|bdt| bdt.to_epoch())
}
