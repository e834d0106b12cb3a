//! ISO-8601 timestamps at millisecond resolution.
//!
//! Calendar conversion uses Howard Hinnant's `days_from_civil` /
//! `civil_from_days` algorithms, which are exact over the whole proleptic
//! Gregorian calendar.

use core::fmt;

const MS_PER_DAY: i64 = 86_400_000;

/// Milliseconds since 1970-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    millis: i64,
}

/// Broken-down UTC calendar time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Civil {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl Timestamp {
    /// Wrap a raw millisecond count.
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp { millis }
    }

    /// Milliseconds since the Unix epoch.
    pub const fn as_millis(&self) -> i64 {
        self.millis
    }

    /// Build a timestamp from calendar fields. Out-of-range time fields carry
    /// into the next unit the way the arithmetic naturally does.
    pub fn from_civil(civil: Civil) -> Self {
        let days = days_from_civil(civil.year, civil.month, civil.day);
        let millis = days * MS_PER_DAY
            + i64::from(civil.hour) * 3_600_000
            + i64::from(civil.minute) * 60_000
            + i64::from(civil.second) * 1_000
            + i64::from(civil.millisecond);
        Timestamp { millis }
    }

    /// Break the timestamp into UTC calendar fields.
    pub fn to_civil(&self) -> Civil {
        let days = self.millis.div_euclid(MS_PER_DAY);
        let rem = self.millis.rem_euclid(MS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        Civil {
            year,
            month,
            day,
            hour: (rem / 3_600_000) as u32,
            minute: (rem / 60_000 % 60) as u32,
            second: (rem / 1_000 % 60) as u32,
            millisecond: (rem % 1_000) as u32,
        }
    }
}

impl fmt::Display for Timestamp {
    /// `YYYY-MM-DDThh:mm:ss[.mmm]Z`; the fraction is omitted when zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.to_civil();
        if (0..=9999).contains(&c.year) {
            write!(f, "{:04}", c.year)?;
        } else {
            write!(f, "{:+05}", c.year)?;
        }
        write!(
            f,
            "-{:02}-{:02}T{:02}:{:02}:{:02}",
            c.month, c.day, c.hour, c.minute, c.second
        )?;
        if c.millisecond != 0 {
            write!(f, ".{:03}", c.millisecond)?;
        }
        f.write_str("Z")
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
pub fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
pub fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month, day)
}

fn is_leap(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts `YYYY-MM-DDThh:mm[:ss[.fff]]` followed by nothing, `Z`, or a
/// `±hh[:mm]` offset. The separators inside the date and time are optional
/// (`20180622T150537Z` is accepted). Fractions beyond milliseconds are
/// truncated. Returns `None` for anything malformed.
pub fn parse_timestamp(text: &[u8]) -> Option<Timestamp> {
    let t = text.iter().position(|&b| b == b'T' || b == b't')?;
    let (date, rest) = (&text[..t], &text[t + 1..]);

    // date: digits are read from the back so the year may be any width
    let mut date = date;
    let day = take_two_back(&mut date)?;
    strip_separator_back(&mut date, b'-');
    let month = take_two_back(&mut date)?;
    strip_separator_back(&mut date, b'-');
    let year = parse_year(date)?;

    let mut time = rest;
    let hour = take_two(&mut time)?;
    strip_separator(&mut time, b':');
    let minute = take_two(&mut time)?;
    let mut second = 0;
    let mut millisecond = 0;
    if time.first().is_some_and(|&b| b == b':' || b.is_ascii_digit()) {
        strip_separator(&mut time, b':');
        second = take_two(&mut time)?;
        if let Some(b'.' | b',') = time.first() {
            time = &time[1..];
            let digits = time.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits == 0 {
                return None;
            }
            let mut scale = 100;
            for &d in &time[..digits.min(3)] {
                millisecond += u32::from(d - b'0') * scale;
                scale /= 10;
            }
            time = &time[digits..];
        }
    }

    if !(1..=12).contains(&month)
        || day == 0
        || day > days_in_month(year, month)
        || hour > 24
        || minute > 59
        || second > 60
    {
        return None;
    }

    let offset_minutes = parse_offset(time)?;
    let civil = Civil {
        year,
        month,
        day,
        hour,
        minute,
        second,
        millisecond,
    };
    let ts = Timestamp::from_civil(civil);
    Some(Timestamp::from_millis(ts.millis - offset_minutes * 60_000))
}

fn parse_offset(tail: &[u8]) -> Option<i64> {
    match tail {
        [] | [b'Z' | b'z'] => Some(0),
        [sign @ (b'+' | b'-'), rest @ ..] => {
            let mut rest = rest;
            let hours = take_two(&mut rest)?;
            strip_separator(&mut rest, b':');
            let minutes = if rest.is_empty() {
                0
            } else {
                take_two(&mut rest)?
            };
            if !rest.is_empty() || hours > 23 || minutes > 59 {
                return None;
            }
            let total = i64::from(hours * 60 + minutes);
            Some(if *sign == b'-' { -total } else { total })
        }
        _ => None,
    }
}

fn parse_year(text: &[u8]) -> Option<i32> {
    let (negative, digits) = match text {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        _ => (false, text),
    };
    if digits.len() < 4 || digits.len() > 6 || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = digits
        .iter()
        .fold(0i32, |acc, &d| acc * 10 + i32::from(d - b'0'));
    Some(if negative { -value } else { value })
}

fn take_two(text: &mut &[u8]) -> Option<u32> {
    match *text {
        [a @ b'0'..=b'9', b @ b'0'..=b'9', rest @ ..] => {
            *text = rest;
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

fn take_two_back(text: &mut &[u8]) -> Option<u32> {
    match *text {
        [rest @ .., a @ b'0'..=b'9', b @ b'0'..=b'9'] => {
            *text = rest;
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

fn strip_separator(text: &mut &[u8], sep: u8) {
    if text.first() == Some(&sep) {
        *text = &text[1..];
    }
}

fn strip_separator_back(text: &mut &[u8], sep: u8) {
    if let [rest @ .., last] = *text {
        if *last == sep {
            *text = rest;
        }
    }
}
