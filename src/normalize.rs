//! Normalization of the display strings found in file listings.
//!
//! Listings show upload times either as an absolute date (`2024-05-20`) or as
//! a relative phrase in Chinese (`3 小时前`, `昨天`), and sizes as `1.5 M`.
//! Parsing here is best-effort: anything unrecognized yields `now` or `0`
//! rather than an error, so one odd row never aborts a whole listing.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use tracing::debug;

use crate::rules::{HUMAN_SIZE, RELATIVE_TIME};

/// The site's fixed local offset (UTC+8).
pub const SHANGHAI_OFFSET_SECS: i32 = 8 * 3600;

/// Length of a "day" in relative offsets.
///
/// This is 84 600 seconds, not 86 400. Values previously stored by other
/// clients were computed with it, so it is kept as is.
pub const LEGACY_DAY_SECS: i64 = 84_600;

/// The fixed UTC+8 offset listings are expressed in.
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(SHANGHAI_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current time at the site's local offset.
pub fn now_local() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&local_offset())
}

/// Relative time phrases the site uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeTimeUnit {
    /// `秒前`
    SecondsAgo,
    /// `分钟前`
    MinutesAgo,
    /// `小时前`
    HoursAgo,
    /// `天前`
    DaysAgo,
    /// `昨天`
    Yesterday,
    /// `前天`
    DayBeforeYesterday,
}

impl RelativeTimeUnit {
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        match phrase {
            "秒前" => Some(Self::SecondsAgo),
            "分钟前" => Some(Self::MinutesAgo),
            "小时前" => Some(Self::HoursAgo),
            "天前" => Some(Self::DaysAgo),
            "昨天" => Some(Self::Yesterday),
            "前天" => Some(Self::DayBeforeYesterday),
            _ => None,
        }
    }

    /// How far back from "now" the phrase points. `amount` is ignored by the
    /// fixed-day phrases. Returns `None` on overflow.
    pub fn offset(self, amount: i64) -> Option<Duration> {
        let seconds = match self {
            Self::SecondsAgo => amount,
            Self::MinutesAgo => amount.checked_mul(60)?,
            Self::HoursAgo => amount.checked_mul(3600)?,
            Self::DaysAgo => amount.checked_mul(LEGACY_DAY_SECS)?,
            Self::Yesterday => LEGACY_DAY_SECS,
            Self::DayBeforeYesterday => LEGACY_DAY_SECS * 2,
        };
        Duration::try_seconds(seconds)
    }
}

/// Parse an absolute `YYYY-MM-DD` date or a relative phrase.
///
/// Absolute dates resolve to midnight at UTC+8. Relative phrases are applied
/// to `now`. Anything else returns `now` unchanged.
pub fn parse_time(input: &str, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    if let Some(date) = parse_absolute(input) {
        return date;
    }
    match parse_relative(input, now) {
        Some(time) => time,
        None => {
            debug!(input, "unrecognized time string, using now");
            now
        }
    }
}

fn parse_absolute(input: &str) -> Option<DateTime<FixedOffset>> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    local_offset().from_local_datetime(&midnight).single()
}

fn parse_relative(input: &str, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let caps = RELATIVE_TIME.captures(input)?;
    let unit = RelativeTimeUnit::from_phrase(&caps[2])?;
    // Fractions and missing numbers count as zero.
    let amount = caps[1].parse::<i64>().unwrap_or(0);
    now.checked_sub_signed(unit.offset(amount)?)
}

/// Byte scales for human sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    Kilobytes,
    Megabytes,
}

impl SizeUnit {
    /// Only a single `B`, `K` or `M` is a unit; `KB` and `MB` are not.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.to_ascii_uppercase().as_str() {
            "B" => Some(Self::Bytes),
            "K" => Some(Self::Kilobytes),
            "M" => Some(Self::Megabytes),
            _ => None,
        }
    }

    pub fn scale(self) -> u64 {
        match self {
            Self::Bytes => 1,
            Self::Kilobytes => 1 << 10,
            Self::Megabytes => 1 << 20,
        }
    }
}

/// Parse a size like `1.5 M` into bytes. Returns 0 when nothing matches,
/// including two-letter units such as `12 MB`, which the listings never use.
pub fn parse_size(input: &str) -> u64 {
    let Some(caps) = HUMAN_SIZE.captures(input) else {
        return 0;
    };
    let Ok(number) = caps[1].parse::<f64>() else {
        return 0;
    };
    let Some(unit) = SizeUnit::from_letter(&caps[2]) else {
        return 0;
    };
    (number * unit.scale() as f64) as u64
}
