use crate::error::{config_error, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YEAR_ONLY: Regex = Regex::new(r"^\d{4}$").unwrap();
    static ref YEAR_MONTH: Regex = Regex::new(r"^(\d{4})-(\d{2})$").unwrap();
}

/// Date-time layouts carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

/// Date-time layouts without an offset, read as wall time in the configured zone
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts read as local midnight in the configured zone
const LOCAL_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

/// Parse a timezone name such as `Europe/Helsinki`
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| config_error(&format!("Unknown timezone: {}", name)))
}

/// Parse a date or date-time the way a lenient browser parser would
///
/// Returns `None` for anything that cannot be read; callers drop such values.
/// ISO dates without a time (`2024-05-01`) are midnight UTC, while naive
/// date-times and other date-only layouts are wall time in `tz`.
pub fn parse_permissive(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // A trailing Z is only understood by the RFC 3339 parser
    let offset_value = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => value.to_string(),
    };
    if let Some(dt) = parse_with_offset(&offset_value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local_to_utc(&naive, tz);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    if let Some(caps) = YEAR_MONTH.captures(value) {
        let year = caps[1].parse::<i32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, 1)?;
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    if YEAR_ONLY.is_match(value) {
        let date = NaiveDate::from_ymd_opt(value.parse::<i32>().ok()?, 1, 1)?;
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    for format in LOCAL_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return local_to_utc(&date.and_hms_opt(0, 0, 0)?, tz);
        }
    }

    None
}

fn parse_with_offset(value: &str) -> Option<DateTime<FixedOffset>> {
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
}

/// Resolve a wall-clock time in `tz`, taking the earlier instant across DST folds
fn local_to_utc(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render an instant as an ISO-8601 UTC string with second precision
pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse and normalize in one step
pub fn normalize_iso(value: &str, tz: &Tz) -> Option<String> {
    parse_permissive(value, tz).map(|dt| format_iso(&dt))
}

/// Read the calendar date of an all-day value (`YYYY-MM-DD`, extra time ignored)
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Whether a value is an ISO calendar date with no time of day (`2024-05-01`)
pub fn is_date_only(value: &str) -> bool {
    let value = value.trim();
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Whether a value is a bare four-digit year
pub fn is_bare_year(value: &str) -> bool {
    YEAR_ONLY.is_match(value.trim())
}
