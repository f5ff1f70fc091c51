use super::models::{CalendarEvent, LineEnding};
use super::text::{escape_text, fold_line};
use crate::error::{AppResult, Error};
use crate::utils::time::{parse_calendar_date, parse_permissive};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

/// Product identifier written when none is configured
pub const DEFAULT_PRODUCT_ID: &str = "-//pagecal//Page to Calendar//EN";

const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const DATE_FORMAT: &str = "%Y%m%d";

/// Generate a fresh event UID, also used as the resource file stem
pub fn generate_uid() -> String {
    Uuid::new_v4().to_string()
}

/// Serializes events into iCalendar text
#[derive(Debug, Clone)]
pub struct IcsEncoder {
    product_id: String,
    line_ending: LineEnding,
    timezone: Tz,
}

impl Default for IcsEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_ID, LineEnding::default(), Tz::UTC)
    }
}

impl IcsEncoder {
    /// Create an encoder; `timezone` applies to timed values written without an offset
    pub fn new(product_id: impl Into<String>, line_ending: LineEnding, timezone: Tz) -> Self {
        Self {
            product_id: product_id.into(),
            line_ending,
            timezone,
        }
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Encode `event` as a VCALENDAR with one VEVENT, stamped with the current time
    pub fn encode(&self, event: &CalendarEvent, uid: &str) -> AppResult<String> {
        self.encode_at(event, uid, Utc::now())
    }

    /// Encode with an explicit DTSTAMP
    pub fn encode_at(
        &self,
        event: &CalendarEvent,
        uid: &str,
        stamp: DateTime<Utc>,
    ) -> AppResult<String> {
        let (dtstart, dtend) = if event.all_day {
            let start = all_day_date(&event.start)?;
            // DTEND of an all-day event is exclusive
            let end = all_day_date(&event.end)?
                .succ_opt()
                .ok_or_else(|| Error::InvalidDate(event.end.clone()))?;
            (
                format!("DTSTART;VALUE=DATE:{}", start.format(DATE_FORMAT)),
                format!("DTEND;VALUE=DATE:{}", end.format(DATE_FORMAT)),
            )
        } else {
            (
                format!("DTSTART:{}", self.utc_value(&event.start)?),
                format!("DTEND:{}", self.utc_value(&event.end)?),
            )
        };

        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", self.product_id),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", uid),
            format!("DTSTAMP:{}", stamp.format(UTC_FORMAT)),
            dtstart,
            dtend,
            format!("SUMMARY:{}", escape_text(&event.title)),
        ];

        if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        if let Some(url) = event.url.as_deref().filter(|u| !u.is_empty()) {
            lines.push(format!("URL:{}", url));
        }

        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());

        let terminator = self.line_ending.as_str();
        Ok(lines
            .iter()
            .map(|line| fold_line(line, self.line_ending) + terminator)
            .collect())
    }

    fn utc_value(&self, value: &str) -> AppResult<String> {
        parse_permissive(value, &self.timezone)
            .map(|dt| dt.format(UTC_FORMAT).to_string())
            .ok_or_else(|| Error::InvalidDate(value.to_string()))
    }
}

fn all_day_date(value: &str) -> AppResult<NaiveDate> {
    parse_calendar_date(value).ok_or_else(|| Error::InvalidDate(value.to_string()))
}
