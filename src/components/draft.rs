//! Host-side event form state.
//!
//! Suggestions arrive asynchronously and in any order; they are merged into
//! the draft without ever replacing what is already there. Validation of the
//! event happens here, before anything reaches the encoder.

use crate::components::extractor::models::{dedup_capped, MAX_SUGGESTIONS};
use crate::components::extractor::{
    DateTimeSuggestion, DescriptionSuggestion, ExtractionResponse, TitleSuggestion,
};
use crate::components::ics::CalendarEvent;
use crate::error::{invalid_event, AppResult};
use crate::utils::text::{build_description, strip_source_footer};
use crate::utils::time::{format_iso, parse_calendar_date, parse_permissive};
use chrono::Duration;
use chrono_tz::Tz;
use tracing::debug;

/// Default length of a timed event picked from a suggestion without an end
const DEFAULT_EVENT_HOURS: i64 = 1;

/// Permission to fill the draft from the selection context, usable once
#[derive(Debug)]
pub struct ContextToken {
    _private: (),
}

/// An event being assembled from page suggestions and user edits
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub title: String,
    pub start: String,
    pub end: String,
    pub all_day: bool,
    /// Description body, without the `Source:` footer
    pub description: String,
    pub url: Option<String>,
    date_suggestions: Vec<DateTimeSuggestion>,
    description_suggestions: Vec<DescriptionSuggestion>,
    title_suggestions: Vec<TitleSuggestion>,
}

impl EventDraft {
    /// Start a draft for a page, together with its one-shot context token
    pub fn new(url: Option<String>) -> (Self, ContextToken) {
        let draft = Self {
            url,
            ..Default::default()
        };
        (draft, ContextToken { _private: () })
    }

    pub fn date_suggestions(&self) -> &[DateTimeSuggestion] {
        &self.date_suggestions
    }

    pub fn description_suggestions(&self) -> &[DescriptionSuggestion] {
        &self.description_suggestions
    }

    pub fn title_suggestions(&self) -> &[TitleSuggestion] {
        &self.title_suggestions
    }

    /// Merge date suggestions after the ones already present
    pub fn add_date_suggestions(&mut self, items: Vec<DateTimeSuggestion>) {
        let merged = self.date_suggestions.drain(..).chain(items).collect();
        self.date_suggestions =
            dedup_capped(merged, DateTimeSuggestion::dedup_key, MAX_SUGGESTIONS);
    }

    /// Merge description suggestions after the ones already present
    pub fn add_description_suggestions(&mut self, items: Vec<DescriptionSuggestion>) {
        let merged = self.description_suggestions.drain(..).chain(items).collect();
        self.description_suggestions = dedup_capped(
            merged,
            |s: &DescriptionSuggestion| s.text.clone(),
            MAX_SUGGESTIONS,
        );
    }

    /// Merge title suggestions after the ones already present
    pub fn add_title_suggestions(&mut self, items: Vec<TitleSuggestion>) {
        let merged = self.title_suggestions.drain(..).chain(items).collect();
        self.title_suggestions =
            dedup_capped(merged, |s: &TitleSuggestion| s.text.clone(), MAX_SUGGESTIONS);
    }

    /// Merge whatever suggestions a page response carries
    pub fn apply_response(&mut self, response: ExtractionResponse) {
        match response {
            ExtractionResponse::Dates(items) => self.add_date_suggestions(items),
            ExtractionResponse::Descriptions(items) => self.add_description_suggestions(items),
            ExtractionResponse::Titles(items) => self.add_title_suggestions(items),
            ExtractionResponse::SelectionContext(_) => {
                debug!("Selection context ignored; it is applied with a context token")
            }
        }
    }

    /// Fill the description from the selection context, consuming the token
    ///
    /// An empty body takes the context as-is; otherwise the context is added as
    /// a new paragraph unless the body already contains it.
    pub fn apply_selection_context(&mut self, _token: ContextToken, context: Option<String>) {
        let Some(context) = context.filter(|c| !c.trim().is_empty()) else {
            return;
        };

        let body = self.description.trim();
        if body.is_empty() {
            self.description = context;
        } else if !body.contains(context.trim()) {
            self.description = format!("{}\n\n{}", body, context);
        }
    }

    /// Take the suggestion at `index` as the event time
    pub fn use_date_suggestion(&mut self, index: usize, tz: &Tz) -> AppResult<()> {
        let suggestion = self
            .date_suggestions
            .get(index)
            .cloned()
            .ok_or_else(|| invalid_event(&format!("No date suggestion #{}", index + 1)))?;

        let start = parse_permissive(&suggestion.start, tz)
            .ok_or_else(|| invalid_event(&format!("Unreadable start {}", suggestion.start)))?;
        let end = suggestion
            .end
            .as_deref()
            .and_then(|end| parse_permissive(end, tz))
            .filter(|end| *end > start)
            .unwrap_or(start + Duration::hours(DEFAULT_EVENT_HOURS));

        if self.all_day {
            // Page dates are already calendar days; only real instants need the local zone
            let (local_start, local_end) = if suggestion.date_only {
                let day = parse_calendar_date(&suggestion.start).unwrap_or_else(|| start.date_naive());
                let last_day = suggestion
                    .end
                    .as_deref()
                    .and_then(parse_calendar_date)
                    .unwrap_or(day);
                (day, last_day)
            } else {
                (
                    start.with_timezone(tz).date_naive(),
                    end.with_timezone(tz).date_naive(),
                )
            };
            let local_end = local_end.max(local_start);
            self.start = local_start.format("%Y-%m-%d").to_string();
            self.end = local_end.format("%Y-%m-%d").to_string();
        } else {
            self.start = format_iso(&start);
            self.end = format_iso(&end);
        }

        debug!("Using date suggestion '{}'", suggestion.label);
        Ok(())
    }

    /// Fill empty fields from the first suggestion of each kind
    pub fn fill_defaults(&mut self, tz: &Tz) {
        if self.title.trim().is_empty() {
            if let Some(title) = self.title_suggestions.first() {
                self.title = title.text.clone();
            }
        }
        if self.description.trim().is_empty() {
            if let Some(description) = self.description_suggestions.first() {
                self.description = description.text.clone();
            }
        }
        if self.start.trim().is_empty() && !self.date_suggestions.is_empty() {
            let _ = self.use_date_suggestion(0, tz);
        }
    }

    /// Replace the description body, dropping any `Source:` footer pasted back in
    pub fn set_description(&mut self, description: &str) {
        self.description = strip_source_footer(description);
    }

    /// Validate and build the event handed to the encoder
    pub fn finalize(&self, tz: &Tz) -> AppResult<CalendarEvent> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(invalid_event("Title is required"));
        }

        let (start, end) = if self.all_day {
            let start = parse_calendar_date(&self.start)
                .ok_or_else(|| invalid_event(&format!("Invalid start date '{}'", self.start)))?;
            let end = parse_calendar_date(&self.end)
                .ok_or_else(|| invalid_event(&format!("Invalid end date '{}'", self.end)))?;
            if end < start {
                return Err(invalid_event("End date is before start date"));
            }
            (start.format("%Y-%m-%d").to_string(), end.format("%Y-%m-%d").to_string())
        } else {
            let start = parse_permissive(&self.start, tz)
                .ok_or_else(|| invalid_event(&format!("Invalid start time '{}'", self.start)))?;
            let end = parse_permissive(&self.end, tz)
                .ok_or_else(|| invalid_event(&format!("Invalid end time '{}'", self.end)))?;
            if end <= start {
                return Err(invalid_event("End time must be after start time"));
            }
            (format_iso(&start), format_iso(&end))
        };

        let description = build_description(&self.description, self.url.as_deref());

        Ok(CalendarEvent {
            title: title.to_string(),
            start,
            end,
            all_day: self.all_day,
            description: Some(description).filter(|d| !d.is_empty()),
            url: self.url.clone().filter(|u| !u.trim().is_empty()),
        })
    }
}
