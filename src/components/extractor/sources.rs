//! Independent signal sources scanned over a parsed page snapshot.
//!
//! Every source yields [`Candidate`]s; a malformed value becomes a skip and
//! never stops the source it came from or any other source.

use super::models::{
    collect_found, dedup_capped, Candidate, DateTimeSuggestion, DescriptionSuggestion,
    TitleSuggestion, MAX_SUGGESTIONS,
};
use crate::utils::dom::{element_text, first_attr, meta_content};
use crate::utils::text::{collapse_whitespace, truncate, truncate_default};
use crate::utils::time::{is_bare_year, is_date_only, normalize_iso};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

const TITLE_MAX_LENGTH: usize = 200;
const MIN_PARAGRAPH_LENGTH: usize = 20;

const SOURCE_STRUCTURED: &str = "structured data";
const SOURCE_MICRODATA: &str = "microdata";
const SOURCE_OPEN_GRAPH: &str = "Open Graph";
const SOURCE_META: &str = "meta description";
const SOURCE_CONTENT: &str = "page content";

/// Metadata tags consulted for a page date, highest priority first
const META_DATE_TAGS: &[(&str, &str)] = &[
    ("article:published_time", "Published"),
    ("article:modified_time", "Modified"),
    ("event:start_time", "Event start"),
    ("date", "Page date"),
    ("DC.date", "Page date"),
];

lazy_static! {
    static ref LD_JSON: Selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    static ref ITEM_SCOPE: Selector = Selector::parse("[itemscope][itemtype]").unwrap();
    static ref TIME_WITH_DATETIME: Selector = Selector::parse("time[datetime]").unwrap();
    static ref CONTENT_PARAGRAPH: Selector = Selector::parse("article p, main p").unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref HEADING: Selector = Selector::parse("h1").unwrap();
}

/// All date/time suggestions, in source priority order, deduplicated and capped
pub fn extract_dates(document: &Html, tz: &Tz) -> Vec<DateTimeSuggestion> {
    let mut candidates = Vec::new();
    candidates.extend(json_ld_dates(document, tz));
    candidates.extend(microdata_dates(document, tz));
    candidates.extend(time_element_dates(document, tz));
    candidates.extend(meta_dates(document, tz));

    dedup_capped(
        collect_found(candidates),
        DateTimeSuggestion::dedup_key,
        MAX_SUGGESTIONS,
    )
}

/// All description suggestions, in source priority order, deduplicated and capped
pub fn extract_descriptions(document: &Html) -> Vec<DescriptionSuggestion> {
    let mut candidates = Vec::new();

    for node in collect_found(json_ld_event_nodes(document)) {
        if let Some(text) = node.get("description").and_then(Value::as_str) {
            candidates.push(description_candidate(text, SOURCE_STRUCTURED));
        }
    }

    for scope in event_scopes(document) {
        if let Some(text) = item_property(&scope, "description") {
            candidates.push(description_candidate(&text, SOURCE_MICRODATA));
        }
    }

    let og_description = meta_content(document, "og:description").map(|text| normalize(&text));
    if let Some(text) = &og_description {
        candidates.push(description_candidate(text, SOURCE_OPEN_GRAPH));
    }

    if let Some(text) = meta_content(document, "description") {
        let text = normalize(&text);
        if og_description.as_ref() == Some(&text) {
            candidates.push(Candidate::skipped(SOURCE_META, "same as og:description"));
        } else {
            candidates.push(description_candidate(&text, SOURCE_META));
        }
    }

    if let Some(text) = first_content_paragraph(document) {
        candidates.push(description_candidate(&text, SOURCE_CONTENT));
    }

    dedup_capped(
        collect_found(candidates),
        |s: &DescriptionSuggestion| s.text.clone(),
        MAX_SUGGESTIONS,
    )
}

/// Title suggestions from `og:title`, `<title>` and the first `<h1>`
pub fn extract_titles(document: &Html) -> Vec<TitleSuggestion> {
    let mut titles = Vec::new();

    if let Some(text) = meta_content(document, "og:title") {
        titles.push((text, SOURCE_OPEN_GRAPH));
    }
    if let Some(element) = document.select(&TITLE).next() {
        titles.push((element_text(&element), "page title"));
    }
    if let Some(element) = document.select(&HEADING).next() {
        titles.push((element_text(&element), "heading"));
    }

    let titles = titles
        .into_iter()
        .map(|(text, source)| TitleSuggestion {
            text: truncate(&collapse_whitespace(&text), TITLE_MAX_LENGTH),
            source: source.to_string(),
        })
        .filter(|title| !title.text.is_empty())
        .collect();

    dedup_capped(titles, |t: &TitleSuggestion| t.text.clone(), MAX_SUGGESTIONS)
}

fn normalize(text: &str) -> String {
    truncate_default(&collapse_whitespace(text))
}

fn description_candidate(text: &str, source: &'static str) -> Candidate<DescriptionSuggestion> {
    let text = normalize(text);
    if text.is_empty() {
        return Candidate::skipped(source, "empty text");
    }
    Candidate::Found(DescriptionSuggestion {
        text,
        source: source.to_string(),
    })
}

fn date_candidate(
    source: &'static str,
    start: &str,
    end: Option<&str>,
    label: &str,
    tz: &Tz,
) -> Candidate<DateTimeSuggestion> {
    match normalize_iso(start, tz) {
        Some(iso_start) => Candidate::Found(DateTimeSuggestion {
            start: iso_start,
            end: end.and_then(|end| normalize_iso(end, tz)),
            label: label.to_string(),
            date_only: is_date_only(start) && end.map_or(true, is_date_only),
        }),
        None => Candidate::skipped(source, format!("unparseable date {:?}", start)),
    }
}

/// Every JSON-LD node typed as an Event, plus a skip for each unreadable block
fn json_ld_event_nodes(document: &Html) -> Vec<Candidate<Value>> {
    let mut candidates = Vec::new();

    for script in document.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let parsed: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                candidates.push(Candidate::skipped(SOURCE_STRUCTURED, e.to_string()));
                continue;
            }
        };

        candidates.extend(
            json_ld_nodes(parsed)
                .into_iter()
                .filter(is_event_node)
                .map(Candidate::Found),
        );
    }

    candidates
}

/// Flatten a JSON-LD block: arrays yield their items, objects yield themselves and their `@graph`
fn json_ld_nodes(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            let graph = match object.remove("@graph") {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            let mut nodes = vec![Value::Object(object)];
            nodes.extend(graph);
            nodes
        }
        _ => Vec::new(),
    }
}

fn is_event_node(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(kind)) => kind.contains("Event"),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| kind.contains("Event")),
        _ => false,
    }
}

fn json_ld_dates(document: &Html, tz: &Tz) -> Vec<Candidate<DateTimeSuggestion>> {
    json_ld_event_nodes(document)
        .into_iter()
        .map(|candidate| match candidate {
            Candidate::Found(node) => {
                let Some(start) = node.get("startDate").and_then(Value::as_str) else {
                    return Candidate::skipped(SOURCE_STRUCTURED, "event without startDate");
                };
                let end = node.get("endDate").and_then(Value::as_str);
                let label = node
                    .get("name")
                    .and_then(Value::as_str)
                    .map(collapse_whitespace)
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "Event".to_string());
                date_candidate(SOURCE_STRUCTURED, start, end, &label, tz)
            }
            Candidate::Skipped { source, reason } => Candidate::Skipped { source, reason },
        })
        .collect()
}

/// Microdata item scopes whose type names an Event vocabulary
fn event_scopes(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(&ITEM_SCOPE)
        .filter(|scope| {
            scope
                .value()
                .attr("itemtype")
                .is_some_and(|kind| kind.contains("Event"))
        })
        .collect()
}

/// Value of an `itemprop` belonging to `scope`, preferring properties not owned by a nested scope
fn item_property(scope: &ElementRef, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"[itemprop~="{}"]"#, name)).ok()?;
    let properties: Vec<ElementRef> = scope.select(&selector).collect();

    let owned = properties.iter().find(|property| {
        property
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|ancestor| ancestor.value().attr("itemscope").is_some())
            .is_some_and(|owner| owner.id() == scope.id())
    });

    let property = owned.or_else(|| properties.first())?;
    let value = first_attr(property, &["datetime", "content"])
        .map(str::to_string)
        .unwrap_or_else(|| element_text(property));

    Some(value).filter(|v| !v.is_empty())
}

fn microdata_dates(document: &Html, tz: &Tz) -> Vec<Candidate<DateTimeSuggestion>> {
    event_scopes(document)
        .iter()
        .map(|scope| {
            let Some(start) = item_property(scope, "startDate") else {
                return Candidate::skipped(SOURCE_MICRODATA, "event without startDate");
            };
            let end = item_property(scope, "endDate");
            let label = item_property(scope, "name").unwrap_or_else(|| "Event".to_string());
            date_candidate(SOURCE_MICRODATA, &start, end.as_deref(), &label, tz)
        })
        .collect()
}

fn time_element_dates(document: &Html, tz: &Tz) -> Vec<Candidate<DateTimeSuggestion>> {
    const SOURCE: &str = "time element";

    document
        .select(&TIME_WITH_DATETIME)
        .map(|element| {
            let value = element.value().attr("datetime").unwrap_or("").trim();
            if value.starts_with('P') {
                return Candidate::skipped(SOURCE, format!("duration {:?}", value));
            }
            if is_bare_year(value) {
                return Candidate::skipped(SOURCE, format!("bare year {:?}", value));
            }

            let text = element_text(&element);
            let label = if text.is_empty() { "Page date" } else { text.as_str() };
            date_candidate(SOURCE, value, None, label, tz)
        })
        .collect()
}

/// The first metadata tag with a parseable value fills the single metadata slot
fn meta_dates(document: &Html, tz: &Tz) -> Vec<Candidate<DateTimeSuggestion>> {
    const SOURCE: &str = "meta tag";
    let mut candidates = Vec::new();

    for (key, label) in META_DATE_TAGS {
        let Some(value) = meta_content(document, key) else {
            continue;
        };
        let candidate = date_candidate(SOURCE, &value, None, label, tz);
        let found = matches!(candidate, Candidate::Found(_));
        candidates.push(candidate);
        if found {
            break;
        }
    }

    candidates
}

/// First `<p>` inside `<article>` or `<main>` with enough text to be useful
fn first_content_paragraph(document: &Html) -> Option<String> {
    document
        .select(&CONTENT_PARAGRAPH)
        .map(|paragraph| element_text(&paragraph))
        .find(|text| text.chars().count() > MIN_PARAGRAPH_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(html: &str) -> Vec<DateTimeSuggestion> {
        extract_dates(&Html::parse_document(html), &Tz::UTC)
    }

    fn descriptions(html: &str) -> Vec<DescriptionSuggestion> {
        extract_descriptions(&Html::parse_document(html))
    }

    #[test]
    fn test_json_ld_event_with_graph() {
        let html = r#"<script type="application/ld+json">
            {"@context": "https://schema.org", "@graph": [
                {"@type": "WebPage", "name": "Page"},
                {"@type": ["Thing", "MusicEvent"], "name": "Concert",
                 "startDate": "2024-06-01T19:00:00+02:00", "endDate": "2024-06-01T22:00:00+02:00"}
            ]}
        </script>"#;

        let result = dates(html);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].start, "2024-06-01T17:00:00Z");
        assert_eq!(result[0].end.as_deref(), Some("2024-06-01T20:00:00Z"));
        assert_eq!(result[0].label, "Concert");
    }

    #[test]
    fn test_json_ld_top_level_array_and_default_label() {
        let html = r#"<script type="application/ld+json">
            [{"@type": "Event", "startDate": "2024-06-01", "endDate": "not a date"}]
        </script>"#;

        let result = dates(html);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].label, "Event");
        assert_eq!(result[0].end, None);
    }

    #[test]
    fn test_malformed_json_ld_does_not_stop_other_sources() {
        let html = r#"
            <script type="application/ld+json">{ broken json </script>
            <script type="application/ld+json">{"@type": "Event", "name": "Second", "startDate": "2024-07-01T10:00:00Z"}</script>
            <time datetime="2024-08-01T10:00:00Z">August 1</time>"#;

        let labels: Vec<_> = dates(html).into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Second", "August 1"]);
    }

    #[test]
    fn test_microdata_event() {
        let html = r#"
            <div itemscope itemtype="https://schema.org/Event">
                <span itemprop="name">Workshop</span>
                <meta itemprop="startDate" content="2024-09-10T09:00:00Z">
                <time itemprop="endDate" datetime="2024-09-10T12:00:00Z">noon</time>
                <div itemprop="location" itemscope itemtype="https://schema.org/Place">
                    <span itemprop="name">Hall</span>
                </div>
                <p itemprop="description">Hands-on   session</p>
            </div>"#;

        let result = dates(html);
        assert_eq!(result[0].label, "Workshop");
        assert_eq!(result[0].start, "2024-09-10T09:00:00Z");
        assert_eq!(result[0].end.as_deref(), Some("2024-09-10T12:00:00Z"));

        let descriptions = descriptions(html);
        assert_eq!(descriptions[0].text, "Hands-on session");
        assert_eq!(descriptions[0].source, "microdata");
    }

    #[test]
    fn test_time_elements_skip_durations_and_years() {
        let html = r#"
            <time datetime="PT2H">two hours</time>
            <time datetime="2024">this year</time>
            <time datetime="2024-03-05T10:00:00Z"></time>"#;

        let result = dates(html);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].label, "Page date");
    }

    #[test]
    fn test_meta_dates_first_parseable_tag_wins() {
        let html = r#"<head>
            <meta property="article:published_time" content="garbage">
            <meta property="article:modified_time" content="2024-02-02T08:00:00Z">
            <meta name="date" content="2024-01-01">
        </head>"#;

        let result = dates(html);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].label, "Modified");
        assert_eq!(result[0].start, "2024-02-02T08:00:00Z");
    }

    #[test]
    fn test_dates_keep_priority_order_not_chronological() {
        let html = r#"
            <script type="application/ld+json">{"@type": "Event", "name": "Late", "startDate": "2025-01-01T00:00:00Z"}</script>
            <time datetime="2020-01-01T00:00:00Z">Early</time>"#;

        let labels: Vec<_> = dates(html).into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Late", "Early"]);
    }

    #[test]
    fn test_dates_dedup_and_cap() {
        let html = r#"
            <time datetime="2024-01-01T10:00:00Z">a</time>
            <time datetime="2024-01-02T10:00:00Z">b</time>
            <time datetime="2024-01-01T10:00:00Z">a again</time>
            <time datetime="2024-01-03T10:00:00Z">c</time>
            <time datetime="2024-01-02T10:00:00Z">b again</time>
            <time datetime="2024-01-04T10:00:00Z">d</time>
            <time datetime="2024-01-05T10:00:00Z">e</time>"#;

        let labels: Vec<_> = dates(html).into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_description_sources_in_priority_order() {
        let html = r#"<html><head>
            <meta property="og:description" content="From OG">
            <meta name="description" content="From meta">
            <script type="application/ld+json">{"@type": "Event", "startDate": "2024-01-01", "description": "From JSON-LD"}</script>
            </head><body><main><p>short</p><p>This paragraph is long enough to count.</p></main></body></html>"#;

        let result = descriptions(html);
        let sources: Vec<_> = result.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["structured data", "Open Graph", "meta description", "page content"]
        );
        assert_eq!(result[3].text, "This paragraph is long enough to count.");
    }

    #[test]
    fn test_meta_description_equal_to_og_is_dropped() {
        let html = r#"<head>
            <meta property="og:description" content="Same   text">
            <meta name="description" content="Same text">
        </head>"#;

        let result = descriptions(html);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, "Open Graph");
    }

    #[test]
    fn test_long_description_is_truncated() {
        let long = "word ".repeat(200);
        let html = format!(r#"<meta property="og:description" content="{}">"#, long);
        let result = descriptions(&html);
        assert!(result[0].text.chars().count() <= 501);
        assert!(result[0].text.ends_with('…'));
    }

    #[test]
    fn test_titles() {
        let html = r#"<html><head><title>Site | Concert</title>
            <meta property="og:title" content="Concert"></head>
            <body><h1>Concert</h1></body></html>"#;

        let result = extract_titles(&Html::parse_document(html));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].source, "Open Graph");
        assert_eq!(result[1].text, "Site | Concert");
    }
}
