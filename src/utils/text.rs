/// Default maximum length of suggestion and description text, in characters
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// Marker appended to truncated text
pub const ELLIPSIS: char = '…';

const SOURCE_PREFIX: &str = "Source: ";

/// Truncate text to at most `max_length` characters, preferring a word boundary
///
/// The text is trimmed first. When it is still too long it is cut at
/// `max_length`; if the last whitespace inside the cut lies past the middle
/// of the allowed length, the cut moves back to that whitespace. An ellipsis
/// is appended to anything that was shortened.
pub fn truncate(text: &str, max_length: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_length {
        return trimmed.to_string();
    }

    let cut: Vec<char> = trimmed.chars().take(max_length).collect();
    let last_space = cut.iter().rposition(|c| c.is_whitespace());

    let end = match last_space {
        Some(pos) if pos * 2 > max_length => pos,
        _ => max_length,
    };

    let mut result: String = cut[..end].iter().collect();
    result.push(ELLIPSIS);
    result
}

/// Truncate with the default limit
pub fn truncate_default(text: &str) -> String {
    truncate(text, DEFAULT_MAX_LENGTH)
}

/// Collapse every run of whitespace into a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the final description: body, blank line, then a `Source:` footer
pub fn build_description(body: &str, url: Option<&str>) -> String {
    let mut parts = Vec::new();

    let body = body.trim();
    if !body.is_empty() {
        parts.push(body.to_string());
    }

    if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
        parts.push(format!("{}{}", SOURCE_PREFIX, url));
    }

    parts.join("\n\n")
}

/// Remove a trailing `Source:` footer written by [`build_description`]
///
/// Lets a host rebuild the description after edits without stacking footers.
pub fn strip_source_footer(description: &str) -> String {
    let trimmed = description.trim_end();
    match trimmed.rfind('\n') {
        Some(idx) if trimmed[idx + 1..].starts_with(SOURCE_PREFIX) => {
            trimmed[..idx].trim_end().to_string()
        }
        None if trimmed.starts_with(SOURCE_PREFIX) => String::new(),
        _ => trimmed.to_string(),
    }
}
