//! RFC 5545 text escaping and content-line folding.

use super::models::LineEnding;

/// Longest physical line, in octets, excluding the terminator
pub const MAX_LINE_OCTETS: usize = 75;

/// Escape a TEXT property value
///
/// Backslashes are escaped before anything else so the backslash introduced
/// for a newline is never escaped a second time. Every line break (`\r\n`,
/// `\n` or a lone `\r`) becomes `\n`, since TEXT values may not carry raw
/// control characters; unescaping therefore yields `\n`-only line breaks.
pub fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace(['\n', '\r'], "\\n")
}

/// Reverse [`escape_text`]
pub fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

/// UTF-8 continuation bytes look like `10xxxxxx`
fn is_continuation_byte(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// Fold one content line into chunks of at most 75 octets
///
/// Continuations start with a single space, so they carry at most 74 octets
/// of the original line. Splits never land inside a multi-byte character.
pub fn fold_line(line: &str, line_ending: LineEnding) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut chunks = Vec::new();
    let mut rest = line;
    let mut limit = MAX_LINE_OCTETS;

    while rest.len() > limit {
        let bytes = rest.as_bytes();
        let mut split = limit;
        while split > 0 && is_continuation_byte(bytes[split]) {
            split -= 1;
        }

        let (chunk, tail) = rest.split_at(split);
        chunks.push(chunk);
        rest = tail;
        limit = MAX_LINE_OCTETS - 1;
    }
    chunks.push(rest);

    chunks.join(&format!("{} ", line_ending.as_str()))
}

/// Undo folding: drop every line break that is followed by a single space
pub fn unfold(text: &str) -> String {
    text.replace("\r\n ", "").replace("\n ", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape_text(r"a\b;c,d"), r"a\\b\;c\,d");
        assert_eq!(escape_text("line1\nline2\r\nline3"), r"line1\nline2\nline3");
    }

    #[test]
    fn test_escape_backslash_before_newline() {
        // A literal backslash followed by "n" must stay distinguishable from a newline
        assert_eq!(escape_text("\\n\n"), r"\\n\n");
        assert_eq!(unescape_text(&escape_text("\\n\n")), "\\n\n");
    }

    #[test]
    fn test_escape_round_trip() {
        let samples = [
            "plain",
            "semi;colon, comma\\backslash",
            "multi\nline\ntext",
            "\\\\;;,,\n\n",
            "ends with backslash\\",
            "ünïcödé, 日本語; \\ \n",
        ];
        for sample in samples {
            assert_eq!(unescape_text(&escape_text(sample)), sample, "sample {:?}", sample);
        }
    }

    #[test]
    fn test_escape_normalizes_carriage_returns() {
        assert_eq!(escape_text("a\rb"), r"a\nb");
        assert!(!escape_text("a\rb\r\nc").contains('\r'));
        assert_eq!(unescape_text(&escape_text("a\rb\r\nc\nd")), "a\nb\nc\nd");
    }

    #[test]
    fn test_short_line_is_untouched() {
        let line = "S".repeat(MAX_LINE_OCTETS);
        assert_eq!(fold_line(&line, LineEnding::Crlf), line);
    }

    #[test]
    fn test_fold_ascii_chunk_sizes() {
        let line = "x".repeat(200);
        let folded = fold_line(&line, LineEnding::Crlf);
        let physical: Vec<&str> = folded.split("\r\n").collect();

        assert_eq!(physical[0].len(), 75);
        assert_eq!(physical[1].len(), 75);
        assert!(physical[1].starts_with(' '));
        assert!(physical.iter().all(|l| l.len() <= MAX_LINE_OCTETS));
        assert_eq!(unfold(&folded), line);
    }

    #[test]
    fn test_fold_never_splits_multibyte_characters() {
        for prefix in 0..4 {
            let line = format!("{}{}", "a".repeat(prefix), "€😀ä".repeat(40));
            for ending in [LineEnding::Crlf, LineEnding::Lf] {
                let folded = fold_line(&line, ending);
                for physical in folded.split(ending.as_str()) {
                    assert!(physical.len() <= MAX_LINE_OCTETS);
                }
                assert_eq!(unfold(&folded), line);
            }
        }
    }

    #[test]
    fn test_fold_uses_lf_when_requested() {
        let folded = fold_line(&"y".repeat(100), LineEnding::Lf);
        assert!(!folded.contains('\r'));
        assert_eq!(folded.matches("\n ").count(), 1);
    }
}
