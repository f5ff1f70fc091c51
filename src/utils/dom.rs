use crate::utils::text::collapse_whitespace;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    static ref INLINE_DISPLAY: Regex =
        Regex::new(r"(?i)(?:^|;)\s*display\s*:\s*([a-z-]+)").unwrap();
}

/// CSS display value of an element, as far as markup alone can tell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
    Grid,
    ListItem,
    Inline,
    None,
    Other(String),
}

impl Display {
    fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "block" => Display::Block,
            "flex" => Display::Flex,
            "grid" => Display::Grid,
            "list-item" => Display::ListItem,
            "inline" => Display::Inline,
            "none" => Display::None,
            other => Display::Other(other.to_string()),
        }
    }

    /// Block-level for the purpose of finding a selection's container
    pub fn is_block_level(&self) -> bool {
        matches!(
            self,
            Display::Block | Display::Flex | Display::Grid | Display::ListItem
        )
    }
}

/// Default display of an HTML tag per the user-agent stylesheet
fn default_display(tag: &str) -> Display {
    match tag {
        "address" | "article" | "aside" | "blockquote" | "body" | "center" | "dd" | "details"
        | "dialog" | "dir" | "div" | "dl" | "dt" | "fieldset" | "figcaption" | "figure"
        | "footer" | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hgroup"
        | "hr" | "html" | "legend" | "main" | "menu" | "nav" | "ol" | "p" | "pre" | "section"
        | "summary" | "ul" => Display::Block,
        "li" => Display::ListItem,
        "head" | "script" | "style" | "template" | "title" | "meta" | "link" | "noscript" => {
            Display::None
        }
        "table" => Display::Other("table".to_string()),
        "tr" => Display::Other("table-row".to_string()),
        "td" | "th" => Display::Other("table-cell".to_string()),
        _ => Display::Inline,
    }
}

/// Resolve an element's display from its inline style, falling back to the tag default
pub fn display_of(element: &ElementRef) -> Display {
    if let Some(style) = element.value().attr("style") {
        if let Some(caps) = INLINE_DISPLAY.captures_iter(style).last() {
            return Display::from_keyword(&caps[1]);
        }
    }
    default_display(element.value().name())
}

/// Visible-ish text of an element with whitespace collapsed
pub fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Parse a selector, treating an invalid one as matching nothing
pub fn parse_selector(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

/// First non-empty attribute among `names`, in order
pub fn first_attr<'a>(element: &ElementRef<'a>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// `content` attribute of the first `<meta>` whose `property` or `name` equals `key`
pub fn meta_content(document: &Html, key: &str) -> Option<String> {
    let selector = parse_selector(&format!(r#"meta[property="{0}"], meta[name="{0}"]"#, key))?;
    document
        .select(&selector)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Deepest element, in document order, whose text contains `quote`
pub fn find_text_anchor<'a>(document: &'a Html, quote: &str) -> Option<ElementRef<'a>> {
    let quote = collapse_whitespace(quote);
    if quote.is_empty() {
        return None;
    }

    let contains = |element: &ElementRef| element_text(element).contains(&quote);

    let mut current = document.root_element();
    if !contains(&current) {
        return None;
    }

    loop {
        let next = current
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| contains(child));
        match next {
            Some(child) => current = child,
            None => return Some(current),
        }
    }
}
