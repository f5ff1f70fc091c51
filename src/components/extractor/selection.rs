use super::models::Selection;
use crate::utils::dom::{display_of, element_text, find_text_anchor, parse_selector};
use crate::utils::text::truncate_default;
use scraper::{ElementRef, Html};
use tracing::debug;

const MIN_SIBLING_LENGTH: usize = 10;

/// Text that follows the block containing the user's selection
///
/// Walks from the anchor up to the nearest block-level element (or the root),
/// then returns the first following sibling element with more than ten
/// characters of text.
pub fn selection_context(document: &Html, selection: &Selection) -> Option<String> {
    let anchor = resolve_anchor(document, selection)?;
    let container = block_container(anchor);
    debug!("Selection container is <{}>", container.value().name());

    container
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .map(|sibling| element_text(&sibling))
        .find(|text| text.chars().count() > MIN_SIBLING_LENGTH)
        .map(|text| truncate_default(&text))
}

fn resolve_anchor<'a>(document: &'a Html, selection: &Selection) -> Option<ElementRef<'a>> {
    match selection {
        Selection::Quote(quote) => find_text_anchor(document, quote),
        Selection::Selector(css) => {
            let selector = parse_selector(css)?;
            document.select(&selector).next()
        }
    }
}

fn block_container(anchor: ElementRef<'_>) -> ElementRef<'_> {
    let mut current = anchor;
    loop {
        if display_of(&current).is_block_level() {
            return current;
        }
        match current.parent().and_then(ElementRef::wrap) {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}
