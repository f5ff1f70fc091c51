use crate::components::caldav::{CalDavClient, CreatedEvent};
use crate::components::draft::EventDraft;
use crate::components::extractor::{ExtractionRequest, PageContext, PageHandle, Selection};
use crate::error::AppResult;
use crate::settings::Settings;
use chrono_tz::Tz;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

/// Ask the page for every kind of suggestion at once and merge each answer as it lands
pub async fn gather_suggestions<P>(page: &P, draft: &mut EventDraft)
where
    P: PageContext + ?Sized,
{
    let mut pending: FuturesUnordered<_> = [
        ExtractionRequest::Titles,
        ExtractionRequest::Dates,
        ExtractionRequest::Descriptions,
    ]
    .into_iter()
    .map(|request| page.run(request))
    .collect();

    while let Some(result) = pending.next().await {
        match result {
            Ok(response) => draft.apply_response(response),
            Err(e) => warn!("Extraction request failed: {}", e),
        }
    }
}

/// Build a draft for a page: selection context first, then all suggestions
pub async fn prepare_draft(
    page: &PageHandle,
    url: Option<String>,
    selection: Option<Selection>,
) -> EventDraft {
    let (mut draft, token) = EventDraft::new(url);

    // Fired before anything else; the selection is only meaningful right now
    let pending_context = selection.map(|selection| page.capture_selection_context(selection));

    gather_suggestions(page, &mut draft).await;

    if let Some(pending) = pending_context {
        draft.apply_selection_context(token, pending.resolve().await);
    }

    info!(
        "Draft ready with {} title, {} date and {} description suggestions",
        draft.title_suggestions().len(),
        draft.date_suggestions().len(),
        draft.description_suggestions().len()
    );
    draft
}

/// Validate the draft and write it to the calendar
pub async fn publish(
    draft: &EventDraft,
    tz: &Tz,
    client: &CalDavClient,
    settings: &Settings,
) -> AppResult<CreatedEvent> {
    let event = draft.finalize(tz)?;
    client.create_event(&event, settings).await
}
