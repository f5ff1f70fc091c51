mod actor;
mod handle;
pub mod models;
pub mod selection;
pub mod sources;

pub use actor::handle_request;
pub use handle::{PageHandle, PendingContext};
pub use models::{
    DateTimeSuggestion, DescriptionSuggestion, ExtractionRequest, ExtractionResponse, Selection,
    TitleSuggestion,
};

use crate::error::{page_error, AppResult};
use async_trait::async_trait;

/// A page that evaluates extraction requests in its own context
///
/// Only serializable requests and responses cross this boundary.
#[async_trait]
pub trait PageContext: Send + Sync {
    /// Evaluate one request against the page
    async fn run(&self, request: ExtractionRequest) -> AppResult<ExtractionResponse>;

    /// Date/time suggestions
    async fn dates(&self) -> AppResult<Vec<DateTimeSuggestion>> {
        match self.run(ExtractionRequest::Dates).await? {
            ExtractionResponse::Dates(items) => Ok(items),
            other => Err(unexpected(&other)),
        }
    }

    /// Description suggestions
    async fn descriptions(&self) -> AppResult<Vec<DescriptionSuggestion>> {
        match self.run(ExtractionRequest::Descriptions).await? {
            ExtractionResponse::Descriptions(items) => Ok(items),
            other => Err(unexpected(&other)),
        }
    }

    /// Title suggestions
    async fn titles(&self) -> AppResult<Vec<TitleSuggestion>> {
        match self.run(ExtractionRequest::Titles).await? {
            ExtractionResponse::Titles(items) => Ok(items),
            other => Err(unexpected(&other)),
        }
    }

    /// Text following the block that holds the selection
    async fn selection_context(&self, selection: Selection) -> AppResult<Option<String>> {
        match self
            .run(ExtractionRequest::SelectionContext { selection })
            .await?
        {
            ExtractionResponse::SelectionContext(text) => Ok(text),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(response: &ExtractionResponse) -> crate::error::Error {
    page_error(&format!("Unexpected response from page: {:?}", response))
}
