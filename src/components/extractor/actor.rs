use super::models::{ExtractionRequest, ExtractionResponse};
use super::{selection, sources};
use crate::error::{page_error, AppResult};
use chrono_tz::Tz;
use scraper::Html;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// The page actor that owns a snapshot of one document
pub struct PageActor {
    html: Arc<str>,
    timezone: Tz,
    command_rx: mpsc::Receiver<PageCommand>,
}

/// Commands that can be sent to the page actor
pub enum PageCommand {
    Run(ExtractionRequest, oneshot::Sender<ExtractionResponse>),
    Shutdown,
}

/// Handle for communicating with the page actor
#[derive(Clone)]
pub struct PageActorHandle {
    command_tx: mpsc::Sender<PageCommand>,
}

impl PageActorHandle {
    /// Run an extraction request against the snapshot
    pub async fn run(&self, request: ExtractionRequest) -> AppResult<ExtractionResponse> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(PageCommand::Run(request, response_tx))
            .await
            .map_err(|e| page_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| page_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(PageCommand::Shutdown).await;
        Ok(())
    }
}

impl PageActor {
    /// Create a new actor and return its handle
    pub fn new(html: impl Into<String>, timezone: Tz) -> (Self, PageActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            html: Arc::from(html.into()),
            timezone,
            command_rx,
        };

        (actor, PageActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Page actor started ({} bytes)", self.html.len());

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                PageCommand::Run(request, response_tx) => {
                    // Each request parses its own copy of the snapshot, so
                    // requests never share a tree and may run in parallel.
                    let html = Arc::clone(&self.html);
                    let timezone = self.timezone;
                    tokio::task::spawn_blocking(move || {
                        let response = handle_request(&html, &timezone, request);
                        if response_tx.send(response).is_err() {
                            debug!("Extraction result arrived after the requester went away");
                        }
                    });
                }
                PageCommand::Shutdown => {
                    info!("Page actor shutting down");
                    break;
                }
            }
        }

        info!("Page actor shut down");
    }
}

/// Evaluate one request against a freshly parsed snapshot
pub fn handle_request(html: &str, timezone: &Tz, request: ExtractionRequest) -> ExtractionResponse {
    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        warn!("Page markup has {} parse errors", document.errors.len());
    }

    match request {
        ExtractionRequest::Dates => ExtractionResponse::Dates(sources::extract_dates(&document, timezone)),
        ExtractionRequest::Descriptions => {
            ExtractionResponse::Descriptions(sources::extract_descriptions(&document))
        }
        ExtractionRequest::Titles => ExtractionResponse::Titles(sources::extract_titles(&document)),
        ExtractionRequest::SelectionContext { selection } => {
            ExtractionResponse::SelectionContext(selection::selection_context(&document, &selection))
        }
    }
}
