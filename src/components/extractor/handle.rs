use super::actor::{PageActor, PageActorHandle};
use super::models::{ExtractionRequest, ExtractionResponse, Selection};
use super::PageContext;
use crate::error::AppResult;
use async_trait::async_trait;
use chrono_tz::Tz;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;

/// Handle for interacting with a page snapshot
#[derive(Clone)]
pub struct PageHandle {
    actor_handle: PageActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl PageHandle {
    /// Create a new PageHandle for `html` and spawn the actor
    pub fn new(html: impl Into<String>, timezone: Tz) -> Self {
        let (mut actor, handle) = PageActor::new(html, timezone);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Load a saved page from disk
    pub async fn from_file(path: impl AsRef<Path>, timezone: Tz) -> AppResult<Self> {
        let html = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(html, timezone))
    }

    /// Start selection-context extraction now and collect the result later
    ///
    /// Selection state is ephemeral on the host side, so the request is sent
    /// immediately; the returned value resolves whenever the page answers.
    pub fn capture_selection_context(&self, selection: Selection) -> PendingContext {
        let (tx, rx) = oneshot::channel();
        let page = self.clone();

        tokio::spawn(async move {
            let context = match page.selection_context(selection).await {
                Ok(context) => context,
                Err(e) => {
                    warn!("Selection context extraction failed: {}", e);
                    None
                }
            };
            let _ = tx.send(context);
        });

        PendingContext { rx }
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl PageContext for PageHandle {
    async fn run(&self, request: ExtractionRequest) -> AppResult<ExtractionResponse> {
        self.actor_handle.run(request).await
    }
}

/// Selection context requested earlier and not yet delivered
pub struct PendingContext {
    rx: oneshot::Receiver<Option<String>>,
}

impl PendingContext {
    /// Wait for the context; a lost page yields `None`
    pub async fn resolve(self) -> Option<String> {
        self.rx.await.ok().flatten()
    }
}
