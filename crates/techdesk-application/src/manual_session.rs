//! The technician's workspace: manual loading, chat, dashboard, and reset.

use std::path::PathBuf;
use std::sync::Arc;

use techdesk_core::client::ModelClient;
use techdesk_core::error::Result;
use techdesk_core::file::UploadedFile;
use techdesk_core::session::{ActiveView, Session};
use techdesk_infrastructure::encode_file;
use techdesk_interaction::{InputMode, PromptAssembler};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::chat::{ChatController, PendingTurn};
use crate::dashboard::DashboardSummary;
use crate::extraction::ExtractionPipeline;

/// Owns the session state and the services that act on it.
#[derive(Clone)]
pub struct ManualSession {
    session: Arc<RwLock<Session>>,
    chat: ChatController,
    extraction: ExtractionPipeline,
}

impl ManualSession {
    pub fn new(client: Arc<dyn ModelClient>, assembler: PromptAssembler) -> Self {
        let session = Arc::new(RwLock::new(Session::new()));
        let chat = ChatController::new(Arc::clone(&session), Arc::clone(&client), assembler);
        Self {
            session,
            chat,
            extraction: ExtractionPipeline::new(client),
        }
    }

    /// Shared handle to the underlying state.
    pub fn state(&self) -> Arc<RwLock<Session>> {
        Arc::clone(&self.session)
    }

    /// Point-in-time copy of the session.
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Encodes files from disk and loads them as the new manual set.
    ///
    /// `is_processing` is set while encoding. The first unreadable or
    /// unsupported file aborts the upload and leaves the previous set in place.
    pub async fn upload(&self, paths: &[PathBuf]) -> Result<JoinHandle<()>> {
        self.session.write().await.set_processing(true);

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match encode_file(path).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Upload aborted");
                    self.session.write().await.set_processing(false);
                    return Err(e);
                }
            }
        }

        self.session.write().await.set_processing(false);
        self.load_manuals(files).await
    }

    /// Installs `files` and starts the background extraction.
    ///
    /// The returned handle completes once the extraction result has been
    /// applied or discarded as stale.
    ///
    /// # Errors
    ///
    /// `NoActiveManual` for an empty file set, `SessionBusy` while a turn streams.
    pub async fn load_manuals(&self, files: Vec<UploadedFile>) -> Result<JoinHandle<()>> {
        let epoch = {
            let mut session = self.session.write().await;
            let epoch = session.replace_files(files.clone())?;
            session.set_analyzing(true);
            epoch
        };
        tracing::info!(files = files.len(), epoch, "Loaded manuals");

        let session = Arc::clone(&self.session);
        let pipeline = self.extraction.clone();
        Ok(tokio::spawn(async move {
            let items = pipeline.extract(&files).await;
            let mut session = session.write().await;
            if session.replace_maintenance_items(epoch, items) {
                session.set_analyzing(false);
            } else {
                tracing::debug!(epoch, "Discarding stale extraction result");
            }
        }))
    }

    /// Starts a chat turn from raw technician input.
    pub async fn submit_turn(&self, raw: &str, mode: InputMode) -> Result<PendingTurn> {
        self.chat.start_turn(&mode.transform(raw)).await
    }

    pub async fn set_view(&self, view: ActiveView) -> Result<()> {
        self.session.write().await.set_view(view)
    }

    /// Returns to the empty upload state. Idempotent.
    pub async fn reset(&self) {
        self.session.write().await.reset();
        tracing::info!("Session reset");
    }

    pub async fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::from_session(&*self.session.read().await)
    }
}
