//! Streaming chat turns.
//!
//! A turn moves through `Sent` → `Streaming` → `Done`. The controller opens
//! the turn and hands back a [`PendingTurn`], a pull-based sequence of text
//! fragments that folds each fragment into the session as it is pulled.

use std::sync::Arc;

use futures::StreamExt;
use techdesk_core::client::{FragmentStream, ModelClient};
use techdesk_core::error::{Result, TechdeskError};
use techdesk_core::prompts::TURN_FAILURE_NOTICE;
use techdesk_core::session::Session;
use techdesk_interaction::PromptAssembler;
use tokio::sync::RwLock;

/// Progress of a single chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Request dispatched, no fragment received yet.
    Sent,
    /// At least one fragment has been applied.
    Streaming,
    /// The placeholder is final.
    Done,
}

/// Final result of a turn once it has been drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub message_id: String,
    /// Concatenation of every fragment in arrival order.
    pub text: String,
    /// True if the turn ended with the failure notice.
    pub failed: bool,
}

/// Opens chat turns against a shared session.
#[derive(Clone)]
pub struct ChatController {
    session: Arc<RwLock<Session>>,
    client: Arc<dyn ModelClient>,
    assembler: PromptAssembler,
}

impl ChatController {
    pub fn new(
        session: Arc<RwLock<Session>>,
        client: Arc<dyn ModelClient>,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            session,
            client,
            assembler,
        }
    }

    /// Starts a turn for `text`.
    ///
    /// Appends the user message and a streaming assistant placeholder, then
    /// dispatches the request. A dispatch failure does not fail this call: it
    /// surfaces as the failure notice on the first pull of the returned turn.
    ///
    /// # Errors
    ///
    /// `SessionBusy` while another turn is streaming, `NoActiveManual` before
    /// any manual has been loaded.
    pub async fn start_turn(&self, text: &str) -> Result<PendingTurn> {
        let (start, files) = {
            let mut session = self.session.write().await;
            let start = session.begin_turn(text)?;
            (start, session.files().to_vec())
        };

        // Built before dispatch so dropping this future still releases the placeholder.
        let mut turn = PendingTurn {
            session: Arc::clone(&self.session),
            message_id: start.placeholder_id,
            source: FragmentSource::Failed(None),
            accumulated: String::new(),
            state: TurnState::Sent,
            failed: false,
        };

        let request = self.assembler.assemble(&start.history, &files, text);
        tracing::info!(
            message_id = %turn.message_id,
            history = start.history.len(),
            attachments = files.len(),
            "Starting chat turn"
        );

        turn.source = match self.client.generate_streamed(request).await {
            Ok(stream) => FragmentSource::Stream(stream),
            Err(err) => FragmentSource::Failed(Some(err)),
        };
        Ok(turn)
    }
}

enum FragmentSource {
    Stream(FragmentStream),
    /// Dispatch failed (or has not finished); a held error is reported on the first pull.
    Failed(Option<TechdeskError>),
}

/// An in-flight turn. Finite and not restartable.
pub struct PendingTurn {
    session: Arc<RwLock<Session>>,
    message_id: String,
    source: FragmentSource,
    accumulated: String,
    state: TurnState,
    failed: bool,
}

impl PendingTurn {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Pulls the next fragment and applies it to the placeholder.
    ///
    /// Returns `None` once the turn is done. A failure yields the fixed
    /// notice as the last fragment.
    pub async fn next_fragment(&mut self) -> Option<String> {
        if self.state == TurnState::Done {
            return None;
        }

        let next = match &mut self.source {
            FragmentSource::Stream(stream) => stream.next().await,
            FragmentSource::Failed(err) => err.take().map(Err),
        };

        match next {
            Some(Ok(fragment)) => {
                self.state = TurnState::Streaming;
                self.apply(&fragment).await;
                Some(fragment)
            }
            Some(Err(err)) => {
                tracing::error!(message_id = %self.message_id, error = %err, "Chat turn failed");
                self.failed = true;
                self.apply(TURN_FAILURE_NOTICE).await;
                self.complete().await;
                Some(TURN_FAILURE_NOTICE.to_string())
            }
            None => {
                self.complete().await;
                None
            }
        }
    }

    /// Drains the remaining fragments.
    pub async fn finish(mut self) -> TurnOutcome {
        while self.next_fragment().await.is_some() {}
        TurnOutcome {
            message_id: self.message_id.clone(),
            text: std::mem::take(&mut self.accumulated),
            failed: self.failed,
        }
    }

    async fn apply(&mut self, fragment: &str) {
        self.accumulated.push_str(fragment);
        let applied = self
            .session
            .write()
            .await
            .apply_fragment_text(&self.message_id, &self.accumulated);
        if !applied {
            // Session was reset underneath us.
            tracing::debug!(message_id = %self.message_id, "Dropping fragment for a removed message");
        }
    }

    async fn complete(&mut self) {
        self.state = TurnState::Done;
        self.session.write().await.finish_streaming(&self.message_id);
        tracing::info!(
            message_id = %self.message_id,
            chars = self.accumulated.len(),
            failed = self.failed,
            "Chat turn finished"
        );
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        // An abandoned turn must not leave the session busy.
        if self.state == TurnState::Done {
            return;
        }
        if let Ok(mut session) = self.session.try_write() {
            session.finish_streaming(&self.message_id);
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = Arc::clone(&self.session);
                let message_id = std::mem::take(&mut self.message_id);
                handle.spawn(async move {
                    session.write().await.finish_streaming(&message_id);
                });
            }
            Err(_) => {
                tracing::warn!(message_id = %self.message_id, "Abandoned turn left streaming: no runtime");
            }
        }
    }
}
