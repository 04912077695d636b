//! Session domain model.
//!
//! A session holds everything the technician sees for one manual set:
//! the loaded files, the conversation log, the extracted maintenance
//! tasks, progress flags, and the active view.

use super::message::{Message, MessageRole};
use super::view::ActiveView;
use crate::error::{Result, TechdeskError};
use crate::file::UploadedFile;
use crate::maintenance::MaintenanceItem;
use crate::prompts;
use crate::request::{Turn, TurnRole};
use serde::Serialize;
use uuid::Uuid;

/// Number of log entries below which suggested queries are offered.
const SUGGESTION_THRESHOLD: usize = 3;

/// Handles produced when a chat turn is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnStart {
    /// Conversation preceding this turn, in model terms.
    pub history: Vec<Turn>,
    /// Id of the streaming assistant placeholder.
    pub placeholder_id: String,
}

/// Client-side state for one uploaded document set and its conversation.
///
/// Invariants kept by every mutating method:
/// - at most one message has `is_streaming == true`
/// - maintenance items are only ever replaced as a whole
/// - `files` is non-empty exactly when `active_view` is not `Upload`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    id: String,
    created_at: String,
    files: Vec<UploadedFile>,
    messages: Vec<Message>,
    maintenance_items: Vec<MaintenanceItem>,
    is_processing: bool,
    is_analyzing: bool,
    active_view: ActiveView,
    /// Bumped whenever the file set changes; stale extraction results carry an old epoch.
    extraction_epoch: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            files: Vec::new(),
            messages: Vec::new(),
            maintenance_items: Vec::new(),
            is_processing: false,
            is_analyzing: false,
            active_view: ActiveView::Upload,
            extraction_epoch: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn maintenance_items(&self) -> &[MaintenanceItem] {
        &self.maintenance_items
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    pub fn extraction_epoch(&self) -> u64 {
        self.extraction_epoch
    }

    pub fn has_manual(&self) -> bool {
        !self.files.is_empty()
    }

    pub fn set_processing(&mut self, value: bool) {
        self.is_processing = value;
    }

    pub fn set_analyzing(&mut self, value: bool) {
        self.is_analyzing = value;
    }

    /// The message currently receiving fragments, if any.
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_streaming)
    }

    /// True while a chat turn is in flight; new turns must be refused.
    pub fn is_busy(&self) -> bool {
        self.streaming_message().is_some()
    }

    /// Whether suggested queries should be offered.
    pub fn shows_suggestions(&self) -> bool {
        self.has_manual() && self.messages.len() < SUGGESTION_THRESHOLD && !self.is_busy()
    }

    /// Finds a message by id.
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Installs a new manual set.
    ///
    /// Clears the log and extracted tasks, seeds the introductory assistant
    /// message naming the first file, and switches to the chat view.
    /// Returns the extraction epoch that results for this file set must carry.
    pub fn replace_files(&mut self, files: Vec<UploadedFile>) -> Result<u64> {
        let first_name = files
            .first()
            .map(|file| file.name.clone())
            .ok_or(TechdeskError::NoActiveManual)?;
        if self.is_busy() {
            return Err(TechdeskError::SessionBusy);
        }

        self.files = files;
        self.messages = vec![Message::assistant(prompts::introduction(&first_name))];
        self.maintenance_items.clear();
        self.is_analyzing = false;
        self.active_view = ActiveView::Chat;
        self.extraction_epoch += 1;
        Ok(self.extraction_epoch)
    }

    /// Appends a message to the log.
    ///
    /// A streaming message is refused while another one is still streaming.
    pub fn push_message(&mut self, message: Message) -> Result<()> {
        if message.is_streaming && self.is_busy() {
            return Err(TechdeskError::SessionBusy);
        }
        self.messages.push(message);
        Ok(())
    }

    /// Opens a chat turn: appends the user message and the streaming
    /// assistant placeholder, and returns the history that preceded them.
    pub fn begin_turn(&mut self, text: impl Into<String>) -> Result<TurnStart> {
        if !self.has_manual() {
            return Err(TechdeskError::NoActiveManual);
        }
        if self.is_busy() {
            return Err(TechdeskError::SessionBusy);
        }

        let history = self.history();
        let placeholder = Message::assistant_placeholder();
        let placeholder_id = placeholder.id.clone();

        self.messages.push(Message::user(text));
        self.messages.push(placeholder);

        Ok(TurnStart {
            history,
            placeholder_id,
        })
    }

    /// Replaces the text of a streaming message.
    ///
    /// Returns false (and changes nothing) if the message is gone or final.
    pub fn apply_fragment_text(&mut self, id: &str, text: &str) -> bool {
        match self
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.is_streaming)
        {
            Some(message) => {
                message.text.clear();
                message.text.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Marks a streaming message final.
    pub fn finish_streaming(&mut self, id: &str) -> bool {
        match self
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.is_streaming)
        {
            Some(message) => {
                message.is_streaming = false;
                true
            }
            None => false,
        }
    }

    /// Wholesale replaces the maintenance task list.
    ///
    /// Results tagged with an epoch other than the current one belong to a
    /// file set that has since been replaced or reset, and are dropped.
    pub fn replace_maintenance_items(&mut self, epoch: u64, items: Vec<MaintenanceItem>) -> bool {
        if epoch != self.extraction_epoch {
            return false;
        }
        self.maintenance_items = items;
        true
    }

    /// Switches between chat and dashboard.
    pub fn set_view(&mut self, view: ActiveView) -> Result<()> {
        if view.requires_manual() != self.has_manual() {
            return Err(TechdeskError::NoActiveManual);
        }
        self.active_view = view;
        Ok(())
    }

    /// Clears files, log, and tasks, and returns to the upload view.
    pub fn reset(&mut self) {
        self.files.clear();
        self.messages.clear();
        self.maintenance_items.clear();
        self.is_processing = false;
        self.is_analyzing = false;
        self.active_view = ActiveView::Upload;
        self.extraction_epoch += 1;
    }

    /// The log as model turns: user messages map to `user`, everything else to `model`.
    ///
    /// Messages without text (e.g. a reply the model produced nothing for) are
    /// skipped; the API rejects empty text parts.
    pub fn history(&self) -> Vec<Turn> {
        self.messages
            .iter()
            .filter(|message| !message.text.trim().is_empty())
            .map(|message| {
                let role = match message.role {
                    MessageRole::User => TurnRole::User,
                    MessageRole::Assistant | MessageRole::System => TurnRole::Model,
                };
                Turn::text(role, message.text.clone())
            })
            .collect()
    }
}
