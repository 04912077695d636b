//! Request assembly for chat turns.

use techdesk_core::config::{AttachmentPolicy, ConfigRoot, DEFAULT_TEMPERATURE};
use techdesk_core::file::UploadedFile;
use techdesk_core::prompts::{self, SYSTEM_INSTRUCTION};
use techdesk_core::request::{GenerationRequest, Part, Turn, TurnRole};

/// How the technician's raw input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Sent verbatim.
    #[default]
    Normal,
    /// The input is a fault code; it is rewritten into a lookup request.
    ErrorCode,
}

impl InputMode {
    /// Produces the utterance handed to the assembler.
    pub fn transform(&self, raw: &str) -> String {
        match self {
            InputMode::Normal => raw.to_string(),
            InputMode::ErrorCode => prompts::error_code_prompt(raw.trim()),
        }
    }
}

/// Builds chat requests from history, attached files, and the new utterance.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_instruction: String,
    temperature: f32,
    attachment_policy: AttachmentPolicy,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            attachment_policy: AttachmentPolicy::default(),
        }
    }
}

impl PromptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ConfigRoot) -> Self {
        Self::default()
            .with_temperature(config.model.temperature)
            .with_attachment_policy(config.prompt.attachment_policy)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_attachment_policy(mut self, policy: AttachmentPolicy) -> Self {
        self.attachment_policy = policy;
        self
    }

    pub fn attachment_policy(&self) -> AttachmentPolicy {
        self.attachment_policy
    }

    /// Assembles the request for one turn.
    ///
    /// History is copied verbatim; the final turn is a `user` turn holding
    /// one attachment block per file (subject to the attachment policy)
    /// followed by the utterance text.
    pub fn assemble(
        &self,
        history: &[Turn],
        files: &[UploadedFile],
        utterance: &str,
    ) -> GenerationRequest {
        let mut parts: Vec<Part> = if self.attaches_files(history) {
            files.iter().map(Part::attachment).collect()
        } else {
            Vec::new()
        };
        parts.push(Part::text(utterance));

        let mut contents = history.to_vec();
        contents.push(Turn::new(TurnRole::User, parts));

        GenerationRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            temperature: self.temperature,
        }
    }

    fn attaches_files(&self, history: &[Turn]) -> bool {
        match self.attachment_policy {
            AttachmentPolicy::EveryTurn => true,
            AttachmentPolicy::FirstTurnOnly => !history.iter().any(|t| t.role == TurnRole::User),
        }
    }
}
