//! Strongly-typed model requests.
//!
//! These are vendor-neutral; the interaction layer maps them onto the wire
//! format of the hosted API.

use serde_json::{Value, json};

use crate::file::UploadedFile;

/// Author of a turn as seen by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One content block inside a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text { text: String },
    InlineData { mime_type: String, data: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Attachment block for an uploaded file.
    pub fn attachment(file: &UploadedFile) -> Self {
        Part::InlineData {
            mime_type: file.mime_type.clone(),
            data: file.data.clone(),
        }
    }

    pub fn is_attachment(&self) -> bool {
        matches!(self, Part::InlineData { .. })
    }
}

/// A single turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn new(role: TurnRole, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    pub fn text(role: TurnRole, text: impl Into<String>) -> Self {
        Self::new(role, vec![Part::text(text)])
    }

    /// Number of attachment blocks in this turn.
    pub fn attachment_count(&self) -> usize {
        self.parts.iter().filter(|part| part.is_attachment()).count()
    }
}

/// Request for incremental (streamed) text generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub contents: Vec<Turn>,
    /// Behavioral instruction sent on the system channel, never as a turn.
    pub system_instruction: Option<String>,
    pub temperature: f32,
}

/// Request for one-shot, schema-constrained JSON generation.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub contents: Vec<Turn>,
    /// Response schema in the model API's OpenAPI subset.
    pub schema: Value,
}

/// Schema for the maintenance extraction: an array of
/// `{component, interval, task, priority}` objects.
pub fn maintenance_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "component": { "type": "STRING" },
                "interval": { "type": "STRING" },
                "task": { "type": "STRING" },
                "priority": { "type": "STRING", "enum": ["High", "Medium", "Low"] }
            },
            "required": ["component", "interval", "task", "priority"]
        }
    })
}
