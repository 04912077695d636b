//! One-shot maintenance task extraction.

use std::sync::Arc;

use techdesk_core::client::ModelClient;
use techdesk_core::error::Result;
use techdesk_core::file::UploadedFile;
use techdesk_core::maintenance::MaintenanceItem;
use techdesk_core::prompts::EXTRACTION_INSTRUCTION;
use techdesk_core::request::{Part, StructuredRequest, Turn, TurnRole, maintenance_schema};

/// Asks the model for every preventive maintenance task in the manuals.
#[derive(Clone)]
pub struct ExtractionPipeline {
    client: Arc<dyn ModelClient>,
}

impl ExtractionPipeline {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Extracts the task list.
    ///
    /// An empty file set returns immediately without a request. Transport
    /// and parse failures are logged and yield an empty list.
    pub async fn extract(&self, files: &[UploadedFile]) -> Vec<MaintenanceItem> {
        if files.is_empty() {
            return Vec::new();
        }

        match self.try_extract(files).await {
            Ok(items) => {
                tracing::info!(count = items.len(), "Extracted maintenance tasks");
                items
            }
            Err(e) => {
                tracing::error!(error = %e, "Maintenance extraction failed");
                Vec::new()
            }
        }
    }

    async fn try_extract(&self, files: &[UploadedFile]) -> Result<Vec<MaintenanceItem>> {
        let text = self.client.generate_structured(build_request(files)).await?;
        parse_items(&text)
    }
}

fn build_request(files: &[UploadedFile]) -> StructuredRequest {
    let mut parts: Vec<Part> = files.iter().map(Part::attachment).collect();
    parts.push(Part::text(EXTRACTION_INSTRUCTION));

    StructuredRequest {
        contents: vec![Turn::new(TurnRole::User, parts)],
        schema: maintenance_schema(),
    }
}

/// Parses the model's JSON answer. Blank text counts as an empty array and
/// a surrounding ```json fence is tolerated.
pub fn parse_items(text: &str) -> Result<Vec<MaintenanceItem>> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    if body.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(body)?)
}
