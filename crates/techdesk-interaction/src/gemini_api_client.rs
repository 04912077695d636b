//! GeminiApiClient - Direct REST API implementation for Gemini.
//!
//! Chat turns use `streamGenerateContent` with server-sent events; the
//! maintenance extraction uses `generateContent` with a JSON response schema.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use techdesk_core::client::{FragmentStream, ModelClient};
use techdesk_core::config::{DEFAULT_CHAT_MODEL, DEFAULT_EXTRACTION_MODEL, ModelConfig};
use techdesk_core::error::{Result, TechdeskError};
use techdesk_core::request::{GenerationRequest, Part as RequestPart, StructuredRequest, Turn};
use techdesk_core::secret::SecretService;

use crate::sse::SseDecoder;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Model client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    api_key: String,
    chat_model: String,
    extraction_model: String,
}

impl GeminiApiClient {
    /// Creates a new client with the provided API key and default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
        }
    }

    /// Builds a client from stored secrets and the model section of `config.toml`.
    ///
    /// A `model_name` in secret.json overrides the configured chat model.
    pub async fn from_secrets(secrets: &dyn SecretService, models: &ModelConfig) -> Result<Self> {
        let secret_config = secrets.load_secrets().await?;
        let gemini = secret_config.gemini.ok_or_else(|| {
            TechdeskError::config("Gemini configuration not found in secret.json")
        })?;
        if gemini.api_key.trim().is_empty() {
            return Err(TechdeskError::config("Gemini API key is empty"));
        }

        let chat_model = gemini.model_name.unwrap_or_else(|| models.chat.clone());
        Ok(Self::new(gemini.api_key)
            .with_chat_model(chat_model)
            .with_extraction_model(models.extraction.clone()))
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_extraction_model(mut self, model: impl Into<String>) -> Self {
        self.extraction_model = model.into();
        self
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{BASE_URL}/{model}:{method}")
    }

    async fn post(&self, url: String, body: &GenerateContentRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| TechdeskError::Api {
                status_code: None,
                message: format!("Gemini API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelClient for GeminiApiClient {
    async fn generate_streamed(&self, request: GenerationRequest) -> Result<FragmentStream> {
        let body = GenerateContentRequest::from_generation(&request);
        let url = format!(
            "{}?alt=sse",
            self.endpoint(&self.chat_model, "streamGenerateContent")
        );
        tracing::debug!(
            model = %self.chat_model,
            turns = body.contents.len(),
            "Dispatching streamed Gemini request"
        );

        let response = self.post(url, &body).await?;
        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();
        Ok(fragment_stream(bytes))
    }

    async fn generate_structured(&self, request: StructuredRequest) -> Result<String> {
        let body = GenerateContentRequest::from_structured(&request);
        let url = self.endpoint(&self.extraction_model, "generateContent");
        tracing::debug!(model = %self.extraction_model, "Dispatching structured Gemini request");

        let response = self.post(url, &body).await?;
        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| TechdeskError::api(format!("Failed to parse Gemini response: {err}")))?;

        extract_text_response(parsed)
    }
}

struct SseState {
    bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl SseState {
    fn enqueue(&mut self, event: &str) {
        match parse_stream_event(event) {
            Ok(Some(text)) => self.pending.push_back(Ok(text)),
            Ok(None) => {}
            Err(err) => {
                self.pending.push_back(Err(err));
                self.finished = true;
            }
        }
    }
}

/// Turns an SSE body into text fragments. Stops after the first error.
fn fragment_stream(bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> FragmentStream {
    let state = SseState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                if item.is_err() {
                    state.pending.clear();
                }
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for event in state.decoder.push(&chunk) {
                        state.enqueue(&event);
                        if state.finished {
                            break;
                        }
                    }
                }
                Some(Err(err)) => {
                    state.finished = true;
                    state.pending.push_back(Err(TechdeskError::Api {
                        status_code: None,
                        message: format!("Gemini stream interrupted: {err}"),
                        is_retryable: err.is_timeout(),
                    }));
                }
                None => {
                    state.finished = true;
                    if let Some(event) = state.decoder.finish() {
                        state.enqueue(&event);
                    }
                }
            }
        }
    })
    .boxed()
}

/// Decodes one SSE payload into the text it carries.
///
/// Chunks without text (e.g. the final usage-metadata chunk) yield `None`.
fn parse_stream_event(event: &str) -> Result<Option<String>> {
    let data = event.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    if let Ok(wrapper) = serde_json::from_str::<ErrorWrapper>(data) {
        return Err(TechdeskError::Api {
            status_code: wrapper.error.code.and_then(|c| u16::try_from(c).ok()),
            message: describe_error(&wrapper.error, data),
            is_retryable: false,
        });
    }

    let chunk: GenerateContentResponse = serde_json::from_str(data)
        .map_err(|err| TechdeskError::api(format!("Malformed Gemini stream chunk: {err}")))?;
    let text = collect_text(&chunk);
    Ok((!text.is_empty()).then_some(text))
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn from_generation(request: &GenerationRequest) -> Self {
        Self {
            contents: request.contents.iter().map(Content::from_turn).collect(),
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part::Text { text: text.clone() }],
            }),
            generation_config: Some(GenerationConfig {
                temperature: Some(request.temperature),
                response_mime_type: None,
                response_schema: None,
            }),
        }
    }

    fn from_structured(request: &StructuredRequest) -> Self {
        Self {
            contents: request.contents.iter().map(Content::from_turn).collect(),
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(request.schema.clone()),
            }),
        }
    }
}

#[derive(Serialize, Debug)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn from_turn(turn: &Turn) -> Self {
        Self {
            role: Some(turn.role.as_str().to_string()),
            parts: turn
                .parts
                .iter()
                .map(|part| match part {
                    RequestPart::Text { text } => Part::Text { text: text.clone() },
                    RequestPart::InlineData { mime_type, data } => Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: mime_type.clone(),
                            data: data.clone(),
                        },
                    },
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn collect_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .as_ref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let has_candidate = response
        .candidates
        .as_ref()
        .is_some_and(|candidates| !candidates.is_empty());
    if !has_candidate {
        return Err(TechdeskError::api(
            "Gemini API returned no candidates in the response",
        ));
    }
    Ok(collect_text(&response))
}

fn describe_error(error: &ErrorBody, fallback: &str) -> String {
    let status_text = error.status.clone().unwrap_or_default();
    let msg = error.message.clone().unwrap_or_else(|| fallback.to_string());
    if status_text.is_empty() {
        msg
    } else {
        format!("{status_text}: {msg}")
    }
}

fn map_http_error(status: StatusCode, body: String) -> TechdeskError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| describe_error(&wrapper.error, &body))
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    TechdeskError::Api {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use techdesk_core::request::{TurnRole, maintenance_schema};

    fn chunk(text: &str) -> String {
        json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
            .to_string()
    }

    fn sse_body(parts: &[&str]) -> Vec<reqwest::Result<Vec<u8>>> {
        parts
            .iter()
            .map(|p| Ok(format!("data: {}\r\n\r\n", chunk(p)).into_bytes()))
            .collect()
    }

    #[test]
    fn test_generation_request_wire_shape() {
        let request = GenerationRequest {
            contents: vec![
                Turn::text(TurnRole::Model, "intro"),
                Turn::new(
                    TurnRole::User,
                    vec![
                        RequestPart::InlineData {
                            mime_type: "application/pdf".to_string(),
                            data: "JVBERi0=".to_string(),
                        },
                        RequestPart::text("What is E102?"),
                    ],
                ),
            ],
            system_instruction: Some("be safe".to_string()),
            temperature: 0.1,
        };

        let value = serde_json::to_value(GenerateContentRequest::from_generation(&request)).unwrap();

        assert_eq!(value["contents"][0]["role"], "model");
        assert_eq!(value["contents"][1]["role"], "user");
        assert_eq!(
            value["contents"][1]["parts"][0]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(value["contents"][1]["parts"][1]["text"], "What is E102?");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be safe");
        assert!(value["systemInstruction"].get("role").is_none());
        assert!(value["generationConfig"]["temperature"].as_f64().unwrap() < 0.2);
    }

    #[test]
    fn test_structured_request_wire_shape() {
        let request = StructuredRequest {
            contents: vec![Turn::text(TurnRole::User, "extract")],
            schema: maintenance_schema(),
        };

        let value = serde_json::to_value(GenerateContentRequest::from_structured(&request)).unwrap();

        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_stream_event_text_and_empty() {
        assert_eq!(
            parse_stream_event(&chunk("Hello")).unwrap(),
            Some("Hello".to_string())
        );
        let usage_only = json!({ "usageMetadata": { "totalTokenCount": 12 } }).to_string();
        assert_eq!(parse_stream_event(&usage_only).unwrap(), None);
    }

    #[test]
    fn test_parse_stream_event_error_envelope() {
        let body = json!({ "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" } })
            .to_string();
        match parse_stream_event(&body) {
            Err(TechdeskError::Api {
                status_code,
                message,
                ..
            }) => {
                assert_eq!(status_code, Some(400));
                assert_eq!(message, "INVALID_ARGUMENT: API key not valid");
            }
            other => panic!("unexpected: {:?}", other.map_err(|e| e.to_string())),
        }
    }

    #[test]
    fn test_map_http_error_retryable_statuses() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "overloaded".to_string());
        assert!(matches!(
            err,
            TechdeskError::Api {
                status_code: Some(503),
                is_retryable: true,
                ..
            }
        ));

        let err = map_http_error(StatusCode::BAD_REQUEST, "bad".to_string());
        assert!(matches!(err, TechdeskError::Api { is_retryable: false, .. }));
    }

    #[test]
    fn test_extract_text_response_requires_candidates() {
        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_text_response(empty).is_err());

        let ok: GenerateContentResponse = serde_json::from_str(&chunk("[]")).unwrap();
        assert_eq!(extract_text_response(ok).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_fragment_stream_yields_in_order() {
        let body = stream::iter(sse_body(&["Hello, ", "world."])).boxed();
        let fragments: Vec<String> = fragment_stream(body)
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["Hello, ".to_string(), "world.".to_string()]);
    }

    #[tokio::test]
    async fn test_fragment_stream_stops_after_error() {
        let mut items = sse_body(&["partial"]);
        items.push(Ok(b"data: {not json}\n\n".to_vec()));
        items.extend(sse_body(&["never seen"]));

        let results: Vec<Result<String>> = fragment_stream(stream::iter(items).boxed())
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), "partial");
        assert!(results[1].is_err());
    }
}
