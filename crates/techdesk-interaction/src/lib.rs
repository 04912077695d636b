//! Talking to the hosted model: request assembly, the Gemini REST client,
//! and server-sent event decoding for streamed responses.

pub mod gemini_api_client;
pub mod prompt;
pub mod sse;

pub use gemini_api_client::GeminiApiClient;
pub use prompt::{InputMode, PromptAssembler};
