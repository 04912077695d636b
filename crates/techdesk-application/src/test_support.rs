//! Scripted model client shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use techdesk_core::client::{FragmentStream, ModelClient};
use techdesk_core::error::{Result, TechdeskError};
use techdesk_core::file::UploadedFile;
use techdesk_core::request::{GenerationRequest, StructuredRequest};
use tokio::sync::Notify;

pub(crate) enum StreamScript {
    Fragments(Vec<Result<String>>),
    DispatchError(TechdeskError),
}

/// Replays queued responses and records every request it receives.
#[derive(Default)]
pub(crate) struct MockModelClient {
    streams: Mutex<VecDeque<StreamScript>>,
    structured: Mutex<VecDeque<Result<String>>>,
    pub streamed_requests: Mutex<Vec<GenerationRequest>>,
    pub structured_requests: Mutex<Vec<StructuredRequest>>,
    structured_calls: AtomicUsize,
    /// When set, structured calls wait for a notification before answering.
    pub structured_gate: Option<std::sync::Arc<Notify>>,
    /// When set, streamed calls wait for a notification before dispatching.
    pub stream_gate: Option<std::sync::Arc<Notify>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragments(self, fragments: &[&str]) -> Self {
        self.push_stream(StreamScript::Fragments(
            fragments.iter().map(|f| Ok(f.to_string())).collect(),
        ));
        self
    }

    pub fn with_stream(self, script: StreamScript) -> Self {
        self.push_stream(script);
        self
    }

    pub fn with_structured(self, response: Result<String>) -> Self {
        self.structured.lock().unwrap().push_back(response);
        self
    }

    pub fn with_gate(mut self, gate: std::sync::Arc<Notify>) -> Self {
        self.structured_gate = Some(gate);
        self
    }

    pub fn with_stream_gate(mut self, gate: std::sync::Arc<Notify>) -> Self {
        self.stream_gate = Some(gate);
        self
    }

    fn push_stream(&self, script: StreamScript) {
        self.streams.lock().unwrap().push_back(script);
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn streamed_calls(&self) -> usize {
        self.streamed_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate_streamed(&self, request: GenerationRequest) -> Result<FragmentStream> {
        self.streamed_requests.lock().unwrap().push(request);
        if let Some(gate) = &self.stream_gate {
            gate.notified().await;
        }
        let script = self.streams.lock().unwrap().pop_front();
        match script {
            Some(StreamScript::Fragments(items)) => Ok(stream::iter(items).boxed()),
            Some(StreamScript::DispatchError(err)) => Err(err),
            None => Ok(stream::empty().boxed()),
        }
    }

    async fn generate_structured(&self, request: StructuredRequest) -> Result<String> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        self.structured_requests.lock().unwrap().push(request);
        if let Some(gate) = &self.structured_gate {
            gate.notified().await;
        }
        let response = self.structured.lock().unwrap().pop_front();
        response.unwrap_or_else(|| Ok("[]".to_string()))
    }
}

pub(crate) fn manual(name: &str) -> UploadedFile {
    UploadedFile::new(name, "application/pdf", "JVBERi0xLjQ=")
}
