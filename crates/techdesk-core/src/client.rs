//! Interface to the hosted language model.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::request::{GenerationRequest, StructuredRequest};

/// Ordered, finite sequence of text fragments.
///
/// The first `Err` item is terminal: consumers stop pulling after it.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Operations consumed from the hosted model API.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Starts an incremental generation. Fails if the request cannot be dispatched.
    async fn generate_streamed(&self, request: GenerationRequest) -> Result<FragmentStream>;

    /// Runs a schema-constrained generation and returns the raw response text.
    async fn generate_structured(&self, request: StructuredRequest) -> Result<String>;
}
