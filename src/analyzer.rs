//! Analyzer interface
//!
//! The seam between the view state controller and the remote model, so the
//! controller can be driven by a fake backend in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::image::EncodedPayload;
use crate::types::AnalysisResult;

/// Remote analysis backend.
///
/// One invocation issues exactly one outbound request. Implementations do
/// not retry, cache, or time out; cancellation policy belongs to the caller.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, payload: &EncodedPayload) -> Result<AnalysisResult>;
}
