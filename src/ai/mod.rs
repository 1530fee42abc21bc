use async_trait::async_trait;

pub mod gemini;
pub mod types;
pub use types::*;

use crate::frame::Frame;

/// Trait for vision providers (Gemini, or anything that can be held to the
/// same six-field response schema). The session layer only ever talks to
/// this seam.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Analyze one still photo and return the structured reading.
    /// `frame` is a base64-encoded JPEG; strictly request/response, no
    /// streaming, no partial results.
    async fn analyze(&self, frame: &Frame) -> Result<AuraReading, AnalysisError>;

    /// Provider name for logging/display.
    fn name(&self) -> &str;
}
