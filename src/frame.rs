// frame.rs — The captured still image as it travels through the session:
// a base64-encoded JPEG buffer, exactly one frame per capture event.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::fmt;

/// MIME type of every frame. The capture provider always delivers a single
/// JPEG-compatible still, never a stream.
pub const FRAME_MIME: &str = "image/jpeg";

/// A single captured photo, base64-encoded.
///
/// Capture providers hand frames over in three shapes: a bare base64 payload,
/// a `data:` URL from a canvas/file reader, or raw JPEG bytes. All three
/// normalize into this one type.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame(String);

impl Frame {
    /// Wrap an already base64-encoded payload.
    pub fn from_base64(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    /// Extract the payload from a `data:image/jpeg;base64,...` URL.
    /// Browser capture paths (canvas `toDataURL`, `FileReader`) produce this
    /// shape; everything before the first comma is metadata.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let (_, payload) = url.split_once(',')?;
        if payload.is_empty() {
            return None;
        }
        Some(Self(payload.to_string()))
    }

    /// Base64-encode raw JPEG bytes.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self(BASE64.encode(bytes))
    }

    /// The base64 payload, as sent inline to the model.
    pub fn as_base64(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// A frame is tens of kilobytes of base64; logging it verbatim would drown
// everything else, so Debug prints the length only.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({} base64 chars)", self.0.len())
    }
}
