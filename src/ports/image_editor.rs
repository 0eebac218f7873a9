//! Image editor port for generative image-editing APIs.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::reader::EncodedImage;

/// A request to edit one image with a text instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    /// The resolved model identifier (e.g., `"gemini-2.5-flash-image-preview"`).
    pub model: String,
    /// The source image.
    pub image: EncodedImage,
    /// Natural-language editing instruction.
    pub instruction: String,
}

impl EditRequest {
    /// Check that the request has something to send.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInputKind` if the instruction is blank or the image
    /// payload is empty.
    pub fn validate(&self) -> Result<(), EditError> {
        if self.instruction.trim().is_empty() {
            return Err(EditError::InvalidInputKind(
                "Please provide an editing instruction.".to_string(),
            ));
        }
        if self.image.payload.is_empty() {
            return Err(EditError::InvalidInputKind("Please upload an image.".to_string()));
        }
        Ok(())
    }
}

/// The edited image returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditedImage {
    /// Raw image bytes (decoded from base64).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
}

/// Normalized reply: an image, a text message, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResult {
    /// The first image part of the reply.
    pub image: Option<EditedImage>,
    /// The first text part of the reply.
    pub text: Option<String>,
}

impl EditResult {
    /// True when the reply carried neither an image nor text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.text.is_none()
    }
}

/// Boxed future type returned by [`ImageEditor::edit`].
pub type EditFuture<'a> = Pin<Box<dyn Future<Output = Result<EditResult, EditError>> + Send + 'a>>;

/// Edits images via an external API.
pub trait ImageEditor: Send + Sync {
    /// Submit one edit and wait for the normalized result.
    fn edit(&self, request: &EditRequest) -> EditFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
