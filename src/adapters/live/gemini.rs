//! Live adapter for the Gemini image editing API.

use base64::Engine;
use reqwest::Client;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, EditError};
use crate::ports::image_editor::{EditFuture, EditRequest, EditResult, EditedImage, ImageEditor};

/// Default endpoint for Gemini model calls.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Longest error body echoed back to the user.
const MAX_ERROR_BODY: usize = 500;

/// Live Gemini image editor that calls the Google AI API.
pub struct GeminiEditor {
    client: Client,
    api_key: String,
    api_base: String,
}

impl GeminiEditor {
    /// Create a new Gemini editor with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self::with_base(api_key, GEMINI_API_BASE)
    }

    /// Create an editor that talks to a different base URL.
    #[must_use]
    pub fn with_base(api_key: String, api_base: impl Into<String>) -> Self {
        Self { client: Client::new(), api_key, api_base: api_base.into() }
    }

    async fn edit_impl(&self, request: EditRequest) -> Result<EditResult, EditError> {
        request.validate()?;

        let url = format!(
            "{}/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            request.model
        );
        let body = GeminiRequest::for_edit(&request);

        tracing::debug!(
            %url,
            mime_type = %request.image.mime_type,
            payload_len = request.image.payload.len(),
            "submitting edit"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(AdapterError::from)?;

        let status = response.status();
        let response_text = response.text().await.map_err(AdapterError::from)?;

        if !status.is_success() {
            return Err(AdapterError::Api {
                status: status.as_u16(),
                message: api_error_message(&response_text),
            }
            .into());
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            AdapterError::MalformedReply(format!("failed to parse response: {e}"))
        })?;

        let result = extract_result(parsed)?;
        tracing::debug!(
            has_image = result.image.is_some(),
            has_text = result.text.is_some(),
            "edit complete"
        );
        Ok(result)
    }
}

impl ImageEditor for GeminiEditor {
    fn edit(&self, request: &EditRequest) -> EditFuture<'_> {
        Box::pin(self.edit_impl(request.clone()))
    }
}

/// Scan the first candidate's parts; the first image and first text win.
fn extract_result(response: GeminiResponse) -> Result<EditResult, EditError> {
    let GeminiResponse { candidates, prompt_feedback } = response;
    let candidate = candidates.into_iter().next();
    let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
    let parts = candidate.and_then(|c| c.content).map(|c| c.parts).unwrap_or_default();

    let mut result = EditResult::default();
    for part in parts {
        match part {
            ReplyPart::Image { inline_data }
                if result.image.is_none() && !inline_data.data.is_empty() =>
            {
                let data = base64::engine::general_purpose::STANDARD
                    .decode(&inline_data.data)
                    .map_err(|e| AdapterError::MalformedReply(format!("failed to decode base64: {e}")))?;
                result.image = Some(EditedImage { data, mime_type: inline_data.mime_type });
            }
            ReplyPart::Text { text } if result.text.is_none() && !text.is_empty() => {
                result.text = Some(text);
            }
            ReplyPart::Other(IgnoredAny) => tracing::debug!("skipping unsupported reply part"),
            ReplyPart::Image { .. } | ReplyPart::Text { .. } => {}
        }
    }

    if result.is_empty() {
        let reason = prompt_feedback
            .and_then(|f| f.block_reason_message.or(f.block_reason))
            .or_else(|| finish_reason.filter(|r| r != "STOP"));
        return Err(EditError::EmptyResponse { reason });
    }

    Ok(result)
}

/// Pull the human-readable message out of a Gemini error body.
fn api_error_message(body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<GeminiErrorBody>(body) {
        return err.error.message;
    }
    if body.chars().count() > MAX_ERROR_BODY {
        let truncated: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{truncated}...")
    } else {
        body.to_string()
    }
}

// --- Gemini API request types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GeminiRequest<'a> {
    fn for_edit(request: &'a EditRequest) -> Self {
        let parts = vec![
            RequestPart::InlineData {
                inline_data: InlineDataRef {
                    mime_type: &request.image.mime_type,
                    data: &request.image.payload,
                },
            },
            RequestPart::Text { text: &request.instruction },
        ];
        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE", "TEXT"],
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataRef<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataRef<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

// --- Gemini API response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

/// One part of a reply. Anything that is neither inline image data nor
/// text falls through to `Other`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplyPart {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
