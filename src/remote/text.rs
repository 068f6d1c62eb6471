use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GeminiClient;
use crate::codec;
use crate::error::MemeError;

const CALL: &str = "generateContent";

/// Image bytes sent inline with an instruction.
#[derive(Clone, Debug)]
pub struct InlineImage {
    /// MIME type, eg `image/jpeg`
    pub mime_type: String,
    /// Raw (not yet base64 encoded) image bytes
    pub bytes: Vec<u8>,
}

impl InlineImage {
    /// Wraps image bytes, sniffing the MIME type from the bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: codec::mime_type(&bytes).to_string(),
            bytes,
        }
    }
}

// -----------------------------
// generateContent request
// -----------------------------

#[derive(Serialize, Debug)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize, Debug)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

// -----------------------------
// generateContent response
// -----------------------------

/// Body returned by `generateContent`.
#[derive(Deserialize, Debug, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Pulls the text out of the first candidate, joining its text parts.
pub fn extract_text(response: &GenerateContentResponse) -> Result<String, MemeError> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| MemeError::remote(CALL, "response has no candidates"))?;
    let text: String = candidate
        .content
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .collect();
    let text = text.trim();
    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(MemeError::remote(
            CALL,
            format!("candidate has no text (finish reason: {reason})"),
        ));
    }
    Ok(text.to_string())
}

impl GeminiClient {
    /// Sends an instruction, with an optional image, and returns the generated text.
    pub async fn generate_text(
        &self,
        model: &str,
        instruction: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, MemeError> {
        let mut parts = vec![Part::Text { text: instruction }];
        if let Some(image) = image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: general_purpose::STANDARD.encode(&image.bytes),
                },
            });
        }
        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        debug!(
            "Calling {} on {} (image: {})",
            CALL,
            model,
            image.is_some()
        );
        let response: GenerateContentResponse = self
            .post_json(CALL, &format!("models/{model}:{CALL}"), &body)
            .await?;
        extract_text(&response)
    }
}
