use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GeminiClient;
use crate::error::MemeError;

const CALL: &str = "predict";

#[derive(Serialize, Debug)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters,
}

#[derive(Serialize, Debug)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
}

/// Body returned by the image model's `predict` call.
#[derive(Deserialize, Debug, Default)]
pub struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
}

/// Decodes every returned image. No images at all is a failed call.
pub fn decode_predictions(response: PredictResponse) -> Result<Vec<Vec<u8>>, MemeError> {
    let images = response
        .predictions
        .into_iter()
        .filter_map(|prediction| prediction.bytes_base64_encoded)
        .map(|encoded| general_purpose::STANDARD.decode(encoded.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    if images.is_empty() {
        return Err(MemeError::remote(CALL, "response contained no images"));
    }
    Ok(images)
}

impl GeminiClient {
    /// Generates `sample_count` images for the prompt with the configured image model.
    pub async fn generate_images(
        &self,
        prompt: &str,
        sample_count: u32,
    ) -> Result<Vec<Vec<u8>>, MemeError> {
        let body = PredictRequest {
            instances: vec![Instance { prompt }],
            parameters: Parameters { sample_count },
        };
        debug!("Calling {} on {}", CALL, self.image_model);
        let response: PredictResponse = self
            .post_json(CALL, &format!("models/{}:{CALL}", self.image_model), &body)
            .await?;
        decode_predictions(response)
    }

    /// Generates a single image for the prompt.
    pub async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, MemeError> {
        self.generate_images(prompt, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemeError::remote(CALL, "response contained no images"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_shape() {
        let body = PredictRequest {
            instances: vec![Instance {
                prompt: "A corgi in a business suit",
            }],
            parameters: Parameters { sample_count: 1 },
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({
                "instances": [{"prompt": "A corgi in a business suit"}],
                "parameters": {"sampleCount": 1}
            })
        );
    }

    #[test]
    fn predictions_are_decoded() {
        let response: PredictResponse = serde_json::from_value(json!({
            "predictions": [
                {"bytesBase64Encoded": "AQID", "mimeType": "image/png"},
                {"mimeType": "image/png"}
            ]
        }))
        .expect("deserialize");
        assert_eq!(
            decode_predictions(response).expect("decode"),
            vec![vec![1u8, 2, 3]]
        );
    }

    #[test]
    fn empty_or_broken_predictions() {
        assert!(matches!(
            decode_predictions(PredictResponse::default()),
            Err(MemeError::RemoteCallFailed { .. })
        ));

        let response: PredictResponse = serde_json::from_value(json!({
            "predictions": [{"bytesBase64Encoded": "not base64!"}]
        }))
        .expect("deserialize");
        assert!(matches!(
            decode_predictions(response),
            Err(MemeError::DecodeFailed(_))
        ));
    }
}
