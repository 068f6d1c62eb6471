//! Client for the generative language API: text (and vision) generation,
//! image generation and model listing.
//!
//! Every call is a single attempt. Failures come back as
//! [MemeError::RemoteCallFailed] and the caller decides whether to skip or abort.

mod imagen;
mod text;

pub use imagen::{PredictResponse, decode_predictions};
pub use text::{GenerateContentResponse, InlineImage, extract_text};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::MemeError;

/// Longest chunk of a failed response body that gets logged.
const MAX_LOGGED_BODY: usize = 2048;

/// Talks to the generative language API with the key and models from [Config].
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: Url,
    text_model: String,
    transform_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Fails with [MemeError::MissingInput] when there's no API key.
    pub fn new(config: &Config) -> Result<Self, MemeError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| MemeError::MissingInput("GEMINI_API_KEY".to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            api_base: config.api_base.clone(),
            text_model: config.text_model.clone(),
            transform_model: config.transform_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    /// Model used for captions, personas, styles and descriptions.
    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    /// Model used for transformation prompts.
    pub fn transform_model(&self) -> &str {
        &self.transform_model
    }

    /// `{base}/v1beta/{path}?key=…`
    pub fn endpoint(&self, path: &str) -> Result<Url, MemeError> {
        let mut url = self
            .api_base
            .join(&format!("v1beta/{path}"))
            .map_err(|err| MemeError::remote(path, format!("bad endpoint URL: {err}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Lists the model names the key can see.
    pub async fn list_models(&self) -> Result<Vec<String>, MemeError> {
        #[derive(Deserialize)]
        struct ModelList {
            #[serde(default)]
            models: Vec<ModelInfo>,
        }
        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let url = self.endpoint("models")?;
        let bytes = check_response("models", self.http.get(url).send().await?).await?;
        let list: ModelList = parse_json("models", &bytes)?;
        Ok(list.models.into_iter().map(|model| model.name).collect())
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        call: &str,
        path: &str,
        body: &B,
    ) -> Result<T, MemeError> {
        let url = self.endpoint(path)?;
        let resp = self.http.post(url).json(body).send().await?;
        let bytes = check_response(call, resp).await?;
        parse_json(call, &bytes)
    }
}

/// Reads the body, turning a non-success status into an error.
async fn check_response(call: &str, resp: reqwest::Response) -> Result<Vec<u8>, MemeError> {
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|err| MemeError::remote(call, format!("failed reading body: {err}")))?;
    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes);
        let excerpt: String = body.chars().take(MAX_LOGGED_BODY).collect();
        debug!("{} returned {}: {}", call, status, excerpt);
        return Err(MemeError::remote(call, format!("HTTP {status}")));
    }
    Ok(bytes.to_vec())
}

fn parse_json<T: DeserializeOwned>(call: &str, bytes: &[u8]) -> Result<T, MemeError> {
    serde_json::from_slice(bytes)
        .map_err(|err| MemeError::remote(call, format!("malformed JSON response: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliOptions;
    use clap::Parser;

    fn client() -> GeminiClient {
        let cli = CliOptions::parse_from([
            "petmeme",
            "--api-key",
            "secret key",
            "--api-base",
            "http://127.0.0.1:9/api/",
            "models",
        ]);
        let config = Config::from_cli(&cli).expect("config");
        GeminiClient::new(&config).expect("client")
    }

    #[test]
    fn endpoint_carries_key() {
        let url = client()
            .endpoint("models/gemini-flash-latest:generateContent")
            .expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/api/v1beta/models/gemini-flash-latest:generateContent?key=secret+key"
        );
    }

    #[test]
    fn missing_key_is_missing_input() {
        let cli = CliOptions::parse_from(["petmeme", "--api-key", "", "models"]);
        let config = Config::from_cli(&cli).expect("config");
        assert!(matches!(
            GeminiClient::new(&config),
            Err(MemeError::MissingInput(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_api_is_remote_failure() {
        let result = client().list_models().await;
        assert!(matches!(result, Err(MemeError::RemoteCallFailed { .. })));
    }
}
