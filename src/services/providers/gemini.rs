/// Gemini generative text provider
///
/// Wraps `POST /v1beta/models/{model}:generateContent`. Only the text of the first
/// candidate is returned; interpreting it is the extractor's job.
use crate::{
    error::{AppError, AppResult},
    models::{
        upstream::{Content, GenerateContentRequest, GenerateContentResponse, Part},
        SamplingConfig,
    },
    services::providers::TextGenerator,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiClient {
    /// Creates a client whose every request is bounded by `timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        )
    }

    fn build_request(prompt: &str, sampling: &SamplingConfig) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: (!sampling.is_default()).then(|| (*sampling).into()),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> AppResult<String> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::build_request(prompt, sampling))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body.text().ok_or_else(|| {
            AppError::MalformedGeneratedPayload("Gemini response has no candidates".to_string())
        })?;

        tracing::debug!(
            model = %self.model,
            chars = text.len(),
            provider = "gemini",
            "Generation completed"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
