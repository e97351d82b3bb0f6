use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::errors::{AppError, AppResult};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

#[derive(Debug, Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    model: String,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ClaudeClient {
    pub fn new(model: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self {
            http,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn answer(&self, api_key: &str, system: &str, prompt: &str) -> AppResult<String> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        info!(model = %self.model, prompt_chars = prompt.len(), "calling anthropic messages");
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(match AppError::from_status(status, body.clone()) {
                AppError::ProviderInvalidResponse(_) => match serde_json::from_str::<ApiError>(&body) {
                    Ok(api_error) => AppError::ProviderInvalidResponse(format!(
                        "status {status}: {}",
                        api_error.error.message
                    )),
                    Err(_) => AppError::from_status(status, body),
                },
                other => other,
            });
        }

        parse_answer(&body)
    }
}

/// Concatenates the text blocks of a Messages API response.
pub fn parse_answer(body: &str) -> AppResult<String> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
    let text = response
        .content
        .into_iter()
        .filter(|block| block.content_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        return Err(AppError::ProviderInvalidResponse(
            "response contained no text".to_string(),
        ));
    }
    Ok(text.trim().to_string())
}
