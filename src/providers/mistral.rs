use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::core::errors::{AppError, AppResult};
use crate::core::types::PageResult;

const API_BASE: &str = "https://api.mistral.ai/v1";

#[derive(Debug, Clone)]
pub struct MistralClient {
    http: reqwest::Client,
    ocr_model: String,
    qa_model: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OcrPage {
    pub index: usize,
    #[serde(default)]
    pub markdown: String,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    pages: Vec<OcrPage>,
}

#[derive(Debug, Deserialize)]
struct FileUploadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    url: String,
}

impl MistralClient {
    pub fn new(
        ocr_model: impl Into<String>,
        qa_model: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self {
            http,
            ocr_model: ocr_model.into(),
            qa_model: qa_model.into(),
        })
    }

    pub fn qa_model(&self) -> &str {
        &self.qa_model
    }

    /// Runs Mistral OCR over a PDF or image sent inline as a base64 data URL.
    pub async fn ocr(&self, api_key: &str, bytes: &[u8], mime: &str) -> AppResult<Vec<OcrPage>> {
        let data_url = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        let document = if mime.starts_with("image/") {
            serde_json::json!({ "type": "image_url", "image_url": data_url })
        } else {
            serde_json::json!({ "type": "document_url", "document_url": data_url })
        };
        let payload = serde_json::json!({
            "model": self.ocr_model,
            "document": document,
        });

        info!(bytes = bytes.len(), mime, "calling mistral ocr");
        let response = self
            .http
            .post(format!("{API_BASE}/ocr"))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: OcrResponse = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        debug!(pages = parsed.pages.len(), "mistral ocr returned pages");
        Ok(parsed.pages)
    }

    /// Uploads a file for later reference and returns its id.
    pub async fn upload_file(
        &self,
        api_key: &str,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> AppResult<String> {
        info!(file_name, bytes = bytes.len(), "uploading file to mistral");
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|err| AppError::InvalidInput(err.to_string()))?;
        let form = Form::new().part("file", part).text("purpose", "ocr");

        let response = self
            .http
            .post(format!("{API_BASE}/files"))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        let upload: FileUploadResponse = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        Ok(upload.id)
    }

    /// Returns a time-limited URL the provider can fetch the uploaded file from.
    pub async fn signed_url(&self, api_key: &str, file_id: &str) -> AppResult<String> {
        let response = self
            .http
            .get(format!("{API_BASE}/files/{file_id}/url"))
            .query(&[("expiry", "24")])
            .bearer_auth(api_key)
            .send()
            .await?;
        let response = check_status(response).await?;
        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        Ok(signed.url)
    }

    /// Document Q&A: the model reads the document at `document_url` itself.
    pub async fn ask_document(
        &self,
        api_key: &str,
        document_url: &str,
        question: &str,
    ) -> AppResult<String> {
        let payload = serde_json::json!({
            "model": self.qa_model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": question},
                        {"type": "document_url", "document_url": document_url}
                    ]
                }
            ]
        });

        info!(model = %self.qa_model, "calling mistral document q&a");
        let response = self
            .http
            .post(format!("{API_BASE}/chat/completions"))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        parse_chat_answer(&body)
    }
}

async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::from_status(status, body))
}

/// Extracts the first choice's message text. Content may be a plain string
/// or a list of typed chunks.
pub fn parse_chat_answer(body: &Value) -> AppResult<String> {
    let content = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .ok_or_else(|| AppError::ProviderInvalidResponse("missing message content".to_string()))?;

    let text = match content {
        Value::String(text) => text.clone(),
        Value::Array(chunks) => chunks
            .iter()
            .filter(|chunk| chunk.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|chunk| chunk.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""),
        _ => {
            return Err(AppError::ProviderInvalidResponse(
                "unexpected message content shape".to_string(),
            ))
        }
    };
    Ok(text.trim().to_string())
}

/// Maps OCR pages (0-based `index`) onto page results ordered by page.
pub fn pages_to_results(mut pages: Vec<OcrPage>) -> Vec<PageResult> {
    pages.sort_by_key(|page| page.index);
    pages
        .into_iter()
        .map(|page| PageResult {
            text: page.markdown,
            page_number: page.index + 1,
            ..PageResult::default()
        })
        .collect()
}
