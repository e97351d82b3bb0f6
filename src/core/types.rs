use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::AppError;

/// Providers whose API keys live in the credential store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    Mistral,
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "mistral" => Ok(Self::Mistral),
            other => Err(AppError::InvalidInput(format!("unknown provider '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    #[default]
    Textract,
    Mistral,
}

impl FromStr for OcrProvider {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "textract" | "aws" => Ok(Self::Textract),
            "mistral" => Ok(Self::Mistral),
            other => Err(AppError::InvalidInput(format!(
                "unknown OCR provider '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QaProvider {
    #[default]
    Claude,
    Mistral,
}

impl FromStr for QaProvider {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "mistral" => Ok(Self::Mistral),
            other => Err(AppError::InvalidInput(format!(
                "unknown Q&A provider '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
    pub confidence: f64,
    pub page_number: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub confidence: f64,
    pub page_number: usize,
}

impl From<&KeyValuePair> for FormField {
    fn from(pair: &KeyValuePair) -> Self {
        Self {
            name: pair.key.clone(),
            value: pair.value.clone(),
            confidence: pair.confidence,
            page_number: pair.page_number,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub rows: Vec<Vec<String>>,
    pub confidence: f64,
    pub page_number: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub text: String,
    pub key_value_pairs: Vec<KeyValuePair>,
    pub form_fields: Vec<FormField>,
    pub tables: Vec<TableData>,
    pub page_number: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub text: String,
    pub key_value_pairs: Vec<KeyValuePair>,
    pub form_fields: Vec<FormField>,
    pub tables: Vec<TableData>,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProviderKeyResponse {
    pub stored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractDocumentRequest {
    pub file_path: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub provider: OcrProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractDocumentResponse {
    pub document_id: String,
    pub name: String,
    pub mime: String,
    pub checksum: String,
    pub provider: OcrProvider,
    pub extracted_at: DateTime<Utc>,
    pub result: DocumentResult,
}

/// Where the Q&A provider reads the document from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DocumentSource {
    /// Content already reduced by an OCR provider.
    Extracted { result: DocumentResult },
    /// A local file uploaded to the provider before asking.
    File { file_path: String },
    /// A URL the provider can fetch itself.
    Url { document_url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskQuestionRequest {
    pub question: String,
    #[serde(default)]
    pub provider: QaProvider,
    pub source: DocumentSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskQuestionResponse {
    pub answer: String,
    pub provider: QaProvider,
    pub model: String,
    pub latency_ms: i64,
}
