use std::path::{Path, PathBuf};

use chrono::Utc;
use image::ImageFormat;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::{
            DocumentResult, ExtractDocumentRequest, ExtractDocumentResponse, OcrProvider, Provider,
        },
    },
    providers::mistral::pages_to_results,
    reducer::{merge_pages, reduce_document, Block},
    security::keyring,
    AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image(ImageFormat),
}

impl DocumentKind {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Image(format) => format.to_mime_type(),
        }
    }
}

fn checksum_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Classifies input as PDF (mime, extension or `%PDF` magic) or image
/// (content sniffing).
pub fn detect_kind(path: &Path, mime_type: Option<&str>, bytes: &[u8]) -> AppResult<DocumentKind> {
    let mime = mime_type.unwrap_or("").trim().to_ascii_lowercase();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if mime.contains("pdf") || ext == "pdf" || bytes.starts_with(b"%PDF") {
        return Ok(DocumentKind::Pdf);
    }
    image::guess_format(bytes)
        .map(DocumentKind::Image)
        .map_err(|_| {
            AppError::InvalidInput(format!(
                "{} is neither a PDF nor a recognised image",
                path.display()
            ))
        })
}

pub async fn extract_document(
    state: &AppState,
    request: ExtractDocumentRequest,
) -> AppResult<ExtractDocumentResponse> {
    let path = PathBuf::from(&request.file_path);
    if !path.exists() {
        return Err(AppError::NotFound(format!("file {}", request.file_path)));
    }

    let bytes = tokio::fs::read(&path).await?;
    let kind = detect_kind(&path, request.mime_type.as_deref(), &bytes)?;
    let checksum = checksum_bytes(&bytes);
    let document_id = Uuid::new_v4().to_string();
    info!(
        %document_id,
        provider = ?request.provider,
        mime = kind.mime(),
        bytes = bytes.len(),
        "extracting document"
    );

    let result = match request.provider {
        OcrProvider::Textract => extract_with_textract(state, kind, &bytes).await?,
        OcrProvider::Mistral => extract_with_mistral(state, kind, &bytes).await?,
    };
    info!(%document_id, pages = result.total_pages, "document extracted");

    let name = request.display_name.unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| request.file_path.clone())
    });

    Ok(ExtractDocumentResponse {
        document_id,
        name,
        mime: kind.mime().to_string(),
        checksum,
        provider: request.provider,
        extracted_at: Utc::now(),
        result,
    })
}

async fn extract_with_textract(
    state: &AppState,
    kind: DocumentKind,
    bytes: &[u8],
) -> AppResult<DocumentResult> {
    let orchestrator = state.orchestrator();
    match kind {
        DocumentKind::Pdf => orchestrator.process(bytes).await,
        DocumentKind::Image(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Tiff) => {
            orchestrator.process_image(bytes).await
        }
        DocumentKind::Image(format) => Err(AppError::InvalidInput(format!(
            "textract does not accept {} images",
            format.to_mime_type()
        ))),
    }
}

async fn extract_with_mistral(
    state: &AppState,
    kind: DocumentKind,
    bytes: &[u8],
) -> AppResult<DocumentResult> {
    let size = bytes.len() as u64;
    if size > state.config.mistral_limit_bytes {
        return Err(AppError::DocumentTooLarge {
            size,
            limit: state.config.mistral_limit_bytes,
        });
    }

    let api_key = keyring::get_provider_key(Provider::Mistral)?;
    let pages = tokio::time::timeout(
        state.config.provider_timeout,
        state.mistral.ocr(&api_key, bytes, kind.mime()),
    )
    .await??;
    if pages.is_empty() {
        return Err(AppError::ExtractionFailed(
            "mistral ocr returned no pages".to_string(),
        ));
    }
    Ok(merge_pages(pages_to_results(pages)))
}

/// Reduces blocks from a saved Textract response without calling any provider.
pub fn reduce_blocks(blocks: Vec<Block>) -> AppResult<DocumentResult> {
    reduce_document(blocks)
        .ok_or_else(|| AppError::InvalidInput("response contains no blocks".to_string()))
}
