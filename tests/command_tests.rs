use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use docqa_lib::commands::{documents, questions, settings};
use docqa_lib::core::config::AppConfig;
use docqa_lib::core::errors::{AppError, AppResult};
use docqa_lib::core::types::{
    AskQuestionRequest, DocumentResult, DocumentSource, ExtractDocumentRequest, OcrProvider,
    Provider, QaProvider,
};
use docqa_lib::providers::DocumentAnalyzer;
use docqa_lib::reducer::{Block, BlockType};
use docqa_lib::sidecar::types::RasterizedDocument;
use docqa_lib::sidecar::PageRasterizer;
use docqa_lib::AppState;

struct EchoAnalyzer;

#[async_trait]
impl DocumentAnalyzer for EchoAnalyzer {
    fn name(&self) -> &str {
        "echo"
    }

    async fn analyze_direct(&self, _document: &[u8]) -> AppResult<Vec<Block>> {
        Ok(vec![Block::new("l1", BlockType::Line).with_text("from pdf")])
    }

    async fn analyze_image(&self, _image: &[u8]) -> AppResult<Vec<Block>> {
        Ok(vec![Block::new("l1", BlockType::Line).with_text("from image")])
    }
}

struct NoRasterizer;

#[async_trait]
impl PageRasterizer for NoRasterizer {
    async fn rasterize(&self, _pdf_path: &Path, _output_dir: &Path) -> AppResult<RasterizedDocument> {
        Err(AppError::Sidecar("not available in tests".to_string()))
    }
}

fn state(scratch_root: &Path) -> AppState {
    let config = AppConfig {
        scratch_root: scratch_root.to_path_buf(),
        ..AppConfig::default()
    };
    AppState::new(config, Arc::new(EchoAnalyzer), Arc::new(NoRasterizer)).expect("state")
}

fn request(path: &Path) -> ExtractDocumentRequest {
    ExtractDocumentRequest {
        file_path: path.to_string_lossy().to_string(),
        mime_type: None,
        display_name: None,
        provider: OcrProvider::Textract,
    }
}

#[tokio::test]
async fn pdf_extraction_returns_metadata_and_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf = dir.path().join("invoice.pdf");
    std::fs::write(&pdf, b"%PDF-1.7 tiny").expect("write pdf");

    let response = documents::extract_document(&state(dir.path()), request(&pdf))
        .await
        .expect("extracted");

    assert_eq!(response.name, "invoice.pdf");
    assert_eq!(response.mime, "application/pdf");
    assert_eq!(response.checksum.len(), 64);
    assert_eq!(response.provider, OcrProvider::Textract);
    assert_eq!(response.result.text, "=== Page 1 ===\nfrom pdf");
}

#[tokio::test]
async fn png_extraction_goes_through_the_image_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = dir.path().join("scan.png");
    let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    std::fs::write(&png, header).expect("write png");

    let mut req = request(&png);
    req.display_name = Some("Receipt".to_string());
    let response = documents::extract_document(&state(dir.path()), req)
        .await
        .expect("extracted");

    assert_eq!(response.name, "Receipt");
    assert_eq!(response.mime, "image/png");
    assert_eq!(response.result.text, "=== Page 1 ===\nfrom image");
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = documents::extract_document(&state(dir.path()), request(&dir.path().join("gone.pdf")))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn text_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "plain words").expect("write notes");

    let err = documents::extract_document(&state(dir.path()), request(&notes))
        .await
        .expect_err("unsupported input");
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn saved_blocks_reduce_without_a_provider() {
    let blocks = vec![Block::new("l", BlockType::Line).with_text("saved").with_page(1)];
    let result = documents::reduce_blocks(blocks).expect("reduced");
    assert_eq!(result.text, "=== Page 1 ===\nsaved");

    let err = documents::reduce_blocks(Vec::new()).expect_err("empty");
    assert_eq!(err.code(), "INVALID_INPUT");
}

fn extracted() -> DocumentSource {
    DocumentSource::Extracted {
        result: DocumentResult {
            text: "=== Page 1 ===\nhello".to_string(),
            key_value_pairs: Vec::new(),
            form_fields: Vec::new(),
            tables: Vec::new(),
            total_pages: 1,
        },
    }
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = questions::ask_question(
        &state(dir.path()),
        AskQuestionRequest {
            question: "   ".to_string(),
            provider: QaProvider::Claude,
            source: extracted(),
        },
    )
    .await
    .expect_err("blank question");
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[tokio::test]
async fn provider_and_source_must_be_compatible() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = state(dir.path());

    let err = questions::ask_question(
        &state,
        AskQuestionRequest {
            question: "Who signed?".to_string(),
            provider: QaProvider::Claude,
            source: DocumentSource::Url {
                document_url: "https://example.com/a.pdf".to_string(),
            },
        },
    )
    .await
    .expect_err("claude with url");
    assert_eq!(err.code(), "INVALID_INPUT");

    let err = questions::ask_question(
        &state,
        AskQuestionRequest {
            question: "Who signed?".to_string(),
            provider: QaProvider::Mistral,
            source: extracted(),
        },
    )
    .await
    .expect_err("mistral with extracted result");
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn blank_api_key_is_rejected_before_touching_the_keyring() {
    let err = settings::set_provider_key(Provider::Mistral, "  ").expect_err("blank key");
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn ask_request_source_uses_tagged_json() {
    let request: AskQuestionRequest = serde_json::from_value(serde_json::json!({
        "question": "What is due?",
        "provider": "mistral",
        "source": {"kind": "url", "documentUrl": "https://example.com/a.pdf"}
    }))
    .expect("request");

    assert_eq!(request.provider, QaProvider::Mistral);
    assert!(matches!(
        request.source,
        DocumentSource::Url { document_url } if document_url == "https://example.com/a.pdf"
    ));
}
