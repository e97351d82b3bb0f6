use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::{
    commands::documents::{detect_kind, extract_document},
    core::{
        errors::{AppError, AppResult},
        types::{
            AskQuestionRequest, AskQuestionResponse, DocumentResult, DocumentSource,
            ExtractDocumentRequest, OcrProvider, Provider, QaProvider,
        },
    },
    qa::prompts::{document_prompt, SYSTEM_PROMPT},
    security::keyring,
    AppState,
};

pub async fn ask_question(
    state: &AppState,
    request: AskQuestionRequest,
) -> AppResult<AskQuestionResponse> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(AppError::InvalidInput("question cannot be empty".to_string()));
    }

    let started = Instant::now();
    let (answer, model) = match request.provider {
        QaProvider::Claude => {
            let document = match request.source {
                DocumentSource::Extracted { result } => result,
                DocumentSource::File { file_path } => extract_for_prompt(state, file_path).await?,
                DocumentSource::Url { .. } => {
                    return Err(AppError::InvalidInput(
                        "claude answers from extracted content; pass a file or an extracted result"
                            .to_string(),
                    ))
                }
            };
            let answer = ask_claude(state, &document, question).await?;
            (answer, state.claude.model().to_string())
        }
        QaProvider::Mistral => {
            let document_url = match request.source {
                DocumentSource::Url { document_url } => document_url,
                DocumentSource::File { file_path } => upload_for_mistral(state, &file_path).await?,
                DocumentSource::Extracted { .. } => {
                    return Err(AppError::InvalidInput(
                        "mistral document q&a needs a file or a document URL".to_string(),
                    ))
                }
            };
            let api_key = keyring::get_provider_key(Provider::Mistral)?;
            let answer = tokio::time::timeout(
                state.config.provider_timeout,
                state.mistral.ask_document(&api_key, &document_url, question),
            )
            .await??;
            (answer, state.mistral.qa_model().to_string())
        }
    };

    let latency_ms = started.elapsed().as_millis() as i64;
    info!(provider = ?request.provider, %model, latency_ms, "question answered");
    Ok(AskQuestionResponse {
        answer,
        provider: request.provider,
        model,
        latency_ms,
    })
}

async fn extract_for_prompt(state: &AppState, file_path: String) -> AppResult<DocumentResult> {
    let response = extract_document(
        state,
        ExtractDocumentRequest {
            file_path,
            mime_type: None,
            display_name: None,
            provider: OcrProvider::Textract,
        },
    )
    .await?;
    Ok(response.result)
}

async fn ask_claude(state: &AppState, document: &DocumentResult, question: &str) -> AppResult<String> {
    let api_key = keyring::get_provider_key(Provider::Anthropic)?;
    let prompt = document_prompt(document, question, state.config.max_prompt_chars);
    tokio::time::timeout(
        state.config.provider_timeout,
        state.claude.answer(&api_key, SYSTEM_PROMPT, &prompt),
    )
    .await?
}

async fn upload_for_mistral(state: &AppState, file_path: &str) -> AppResult<String> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(AppError::NotFound(format!("file {file_path}")));
    }
    let bytes = tokio::fs::read(path).await?;
    let size = bytes.len() as u64;
    if size > state.config.mistral_limit_bytes {
        return Err(AppError::DocumentTooLarge {
            size,
            limit: state.config.mistral_limit_bytes,
        });
    }
    let mime = detect_kind(path, None, &bytes)?.mime();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());

    let api_key = keyring::get_provider_key(Provider::Mistral)?;
    let file_id = tokio::time::timeout(
        state.config.provider_timeout,
        state.mistral.upload_file(&api_key, &file_name, bytes, mime),
    )
    .await??;
    info!(%file_id, "uploaded document for q&a");
    tokio::time::timeout(
        state.config.provider_timeout,
        state.mistral.signed_url(&api_key, &file_id),
    )
    .await?
}
