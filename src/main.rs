use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use docqa_lib::{
    commands::{documents, questions, settings},
    core::{
        config::AppConfig,
        errors::{AppError, AppResult},
        types::{
            AskQuestionRequest, DocumentSource, ExtractDocumentRequest, OcrProvider, Provider,
            QaProvider,
        },
    },
    reducer::Block,
    AppState,
};

#[derive(Parser)]
#[command(name = "docqa", version, about = "Extract documents with OCR providers and ask questions about them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract text, key-value pairs and tables from a PDF or image
    Extract {
        file: PathBuf,
        #[arg(long, default_value = "textract")]
        provider: OcrProvider,
        #[arg(long)]
        mime: Option<String>,
    },
    /// Reduce a saved Textract AnalyzeDocument JSON response offline
    Reduce { response: PathBuf },
    /// Ask a question about a document file, or a document URL with `--llm mistral`
    Ask {
        document: String,
        question: String,
        #[arg(long, default_value = "claude")]
        llm: QaProvider,
        #[arg(long, default_value = "textract")]
        ocr: OcrProvider,
    },
    /// Store a provider API key in the OS keyring
    SetKey {
        provider: Provider,
        #[arg(env = "DOCQA_API_KEY", hide_env_values = true)]
        api_key: String,
    },
}

/// A saved AnalyzeDocument response, or just its block list.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SavedResponse {
    Response {
        #[serde(rename = "Blocks")]
        blocks: Vec<Block>,
    },
    Blocks(Vec<Block>),
}

impl SavedResponse {
    fn into_blocks(self) -> Vec<Block> {
        match self {
            Self::Response { blocks } | Self::Blocks(blocks) => blocks,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    docqa_lib::init_logging();
    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let rendered = serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string());
            eprintln!("{rendered}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> AppResult<()> {
    match command {
        Command::Extract {
            file,
            provider,
            mime,
        } => {
            let state = AppState::from_config(AppConfig::from_env()?).await?;
            let response = documents::extract_document(
                &state,
                ExtractDocumentRequest {
                    file_path: file.to_string_lossy().to_string(),
                    mime_type: mime,
                    display_name: None,
                    provider,
                },
            )
            .await?;
            print_json(&response)
        }
        Command::Reduce { response } => {
            let raw = tokio::fs::read_to_string(&response).await?;
            let saved: SavedResponse = serde_json::from_str(&raw)?;
            print_json(&documents::reduce_blocks(saved.into_blocks())?)
        }
        Command::Ask {
            document,
            question,
            llm,
            ocr,
        } => {
            let state = AppState::from_config(AppConfig::from_env()?).await?;
            let is_url = document.starts_with("https://") || document.starts_with("http://");
            let source = match (llm, ocr) {
                (QaProvider::Mistral, _) if is_url => DocumentSource::Url {
                    document_url: document,
                },
                (QaProvider::Claude, OcrProvider::Mistral) => {
                    let extracted = documents::extract_document(
                        &state,
                        ExtractDocumentRequest {
                            file_path: document,
                            mime_type: None,
                            display_name: None,
                            provider: OcrProvider::Mistral,
                        },
                    )
                    .await?;
                    DocumentSource::Extracted {
                        result: extracted.result,
                    }
                }
                _ => DocumentSource::File {
                    file_path: document,
                },
            };
            let response = questions::ask_question(
                &state,
                AskQuestionRequest {
                    question,
                    provider: llm,
                    source,
                },
            )
            .await?;
            print_json(&response)
        }
        Command::SetKey { provider, api_key } => {
            print_json(&settings::set_provider_key(provider, &api_key)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| AppError::Internal(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}
