use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::errors::{AppError, AppResult};

pub const DEFAULT_DIRECT_LIMIT_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_PAGE_LIMIT_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MISTRAL_LIMIT_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RasterizerCommand {
    /// Splits `"python3 scripts/pdf_to_images.py"` into program and leading args.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let mut parts = raw.split_whitespace().map(ToString::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AppError::InvalidInput("rasterizer command is empty".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

const RASTERIZER_SCRIPT: &str = "scripts/pdf_to_images.py";

/// Absolute path of the bundled rasterizer: next to the executable when
/// installed with it, otherwise in the source checkout the binary was built from.
fn default_rasterizer_script() -> PathBuf {
    let installed = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(RASTERIZER_SCRIPT)))
        .filter(|path| path.is_file());
    installed.unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join(RASTERIZER_SCRIPT))
}

impl Default for RasterizerCommand {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec![default_rasterizer_script().to_string_lossy().to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub aws_region: Option<String>,
    pub direct_limit_bytes: u64,
    pub page_limit_bytes: u64,
    pub mistral_limit_bytes: u64,
    pub provider_timeout: Duration,
    pub document_timeout: Duration,
    pub rasterizer: RasterizerCommand,
    pub scratch_root: PathBuf,
    pub claude_model: String,
    pub mistral_qa_model: String,
    pub mistral_ocr_model: String,
    pub max_prompt_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            aws_region: None,
            direct_limit_bytes: DEFAULT_DIRECT_LIMIT_BYTES,
            page_limit_bytes: DEFAULT_PAGE_LIMIT_BYTES,
            mistral_limit_bytes: DEFAULT_MISTRAL_LIMIT_BYTES,
            provider_timeout: Duration::from_secs(120),
            document_timeout: Duration::from_secs(900),
            rasterizer: RasterizerCommand::default(),
            scratch_root: std::env::temp_dir(),
            claude_model: "claude-sonnet-4-5".to_string(),
            mistral_qa_model: "mistral-small-latest".to_string(),
            mistral_ocr_model: "mistral-ocr-latest".to_string(),
            max_prompt_chars: 100_000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source; unset or blank
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let rasterizer = match get("DOCQA_RASTERIZER") {
            Some(raw) => RasterizerCommand::parse(&raw)?,
            None => defaults.rasterizer,
        };

        Ok(Self {
            aws_region: get("DOCQA_AWS_REGION"),
            direct_limit_bytes: parse_number(get("DOCQA_DIRECT_LIMIT_BYTES"), "DOCQA_DIRECT_LIMIT_BYTES")?
                .unwrap_or(defaults.direct_limit_bytes),
            page_limit_bytes: parse_number(get("DOCQA_PAGE_LIMIT_BYTES"), "DOCQA_PAGE_LIMIT_BYTES")?
                .unwrap_or(defaults.page_limit_bytes),
            mistral_limit_bytes: parse_number(get("DOCQA_MISTRAL_LIMIT_BYTES"), "DOCQA_MISTRAL_LIMIT_BYTES")?
                .unwrap_or(defaults.mistral_limit_bytes),
            provider_timeout: parse_number(get("DOCQA_PROVIDER_TIMEOUT_SECS"), "DOCQA_PROVIDER_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
            document_timeout: parse_number(get("DOCQA_DOCUMENT_TIMEOUT_SECS"), "DOCQA_DOCUMENT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.document_timeout),
            rasterizer,
            scratch_root: get("DOCQA_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_root),
            claude_model: get("DOCQA_CLAUDE_MODEL").unwrap_or(defaults.claude_model),
            mistral_qa_model: get("DOCQA_MISTRAL_QA_MODEL").unwrap_or(defaults.mistral_qa_model),
            mistral_ocr_model: get("DOCQA_MISTRAL_OCR_MODEL").unwrap_or(defaults.mistral_ocr_model),
            max_prompt_chars: parse_number(get("DOCQA_MAX_PROMPT_CHARS"), "DOCQA_MAX_PROMPT_CHARS")?
                .map(|value| value as usize)
                .unwrap_or(defaults.max_prompt_chars),
        })
    }
}

fn parse_number(raw: Option<String>, name: &str) -> AppResult<Option<u64>> {
    raw.map(|value| {
        value
            .parse::<u64>()
            .map_err(|err| AppError::InvalidInput(format!("{name}={value}: {err}")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config.direct_limit_bytes, DEFAULT_DIRECT_LIMIT_BYTES);
        assert_eq!(config.page_limit_bytes, DEFAULT_PAGE_LIMIT_BYTES);
        assert_eq!(config.rasterizer, RasterizerCommand::default());
        assert!(config.aws_region.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DOCQA_AWS_REGION", "eu-west-1"),
            ("DOCQA_PAGE_LIMIT_BYTES", "2048"),
            ("DOCQA_PROVIDER_TIMEOUT_SECS", "5"),
            ("DOCQA_RASTERIZER", "  pdf2img --dpi 144 "),
        ]))
        .expect("config");
        assert_eq!(config.aws_region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.page_limit_bytes, 2048);
        assert_eq!(config.provider_timeout, Duration::from_secs(5));
        assert_eq!(config.rasterizer.program, "pdf2img");
        assert_eq!(config.rasterizer.args, vec!["--dpi", "144"]);
    }

    #[test]
    fn default_rasterizer_script_does_not_depend_on_working_directory() {
        let command = RasterizerCommand::default();
        let script = Path::new(&command.args[0]);
        assert!(script.is_absolute(), "{}", script.display());
        assert!(script.ends_with(RASTERIZER_SCRIPT));
        assert!(script.is_file(), "{}", script.display());
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("DOCQA_DIRECT_LIMIT_BYTES", "ten")]))
            .expect_err("expected invalid input");
        assert!(err.to_string().contains("DOCQA_DIRECT_LIMIT_BYTES"));
    }
}
