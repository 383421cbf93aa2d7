//! Configuration management for the resume screener

use crate::error::{Result, ResumeScreenerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub models: ModelConfig,
    pub llm: LlmConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

/// Settings for the hosted chat-completion endpoint used for justifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    /// Environment variable consulted by `apply_env_overrides`.
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Characters of each text kept in the justification prompt.
    pub snippet_chars: usize,
    pub enable_embedding_cache: bool,
    pub on_justification_error: JustificationFailurePolicy,
}

/// What the pipeline does when the remote justification call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JustificationFailurePolicy {
    /// Abort the whole run and discard results computed so far.
    #[default]
    Abort,
    /// Record the resume as skipped and keep going.
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub pretty_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-screener")
            .join("models");

        Self {
            models_dir,
            default_embedding_model: "potion-base-8M".to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-3.5-turbo".to_string(),
            temperature: 0.5,
            max_tokens: None,
            timeout_secs: 120,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            api_key: None,
            referer: Some("http://localhost:8501".to_string()),
            app_title: Some("Resume Screener".to_string()),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            snippet_chars: 2000,
            enable_embedding_cache: true,
            on_justification_error: JustificationFailurePolicy::Abort,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color_output: true,
            pretty_json: true,
        }
    }
}

impl Config {
    /// Load the configuration from the default location, writing defaults on first use.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ResumeScreenerError::Configuration(format!("Failed to parse config '{}': {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    /// Fill the API credential from the environment when the file does not carry one.
    pub fn apply_env_overrides(mut self) -> Self {
        let has_key = self.llm.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            if let Ok(key) = std::env::var(&self.llm.api_key_env) {
                self.llm.api_key = Some(key);
            }
        }
        self
    }

    /// The credential for the justification endpoint, or a diagnostic naming where to set it.
    pub fn api_key(&self) -> Result<&str> {
        self.llm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ResumeScreenerError::Configuration(format!(
                    "API key not found. Set `{}` in the environment or `llm.api_key` in {}",
                    self.llm.api_key_env,
                    Self::config_path().display()
                ))
            })
    }

    /// Update a single setting addressed as `section.key`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |e: &dyn std::fmt::Display| {
            ResumeScreenerError::InvalidInput(format!("Invalid value '{}' for {}: {}", value, key, e))
        };

        match key {
            "models.models_dir" => self.models.models_dir = PathBuf::from(value),
            "models.default_embedding_model" => self.models.default_embedding_model = value.to_string(),
            "llm.endpoint" => self.llm.endpoint = value.to_string(),
            "llm.model" => self.llm.model = value.to_string(),
            "llm.temperature" => self.llm.temperature = value.parse().map_err(|e| invalid(&e))?,
            "llm.max_tokens" => self.llm.max_tokens = Some(value.parse().map_err(|e| invalid(&e))?),
            "llm.timeout_secs" => self.llm.timeout_secs = value.parse().map_err(|e| invalid(&e))?,
            "llm.api_key_env" => self.llm.api_key_env = value.to_string(),
            "llm.referer" => self.llm.referer = Some(value.to_string()),
            "llm.app_title" => self.llm.app_title = Some(value.to_string()),
            "processing.snippet_chars" => self.processing.snippet_chars = value.parse().map_err(|e| invalid(&e))?,
            "processing.enable_embedding_cache" => {
                self.processing.enable_embedding_cache = value.parse().map_err(|e| invalid(&e))?
            }
            "processing.on_justification_error" => {
                self.processing.on_justification_error = match value {
                    "abort" => JustificationFailurePolicy::Abort,
                    "skip" => JustificationFailurePolicy::Skip,
                    _ => return Err(invalid(&"expected 'abort' or 'skip'")),
                }
            }
            "output.format" => {
                self.output.format = crate::cli::parse_output_format(value).map_err(|e| invalid(&e))?
            }
            "output.color_output" => self.output.color_output = value.parse().map_err(|e| invalid(&e))?,
            "output.pretty_json" => self.output.pretty_json = value.parse().map_err(|e| invalid(&e))?,
            _ => {
                return Err(ResumeScreenerError::InvalidInput(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }

        Ok(())
    }
}
