//! Service settings
//!
//! Loaded once at startup from an optional JSON file, then overridden by
//! environment variables. The resulting `Settings` value is passed to
//! whatever needs it; there is no global instance.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BACKEND_GEMINI: &str = "gemini";
pub const BACKEND_ANTHROPIC: &str = "anthropic";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-haiku-4-5-20251001";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// LLM backend: "gemini" or "anthropic" (default: "gemini")
    #[serde(default = "default_llm_backend")]
    pub llm_backend: String,
    /// Model override (None = backend default)
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub completion_timeout_secs: u64,
    /// Characters of first-page text sent to the model
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Added to the built-in educational marker list
    #[serde(default)]
    pub extra_educational_markers: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_llm_backend() -> String {
    BACKEND_GEMINI.to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_document_chars() -> usize {
    3000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            llm_backend: default_llm_backend(),
            model: None,
            gemini_api_key: None,
            anthropic_api_key: None,
            temperature: default_temperature(),
            completion_timeout_secs: default_timeout_secs(),
            max_document_chars: default_max_document_chars(),
            max_upload_bytes: default_max_upload_bytes(),
            extra_educational_markers: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid settings {}: {}", path.display(), e))
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("FINEPRINT_BIND") {
            self.bind_addr = v;
        }
        if let Some(v) = get("FINEPRINT_LLM_BACKEND") {
            self.llm_backend = v.to_lowercase();
        }
        if let Some(v) = get("FINEPRINT_MODEL") {
            self.model = Some(v);
        }
        // "Fineprint" is the variable the first deployment used for the Gemini key
        if let Some(v) = get("GEMINI_API_KEY").or_else(|| get("Fineprint")) {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = get("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(v);
        }
        if let Some(v) = get("FINEPRINT_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = v;
        }
        if let Some(v) = get("FINEPRINT_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.completion_timeout_secs = v;
        }
        if let Some(v) = get("FINEPRINT_MAX_UPLOAD_BYTES").and_then(|v| v.parse().ok()) {
            self.max_upload_bytes = v;
        }
    }

    /// Model to request, resolving the backend default
    pub fn model_name(&self) -> String {
        if let Some(model) = self.model.as_deref().filter(|m| !m.is_empty()) {
            return model.to_string();
        }
        match self.llm_backend.as_str() {
            BACKEND_ANTHROPIC => DEFAULT_ANTHROPIC_MODEL.to_string(),
            _ => DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs.max(1))
    }
}

/// Default settings file location
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("fineprint").join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("fineprint.json"))
}

/// Load from `path` (or the default location) and apply environment overrides
pub fn load_with_env(path: Option<&Path>) -> Result<Settings, String> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let mut settings = Settings::load(&path)?;
    settings.apply_env();
    Ok(settings)
}
