use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Language model connection settings, built once at startup.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    /// Read configuration from environment variables.
    ///
    /// - `BROCHURE_API_KEY` (required, falls back to `GEMINI_API_KEY`)
    /// - `BROCHURE_MODEL` (optional, defaults to [`DEFAULT_MODEL`])
    /// - `BROCHURE_BASE_URL` (optional, defaults to [`DEFAULT_BASE_URL`])
    /// - `BROCHURE_LLM_TIMEOUT_SECS` (optional, defaults to 120)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_env_with_api_key(None)
    }

    /// Like [`from_env`](Self::from_env), but an explicit key takes precedence.
    pub fn from_env_with_api_key(api_key: Option<String>) -> Result<Self, AppError> {
        Self::from_lookup(api_key, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        api_key: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let api_key = resolve_api_key(api_key, &lookup)?;
        let model = non_blank(lookup("BROCHURE_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.into());
        let base_url =
            non_blank(lookup("BROCHURE_BASE_URL")).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = parse_secs("BROCHURE_LLM_TIMEOUT_SECS", lookup("BROCHURE_LLM_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_LLM_TIMEOUT);

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
        })
    }

    /// Replace any field for which an explicit override was given.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Self {
        if let Some(model) = non_blank(model) {
            self.model = model;
        }
        if let Some(base_url) = non_blank(base_url) {
            self.base_url = base_url;
        }
        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }
        self
    }
}

/// Page fetching settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl FetchConfig {
    /// Read `BROCHURE_FETCH_TIMEOUT_SECS` (optional, defaults to 10).
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let timeout = parse_secs(
            "BROCHURE_FETCH_TIMEOUT_SECS",
            lookup("BROCHURE_FETCH_TIMEOUT_SECS"),
        )?
        .unwrap_or(DEFAULT_FETCH_TIMEOUT);
        Ok(Self { timeout })
    }
}

/// Pick the API key: explicit value, then `BROCHURE_API_KEY`, then `GEMINI_API_KEY`.
fn resolve_api_key(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, AppError> {
    non_blank(explicit)
        .or_else(|| non_blank(lookup("BROCHURE_API_KEY")))
        .or_else(|| non_blank(lookup("GEMINI_API_KEY")))
        .ok_or_else(|| {
            AppError::ConfigError(
                "API key not set. Provide --api-key or set BROCHURE_API_KEY (or GEMINI_API_KEY)."
                    .into(),
            )
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_secs(name: &str, raw: Option<String>) -> Result<Option<Duration>, AppError> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };
    let secs: u64 = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid {name} '{raw}': must be a positive integer"
        ))
    })?;
    if secs == 0 {
        return Err(AppError::ConfigError(format!("{name} must be at least 1")));
    }
    Ok(Some(Duration::from_secs(secs)))
}
