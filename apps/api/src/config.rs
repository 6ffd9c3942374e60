use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_API_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential used for new sessions that do not bring their own key.
    pub default_api_key: Option<String>,
    pub llm_api_url: String,
    pub cutoff_score: u32,
    pub port: u16,
    pub rust_log: String,
    /// Where per-analysis resume text files are written.
    pub scratch_dir: PathBuf,
    pub skill_query_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let cutoff_score = parse_env("CUTOFF_SCORE", 75u32)?;
        if cutoff_score > 100 {
            bail!("CUTOFF_SCORE must be between 0 and 100, got {cutoff_score}");
        }

        Ok(Config {
            default_api_key: optional_env("EURI_API_KEY"),
            llm_api_url: optional_env("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            cutoff_score,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            scratch_dir: optional_env("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            skill_query_timeout: Duration::from_secs(parse_env("SKILL_QUERY_TIMEOUT_SECS", 60u64)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value = parse_env("SCREENER_TEST_UNSET_VARIABLE", 42u32).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("SCREENER_TEST_GARBAGE_PORT", "eighty");
        let err = parse_env("SCREENER_TEST_GARBAGE_PORT", 8080u16).unwrap_err();
        assert!(err.to_string().contains("SCREENER_TEST_GARBAGE_PORT"));
    }

    #[test]
    fn test_optional_env_treats_blank_as_missing() {
        std::env::set_var("SCREENER_TEST_BLANK_KEY", "   ");
        assert!(optional_env("SCREENER_TEST_BLANK_KEY").is_none());
    }
}
