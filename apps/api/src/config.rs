use std::str::FromStr;
use std::time::Duration;

use crate::errors::StartupError;

const DEFAULT_DEEPL_API_URL: &str = "https://api-free.deepl.com/v2/translate";
const DEFAULT_EXAMPLE_URL_BASE: &str =
    "https://devfusionbucket.s3.eu-west-3.amazonaws.com/chat-bot-resume-folder";

/// Application configuration loaded from environment variables.
/// Startup aborts if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub deepl_api_key: String,
    pub deepl_api_url: String,
    pub runpod_api_key: String,
    pub runpod_base_url: String,
    pub working_lang: String,
    pub display_lang: String,
    pub corpus_path: String,
    pub examples_dir: String,
    pub example_url_base: String,
    pub matching: MatchSettings,
    pub generation: GenerationSettings,
    pub port: u16,
    pub rust_log: String,
}

/// Acceptance threshold and per-field weights for resume example matching.
/// Empirical values; tune against the corpus actually deployed.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    pub threshold: f64,
    pub role_weight: f64,
    pub tech_weight: f64,
    pub level_weight: f64,
    pub domain_weight: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            threshold: 300.0,
            role_weight: 3.0,
            tech_weight: 1.0,
            level_weight: 0.5,
            domain_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    /// Overall ceiling for one generation call, on top of the attempt budget.
    pub deadline: Option<Duration>,
    /// Truncation cleanup of runaway continuations. Heuristic; keep under review.
    pub output_cleanup: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.3,
            poll_interval: Duration::from_secs(2),
            poll_max_attempts: 60,
            deadline: None,
            output_cleanup: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let runpod_endpoint_id = require_env("RUNPOD_ENDPOINT_ID")?;
        let match_defaults = MatchSettings::default();
        let generation_defaults = GenerationSettings::default();

        Ok(Config {
            deepl_api_key: require_env("DEEPL_API_KEY")?,
            deepl_api_url: env_or("DEEPL_API_URL", DEFAULT_DEEPL_API_URL),
            runpod_api_key: require_env("RUNPOD_API_KEY")?,
            runpod_base_url: std::env::var("RUNPOD_BASE_URL")
                .unwrap_or_else(|_| format!("https://api.runpod.ai/v2/{runpod_endpoint_id}")),
            working_lang: env_or("WORKING_LANG", "EN"),
            display_lang: env_or("DISPLAY_LANG", "UK"),
            corpus_path: env_or("CORPUS_PATH", "data/cv_index_semantic.json"),
            examples_dir: env_or("EXAMPLES_DIR", "examples_cv"),
            example_url_base: env_or("EXAMPLE_URL_BASE", DEFAULT_EXAMPLE_URL_BASE),
            matching: MatchSettings {
                threshold: parse_env("MATCH_THRESHOLD", match_defaults.threshold)?,
                role_weight: parse_env("MATCH_WEIGHT_ROLE", match_defaults.role_weight)?,
                tech_weight: parse_env("MATCH_WEIGHT_TECH", match_defaults.tech_weight)?,
                level_weight: parse_env("MATCH_WEIGHT_LEVEL", match_defaults.level_weight)?,
                domain_weight: parse_env("MATCH_WEIGHT_DOMAIN", match_defaults.domain_weight)?,
            },
            generation: GenerationSettings {
                max_tokens: parse_env("GENERATION_MAX_TOKENS", generation_defaults.max_tokens)?,
                temperature: parse_env("GENERATION_TEMPERATURE", generation_defaults.temperature)?,
                poll_interval: Duration::from_millis(parse_env("POLL_INTERVAL_MS", 2000u64)?),
                poll_max_attempts: parse_env(
                    "POLL_MAX_ATTEMPTS",
                    generation_defaults.poll_max_attempts,
                )?,
                deadline: optional_env::<u64>("GENERATION_DEADLINE_SECS")?
                    .map(Duration::from_secs),
                output_cleanup: parse_env("OUTPUT_CLEANUP", generation_defaults.output_cleanup)?,
            },
            port: parse_env("PORT", 8080u16)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String, StartupError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(StartupError::Configuration(format!(
            "Required environment variable '{key}' is not set"
        ))),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env<T: FromStr>(key: &str) -> Result<Option<T>, StartupError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            StartupError::Configuration(format!("'{key}' has an invalid value: {raw}"))
        }),
        Err(_) => Ok(None),
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, StartupError> {
    Ok(optional_env(key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; the process environment is shared.

    #[test]
    fn test_require_env_rejects_missing_key() {
        let err = require_env("RESUME_CHAT_TEST_MISSING_KEY").unwrap_err();
        assert!(matches!(err, StartupError::Configuration(_)));
        assert!(err.to_string().contains("RESUME_CHAT_TEST_MISSING_KEY"));
    }

    #[test]
    fn test_require_env_rejects_blank_value() {
        std::env::set_var("RESUME_CHAT_TEST_BLANK_KEY", "   ");
        assert!(require_env("RESUME_CHAT_TEST_BLANK_KEY").is_err());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: f64 = parse_env("RESUME_CHAT_TEST_UNSET_THRESHOLD", 300.0).unwrap();
        assert_eq!(value, 300.0);
    }

    #[test]
    fn test_parse_env_reads_override() {
        std::env::set_var("RESUME_CHAT_TEST_ATTEMPTS", "12");
        let value: u32 = parse_env("RESUME_CHAT_TEST_ATTEMPTS", 60).unwrap();
        assert_eq!(value, 12);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RESUME_CHAT_TEST_BAD_PORT", "eighty");
        let err = parse_env("RESUME_CHAT_TEST_BAD_PORT", 8080u16).unwrap_err();
        assert!(err.to_string().contains("RESUME_CHAT_TEST_BAD_PORT"));
    }

    #[test]
    fn test_defaults_match_documented_constants() {
        let matching = MatchSettings::default();
        assert_eq!(matching.threshold, 300.0);
        assert_eq!(matching.role_weight, 3.0);
        assert_eq!(matching.level_weight, 0.5);

        let generation = GenerationSettings::default();
        assert_eq!(generation.poll_interval, Duration::from_secs(2));
        assert_eq!(generation.poll_max_attempts, 60);
        assert!(generation.output_cleanup);
    }
}
