//! Runtime configuration.
//!
//! Every tunable is read from the environment once at startup (an optional
//! `.env` file is loaded first). Nothing here is business logic; the values
//! are handed to the pipeline, the rating store and the HTTP layer.

use crate::error::AppError;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;
use validator::Validate;

// --- Defaults ---
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_PRIMARY_TIMEOUT_SECS: f64 = 90.0;
const DEFAULT_DETECTION_TIMEOUT_SECS: f64 = 5.0;
const DEFAULT_REFLECTION_TIMEOUT_SECS: f64 = 10.0;
const DEFAULT_STORE_TIMEOUT_SECS: f64 = 2.0;
const MEMORY_STORE_SCHEME: &str = "memory";
const DEFAULT_MIN_CHARS: usize = 10;
const DEFAULT_MAX_CHARS: usize = 5000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

const BUILTIN_ORIGINS: &[&str] = &[
    "https://promptodactyl.com",
    "https://www.promptodactyl.com",
    "https://promptodactyl.vercel.app",
    "http://localhost:5173",
    "http://localhost:3000",
];

/// Inclusive bounds on the trimmed character length of a submitted prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct PromptLengthPolicy {
    #[validate(range(min = 1))]
    pub min_chars: usize,
    #[validate(range(min = 1))]
    pub max_chars: usize,
}

impl Default for PromptLengthPolicy {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Per-call time budgets for the generative service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudgets {
    /// Refinement and enhancement calls.
    pub primary: Duration,
    pub language_detection: Duration,
    pub context_reflection: Duration,
}

impl Default for TimeoutBudgets {
    fn default() -> Self {
        Self {
            primary: Duration::from_secs_f64(DEFAULT_PRIMARY_TIMEOUT_SECS),
            language_detection: Duration::from_secs_f64(DEFAULT_DETECTION_TIMEOUT_SECS),
            context_reflection: Duration::from_secs_f64(DEFAULT_REFLECTION_TIMEOUT_SECS),
        }
    }
}

/// Where rating counters live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Redis(String),
    /// Process-local counters, lost on restart. Selected with `REDIS_URL=memory://`.
    Memory,
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
    pub timeouts: TimeoutBudgets,
    pub prompt_policy: PromptLengthPolicy,
    pub allowed_origins: Vec<String>,
    pub store: StoreBackend,
    /// Budget for each rating store operation.
    pub store_timeout: Duration,
    pub listen: SocketAddr,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = Url::parse(&get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))?;

        let redis_url = get("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());
        let store = if Url::parse(&redis_url)?.scheme() == MEMORY_STORE_SCHEME {
            StoreBackend::Memory
        } else {
            StoreBackend::Redis(redis_url)
        };
        let store_timeout = parse_secs("REDIS_TIMEOUT", get("REDIS_TIMEOUT"), DEFAULT_STORE_TIMEOUT_SECS)?;

        let timeouts = TimeoutBudgets {
            primary: parse_secs("OPENAI_TIMEOUT", get("OPENAI_TIMEOUT"), DEFAULT_PRIMARY_TIMEOUT_SECS)?,
            language_detection: parse_secs(
                "LANGUAGE_DETECTION_TIMEOUT",
                get("LANGUAGE_DETECTION_TIMEOUT"),
                DEFAULT_DETECTION_TIMEOUT_SECS,
            )?,
            context_reflection: parse_secs(
                "CONTEXT_REFLECTION_TIMEOUT",
                get("CONTEXT_REFLECTION_TIMEOUT"),
                DEFAULT_REFLECTION_TIMEOUT_SECS,
            )?,
        };

        let prompt_policy = PromptLengthPolicy {
            min_chars: parse_num("PROMPT_MIN_CHARS", get("PROMPT_MIN_CHARS"), DEFAULT_MIN_CHARS)?,
            max_chars: parse_num("PROMPT_MAX_CHARS", get("PROMPT_MAX_CHARS"), DEFAULT_MAX_CHARS)?,
        };
        prompt_policy
            .validate()
            .map_err(|e| AppError::Config(format!("Invalid prompt length policy: {}", e)))?;
        if prompt_policy.min_chars > prompt_policy.max_chars {
            return Err(AppError::Config(format!(
                "PROMPT_MIN_CHARS ({}) exceeds PROMPT_MAX_CHARS ({})",
                prompt_policy.min_chars, prompt_policy.max_chars
            )));
        }

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_num("PORT", get("PORT"), DEFAULT_PORT)?;
        let listen: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid listen address {}:{}: {}", host, port, e)))?;

        let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("json") | Some("bunyan") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
            timeouts,
            prompt_policy,
            allowed_origins: merge_origins(get("ALLOWED_ORIGINS").as_deref()),
            store,
            store_timeout,
            listen,
            log_format,
        })
    }
}

fn merge_origins(extra: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = BUILTIN_ORIGINS.iter().map(|o| o.to_string()).collect();
    for origin in extra.unwrap_or_default().split(',') {
        let origin = origin.trim().trim_end_matches('/');
        if !origin.is_empty() && !origins.iter().any(|o| o == origin) {
            origins.push(origin.to_string());
        }
    }
    origins
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a non-negative integer, got '{}'", key, value))),
    }
}

fn parse_secs(key: &str, raw: Option<String>, default: f64) -> Result<Duration, AppError> {
    let secs = match raw {
        None => default,
        Some(value) => value
            .parse::<f64>()
            .map_err(|_| AppError::Config(format!("{} must be a number of seconds, got '{}'", key, value)))?,
    };
    if !secs.is_finite() || secs <= 0.0 {
        return Err(AppError::Config(format!("{} must be positive, got {}", key, secs)));
    }
    Ok(Duration::from_secs_f64(secs))
}
