use std::env;
use std::fmt;
use thiserror::Error;

use crate::units::{PreferenceHints, parse_temperature_unit, parse_unit_system, parse_wind_unit};

pub const INTERVALS_API_KEY_VAR: &str = "INTERVALS_API";
pub const ATHLETE_ID_VAR: &str = "ATHLETE_ID";
pub const LLM_API_KEY_VAR: &str = "OPENROUTER";
pub const MODEL_VAR: &str = "OPENROUTER_MODEL";

const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_INTERVALS_BASE_URL: &str = "https://intervals.icu/api/v1";
const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DAYS: u32 = 30;
const DEFAULT_CONTEXT_MAX_CHARS: usize = 24_000;
const MISSING_HINT: &str =
    "add them to the environment or a .env file (run with --setup for instructions)";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required settings: {}; {}", .0.join(", "), MISSING_HINT)]
    Missing(Vec<&'static str>),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub model: String,
    pub intervals_base_url: String,
    pub llm_base_url: String,
    pub fetch_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    pub default_days: u32,
    pub context_max_chars: usize,
    pub unit_hints: PreferenceHints,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            intervals_base_url: DEFAULT_INTERVALS_BASE_URL.to_string(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            default_days: DEFAULT_DAYS,
            context_max_chars: DEFAULT_CONTEXT_MAX_CHARS,
            unit_hints: PreferenceHints::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub intervals_api_key: ApiKey,
    pub athlete_id: String,
    pub llm_api_key: ApiKey,
    pub settings: Settings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub fn from_env_with(
        mut get_var: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut read_required = |key: &'static str, missing: &mut Vec<&'static str>| {
            let value = non_empty(get_var(key));
            if value.is_none() {
                missing.push(key);
            }
            value
        };

        let mut missing = Vec::new();
        let intervals_api_key = read_required(INTERVALS_API_KEY_VAR, &mut missing);
        let athlete_id = read_required(ATHLETE_ID_VAR, &mut missing);
        let llm_api_key = read_required(LLM_API_KEY_VAR, &mut missing);

        let (Some(intervals_api_key), Some(athlete_id), Some(llm_api_key)) =
            (intervals_api_key, athlete_id, llm_api_key)
        else {
            return Err(ConfigError::Missing(missing));
        };

        if athlete_id.contains('/') || athlete_id.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                key: ATHLETE_ID_VAR,
                reason: format!("'{athlete_id}' is not an athlete identifier"),
            });
        }

        Ok(Self {
            intervals_api_key: ApiKey::new(intervals_api_key),
            athlete_id,
            llm_api_key: ApiKey::new(llm_api_key),
            settings: Settings::from_env_with(get_var),
        })
    }
}

impl Settings {
    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let unit_hints = PreferenceHints {
            system: parse_unit_system(get_var("UNITS").as_deref()),
            temperature: parse_temperature_unit(get_var("TEMPERATURE_UNIT").as_deref()),
            wind: parse_wind_unit(get_var("WIND_UNIT").as_deref()),
        };

        Self {
            model: non_empty(get_var(MODEL_VAR)).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            intervals_base_url: non_empty(get_var("INTERVALS_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_INTERVALS_BASE_URL.to_string()),
            llm_base_url: non_empty(get_var("LLM_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            fetch_timeout_secs: parse_positive_u64(
                get_var("FETCH_TIMEOUT_SECS").as_deref(),
                DEFAULT_FETCH_TIMEOUT_SECS,
            ),
            llm_timeout_secs: parse_positive_u64(
                get_var("LLM_TIMEOUT_SECS").as_deref(),
                DEFAULT_LLM_TIMEOUT_SECS,
            ),
            default_days: parse_positive_u64(
                get_var("DEFAULT_DAYS").as_deref(),
                u64::from(DEFAULT_DAYS),
            )
            .try_into()
            .unwrap_or(DEFAULT_DAYS),
            context_max_chars: parse_positive_u64(
                get_var("CONTEXT_MAX_CHARS").as_deref(),
                DEFAULT_CONTEXT_MAX_CHARS as u64,
            )
            .try_into()
            .unwrap_or(DEFAULT_CONTEXT_MAX_CHARS),
            unit_hints,
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
