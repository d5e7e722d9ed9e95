use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    FitnessApi,
    LlmGateway,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FitnessApi => "intervals.icu",
            Self::LlmGateway => "LLM gateway",
        }
    }

    pub fn credential_hint(&self) -> &'static str {
        match self {
            Self::FitnessApi => "INTERVALS_API and ATHLETE_ID",
            Self::LlmGateway => "OPENROUTER",
        }
    }

    pub fn base_url_setting(&self) -> &'static str {
        match self {
            Self::FitnessApi => "INTERVALS_BASE_URL",
            Self::LlmGateway => "LLM_BASE_URL",
        }
    }

    pub fn timeout_setting(&self) -> &'static str {
        match self {
            Self::FitnessApi => "FETCH_TIMEOUT_SECS",
            Self::LlmGateway => "LLM_TIMEOUT_SECS",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "{service} rejected the credentials (HTTP {status}); check {}",
        .service.credential_hint()
    )]
    Auth { service: Service, status: u16 },

    #[error("{service}: {resource} not found")]
    NotFound { service: Service, resource: String },

    #[error("{service} is temporarily unavailable: {detail}")]
    Transient { service: Service, detail: String },

    #[error("{service} rate limit reached{}; try again later", retry_note(.retry_after))]
    RateLimited {
        service: Service,
        retry_after: Option<u64>,
    },

    #[error("{service} request failed with HTTP {status}: {body}")]
    Rejected {
        service: Service,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unreadable response: {detail}")]
    InvalidResponse { service: Service, detail: String },
}

fn retry_note(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

impl Error {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
