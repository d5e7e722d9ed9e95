use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::{Error, Service};

const MAX_ERROR_BODY_CHARS: usize = 300;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn request_error(
    service: Service,
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> Error {
    let detail = if err.is_timeout() || error_chain_has_timeout(&err) {
        format!(
            "request to '{}' timed out after {}s; increase {} or retry later",
            api_url,
            timeout_secs,
            service.timeout_setting()
        )
    } else if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            format!(
                "connection refused at '{}'; check {}",
                api_url,
                service.base_url_setting()
            )
        } else {
            format!(
                "failed to connect to '{}'; check {} and network connectivity",
                api_url,
                service.base_url_setting()
            )
        }
    } else {
        format!("request to '{}' failed: {}", api_url, err)
    };

    Error::Transient { service, detail }
}

pub(crate) fn status_error(
    service: Service,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    resource: &str,
) -> Error {
    match status.as_u16() {
        401 | 403 => Error::Auth {
            service,
            status: status.as_u16(),
        },
        404 => Error::NotFound {
            service,
            resource: resource.to_string(),
        },
        429 => Error::RateLimited {
            service,
            retry_after: retry_after_secs(headers),
        },
        408 | 500..=599 => Error::Transient {
            service,
            detail: format!("HTTP {}", status),
        },
        code => Error::Rejected {
            service,
            status: code,
            body: truncate_body(body),
        },
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    cut.push_str("...");
    cut
}
