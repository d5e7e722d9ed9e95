use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ApiKey;
use crate::error::{Error, Service};
use crate::model::{Message, Sampling};
use crate::providers::http_errors::{request_error, status_error};

const SERVICE: Service = Service::LlmGateway;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct Endpoint<'a> {
    pub base_url: &'a str,
    pub api_key: &'a ApiKey,
    pub timeout_secs: u64,
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn key_url(base_url: &str) -> String {
    format!("{}/key", base_url.trim_end_matches('/'))
}

fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessage<'_>> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role.as_str(),
            content: &msg.content,
        })
        .collect()
}

pub async fn chat(
    client: &Client,
    endpoint: &Endpoint<'_>,
    model: &str,
    messages: &[Message],
    sampling: Sampling,
) -> Result<String, Error> {
    let api_url = chat_url(endpoint.base_url);
    let body = ChatCompletionRequest {
        model,
        messages: to_chat_messages(messages),
        temperature: sampling.temperature,
        max_tokens: sampling.max_tokens,
        stream: false,
    };
    debug!(
        api_url = %api_url,
        model = %model,
        message_count = messages.len(),
        max_tokens = sampling.max_tokens,
        "sending chat completion request"
    );

    let response = client
        .post(&api_url)
        .bearer_auth(endpoint.api_key.expose())
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %model,
                error = %err,
                "chat completion request failed"
            );
            request_error(SERVICE, err, &api_url, endpoint.timeout_secs)
        })?;

    let status = response.status();
    if !status.is_success() {
        let headers = response.headers().clone();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %model,
            status = %status,
            response_body_len = response_body.len(),
            "LLM gateway returned non-success status"
        );
        return Err(status_error(
            SERVICE,
            status,
            &headers,
            &response_body,
            &format!("model '{model}'"),
        ));
    }

    let parsed: ChatCompletionResponse =
        response.json().await.map_err(|err| Error::InvalidResponse {
            service: SERVICE,
            detail: format!("failed to parse chat completion: {err}"),
        })?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| Error::InvalidResponse {
            service: SERVICE,
            detail: "chat completion contained no message content".to_string(),
        })?;
    debug!(
        model = %model,
        response_len = content.len(),
        "received chat completion"
    );
    Ok(content)
}

pub async fn check_key(client: &Client, endpoint: &Endpoint<'_>) -> Result<(), Error> {
    let api_url = key_url(endpoint.base_url);
    let response = client
        .get(&api_url)
        .bearer_auth(endpoint.api_key.expose())
        .send()
        .await
        .map_err(|err| request_error(SERVICE, err, &api_url, endpoint.timeout_secs))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    Err(status_error(SERVICE, status, &headers, &body, "API key"))
}
