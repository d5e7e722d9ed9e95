use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::config::{ApiKey, Config};
use crate::error::{Error, Service};
use crate::model::{Message, Sampling};
use crate::providers::openrouter::{self, Endpoint};

pub struct ModelGatewayRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub sampling: Sampling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGatewayResponse {
    pub content: String,
}

pub type ModelGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ModelGatewayResponse, Error>> + 'a>>;

pub trait ModelGateway {
    fn chat<'a>(&'a self, request: ModelGatewayRequest) -> ModelGatewayFuture<'a>;
}

pub struct HostModelGateway {
    client: Client,
    base_url: String,
    api_key: ApiKey,
    timeout_secs: u64,
}

impl HostModelGateway {
    pub fn new(base_url: &str, api_key: ApiKey, timeout_secs: u64) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| Error::InvalidResponse {
                service: Service::LlmGateway,
                detail: format!("failed to initialize HTTP client: {err}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
            timeout_secs,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, Error> {
        Self::new(
            &cfg.settings.llm_base_url,
            cfg.llm_api_key.clone(),
            cfg.settings.llm_timeout_secs,
        )
    }

    fn endpoint(&self) -> Endpoint<'_> {
        Endpoint {
            base_url: &self.base_url,
            api_key: &self.api_key,
            timeout_secs: self.timeout_secs,
        }
    }

    pub async fn check_key(&self) -> Result<(), Error> {
        openrouter::check_key(&self.client, &self.endpoint()).await
    }
}

impl ModelGateway for HostModelGateway {
    fn chat<'a>(&'a self, request: ModelGatewayRequest) -> ModelGatewayFuture<'a> {
        Box::pin(async move {
            let content = openrouter::chat(
                &self.client,
                &self.endpoint(),
                &request.model,
                &request.messages,
                request.sampling,
            )
            .await?;
            Ok(ModelGatewayResponse { content })
        })
    }
}
