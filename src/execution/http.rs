//! `reqwest`-backed transport for the execution service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    BatchRequest, BatchResponse, EXECUTE_ALL_PATH, EXECUTE_PATH, ErrorBody, ExecuteRequest,
    ExecuteResponse, ExecutionTransport,
};
use crate::config::ServiceConfig;
use crate::error::TransportError;

fn map_http_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Network(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        TransportError::Network(format!("Connection error: {}", error))
    } else {
        TransportError::Network(format!("HTTP error: {}", error))
    }
}

/// JSON-over-HTTP client for `/api/execute/` and `/api/execute_all/`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ServiceConfig,
}

impl HttpTransport {
    pub fn new(config: ServiceConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = self.config.endpoint(path);
        debug!(%url, "posting to execution service");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.detail)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            warn!(%url, status = status.as_u16(), %detail, "execution service rejected request");
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ExecutionTransport for HttpTransport {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError> {
        self.post(EXECUTE_PATH, request).await
    }

    async fn execute_all(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError> {
        self.post(EXECUTE_ALL_PATH, request).await
    }
}
