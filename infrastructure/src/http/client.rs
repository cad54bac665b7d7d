//! reqwest-based backend client.

use super::wire::{CompletionResponse, ContextListResponse, CreateContextResponse, ErrorBody};
use async_trait::async_trait;
use futures::StreamExt;
use ragdash_application::{
    BackendError, BackendRequest, ByteStream, Completion, ContextRepository, HealthSource,
    StreamingBackend,
};
use ragdash_domain::util::truncate_str;
use ragdash_domain::{ContextDocument, ContextDraft, HealthReport};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

const CONTEXT_PATH: &str = "/api/context";
const MOCK_DATA_PATH: &str = "/api/context/create_mock_data";
const HEALTH_PATH: &str = "/health/status";

/// Longest error body quoted in an [`BackendError::HttpStatus`] message.
const MAX_ERROR_BODY: usize = 512;

/// Client for the dashboard backend's REST API.
///
/// Only the connect phase is timed out. Streaming responses may legitimately
/// stay open for a long time while the model generates.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_connect_timeout(base_url, None)
    }

    pub fn with_connect_timeout(
        base_url: impl Into<String>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/api/context/{id}` with `id` escaped as a single path segment.
    fn context_url(&self, id: &str) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.url(CONTEXT_PATH))
            .map_err(|e| BackendError::Network(format!("Invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Network("API base URL cannot hold a path".to_string()))?
            .push(id);
        Ok(url)
    }

    /// Pass successful responses through; turn anything else into
    /// [`BackendError::HttpStatus`].
    async fn check_status(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(error) => error.message(),
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
            Err(_) => truncate_str(body.trim(), MAX_ERROR_BODY).to_string(),
        };

        debug!("Backend returned {}: {}", status, message);
        Err(BackendError::HttpStatus {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        Self::check_status(response)
            .await?
            .json::<T>()
            .await
            .map_err(map_reqwest_error)
    }

    /// Send and discard the body of a successful response.
    async fn expect_success(request: reqwest::RequestBuilder) -> Result<(), BackendError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        Self::check_status(response).await.map(|_| ())
    }
}

/// Classify a reqwest failure by the phase it happened in.
fn map_reqwest_error(error: reqwest::Error) -> BackendError {
    if error.is_decode() {
        BackendError::InvalidResponse(error.to_string())
    } else if error.is_body() {
        BackendError::StreamRead(error.to_string())
    } else {
        BackendError::Network(error.to_string())
    }
}

#[async_trait]
impl StreamingBackend for HttpBackend {
    async fn open_stream(&self, request: &BackendRequest) -> Result<ByteStream, BackendError> {
        let url = self.url(request.path);
        debug!("POST {} (streaming)", url);

        let response = self
            .client
            .post(&url)
            .json(&request.body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = Self::check_status(response).await?;

        let stream = response.bytes_stream().map(|chunk| match chunk {
            Ok(bytes) => {
                trace!("Received {} bytes", bytes.len());
                Ok(bytes.to_vec())
            }
            Err(e) => Err(BackendError::StreamRead(e.to_string())),
        });
        Ok(stream.boxed())
    }

    async fn complete(&self, request: &BackendRequest) -> Result<Completion, BackendError> {
        let url = self.url(request.path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request.body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: CompletionResponse = Self::read_json(response).await?;
        body.into_completion()
    }
}

#[async_trait]
impl ContextRepository for HttpBackend {
    async fn list(&self) -> Result<Vec<ContextDocument>, BackendError> {
        let response = self
            .client
            .get(self.url(CONTEXT_PATH))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let list: ContextListResponse = Self::read_json(response).await?;
        Ok(list.contexts.into_iter().map(Into::into).collect())
    }

    async fn create(&self, draft: &ContextDraft) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.url(CONTEXT_PATH))
            .json(draft)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let created: CreateContextResponse = Self::read_json(response).await?;
        Ok(created.id)
    }

    async fn update(&self, id: &str, draft: &ContextDraft) -> Result<(), BackendError> {
        let url = self.context_url(id)?;
        Self::expect_success(self.client.put(url).json(draft)).await
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let url = self.context_url(id)?;
        Self::expect_success(self.client.delete(url)).await
    }

    async fn seed_mock_data(&self) -> Result<(), BackendError> {
        Self::expect_success(self.client.post(self.url(MOCK_DATA_PATH))).await
    }
}

#[async_trait]
impl HealthSource for HttpBackend {
    async fn status(&self) -> Result<HealthReport, BackendError> {
        let response = self
            .client
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_json(response).await
    }
}
