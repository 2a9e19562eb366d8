use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::{ApiError, JobId, ResultFetch, StatusPayload};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Per-request cap. `None` waits as long as the backend does, which
    /// the push stream relies on.
    pub request_timeout: Option<Duration>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

pub type ByteStream = BoxStream<'static, Result<Bytes, ApiError>>;

/// Execution endpoints of the orchestration backend.
#[async_trait::async_trait]
pub trait ExecutionApi: Send + Sync {
    async fn submit(&self, user_input: &str) -> Result<JobId, ApiError>;

    async fn status(&self, job_id: &str) -> Result<StatusPayload, ApiError>;

    async fn result(&self, job_id: &str) -> Result<ResultFetch, ApiError>;

    /// Opens the server-sent event stream for `job_id` as raw bytes.
    async fn open_stream(&self, job_id: &str) -> Result<ByteStream, ApiError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    execution_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Shared HTTP plumbing: one client and a base URL that relative paths
/// resolve against.
#[derive(Debug, Clone)]
pub(crate) struct Backend {
    client: reqwest::Client,
    base: Url,
}

impl Backend {
    pub(crate) fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let mut base_url = settings.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base =
            Url::parse(&base_url).map_err(|err| ApiError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client, base })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(format!("{path}: {err}")))
    }

    /// `prefix` followed by one percent-encoded path segment.
    pub(crate) fn endpoint_with(&self, prefix: &str, segment: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint(prefix)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(prefix.to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    backend: Backend,
}

impl ReqwestApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        Ok(Self {
            backend: Backend::new(settings)?,
        })
    }
}

#[async_trait::async_trait]
impl ExecutionApi for ReqwestApi {
    async fn submit(&self, user_input: &str) -> Result<JobId, ApiError> {
        let url = self.backend.endpoint("api/orchestrate")?;
        let response = self
            .backend
            .client()
            .post(url)
            .json(&serde_json::json!({ "user_input": user_input }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        let body: SubmitResponse = response.json().await.map_err(map_reqwest_error)?;
        Ok(body.execution_id)
    }

    async fn status(&self, job_id: &str) -> Result<StatusPayload, ApiError> {
        let url = self.backend.endpoint_with("api/status/", job_id)?;
        let response = self
            .backend
            .client()
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        response.json().await.map_err(map_reqwest_error)
    }

    async fn result(&self, job_id: &str) -> Result<ResultFetch, ApiError> {
        let url = self.backend.endpoint_with("api/result/", job_id)?;
        let response = self
            .backend
            .client()
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if response.status() == StatusCode::ACCEPTED {
            return Ok(ResultFetch::Pending);
        }
        let response = ensure_success(response).await?;
        let value: Value = response.json().await.map_err(map_reqwest_error)?;
        Ok(ResultFetch::Ready(value))
    }

    async fn open_stream(&self, job_id: &str) -> Result<ByteStream, ApiError> {
        let url = self.backend.endpoint_with("api/stream/", job_id)?;
        let response = self
            .backend
            .client()
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        Ok(response.bytes_stream().map_err(map_reqwest_error).boxed())
    }
}

/// Passes 2xx responses through; anything else becomes an `ApiError`,
/// preferring the backend's `{error}` message when the body carries one.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if let Ok(ErrorBody { error }) = serde_json::from_str::<ErrorBody>(&body) {
        return Err(ApiError::Rejected(error));
    }
    Err(ApiError::HttpStatus {
        status: status.as_u16(),
        message: status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
    })
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
