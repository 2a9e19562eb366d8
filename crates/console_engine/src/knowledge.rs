use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::api::{ensure_success, map_reqwest_error, ApiSettings, Backend};
use crate::ApiError;

/// Client for the backend's knowledge-base document management endpoints.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseClient {
    backend: Backend,
}

impl KnowledgeBaseClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        Ok(Self {
            backend: Backend::new(settings)?,
        })
    }

    pub async fn status(&self) -> Result<Value, ApiError> {
        let url = self.backend.endpoint("api/rag/status")?;
        let response = self
            .backend
            .client()
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    /// Uploads `path` as the multipart field `file`.
    pub async fn upload(&self, path: &Path) -> Result<Value, ApiError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ApiError::Io(format!("not a file path: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ApiError::Io(format!("{}: {err}", path.display())))?;

        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
        let url = self.backend.endpoint("api/documents/upload")?;
        let response = self
            .backend
            .client()
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    pub async fn delete(&self, filename: &str) -> Result<Value, ApiError> {
        let url = self.backend.endpoint_with("api/documents/", filename)?;
        let response = self
            .backend
            .client()
            .delete(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    pub async fn reindex(&self) -> Result<Value, ApiError> {
        let url = self.backend.endpoint("api/documents/reindex")?;
        let response = self
            .backend
            .client()
            .post(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let response = ensure_success(response).await?;
    response.json().await.map_err(map_reqwest_error)
}
