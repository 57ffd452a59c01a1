//! Client for the document Q&A backend.
//!
//! The state coordinators only see the collaborator traits below; `ApiClient`
//! is the reqwest-backed implementation used by the app.

pub mod stream;
pub mod types;

use futures::stream::{self as futures_stream, LocalBoxStream, StreamExt};
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::types::{Category, DocumentInfo};
pub use types::{ChatEvent, ChatRequest, UploadFile};
use types::{ChatBody, DocumentList, UploadResponse};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("could not reach the server: {0}")]
    Network(String),
    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("{0}")]
    Server(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

pub type ChatStream = LocalBoxStream<'static, Result<ChatEvent, ApiError>>;

#[allow(async_fn_in_trait)]
pub trait ChatBackend {
    async fn send_chat(&self, request: ChatRequest) -> Result<ChatStream, ApiError>;
}

#[allow(async_fn_in_trait)]
pub trait UploadBackend {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<Vec<DocumentInfo>, ApiError>;
}

#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    async fn list_documents(&self, category: Option<Category>) -> Result<Vec<DocumentInfo>, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn checked(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            log::error!("request failed: {}", e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("server returned {}: {}", status, body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn is_streaming(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| ct.starts_with("application/x-ndjson") || ct.starts_with("text/event-stream"))
        .unwrap_or(false)
}

fn decode_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        log::error!("JSON parse error: {}. Body: {}", e, body);
        ApiError::Decode(e.to_string())
    })
}

impl ChatBackend for ApiClient {
    async fn send_chat(&self, request: ChatRequest) -> Result<ChatStream, ApiError> {
        log::info!(
            "sending chat question ({} prior turns)",
            request.history.len()
        );
        let response = self
            .checked(self.http.post(self.config.endpoint("/api/chat")).json(&request))
            .await?;

        if is_streaming(&response) {
            return Ok(stream::decode_ndjson(response.bytes_stream()));
        }

        let body = response.text().await?;
        let events = decode_json::<ChatBody>(&body)?.into_events()?;
        Ok(futures_stream::iter(events.into_iter().map(Ok)).boxed_local())
    }
}

impl UploadBackend for ApiClient {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<Vec<DocumentInfo>, ApiError> {
        log::info!("uploading {} file(s)", files.len());

        let mut form = Form::new();
        for file in files {
            let mut part = Part::bytes(file.bytes).file_name(file.name);
            if let Some(content_type) = file.content_type.as_deref() {
                part = part.mime_str(content_type)?;
            }
            form = form.part("files", part);
        }

        let response = self
            .checked(self.http.post(self.config.endpoint("/api/upload")).multipart(form))
            .await?;
        let body = response.text().await?;
        let parsed: UploadResponse = decode_json(&body)?;

        log::info!("upload returned {} document(s)", parsed.docs.len());
        Ok(parsed.docs)
    }
}

impl DocumentSource for ApiClient {
    async fn list_documents(&self, category: Option<Category>) -> Result<Vec<DocumentInfo>, ApiError> {
        let path = match category {
            Some(category) => format!(
                "/documents_by_category/{}",
                urlencoding::encode(category.as_str())
            ),
            None => "/api/documents".to_string(),
        };

        let response = self.checked(self.http.get(self.config.endpoint(&path))).await?;
        let body = response.text().await?;
        let docs = decode_json::<DocumentList>(&body)?.into_vec();

        log::info!("fetched {} document(s)", docs.len());
        Ok(docs)
    }
}
