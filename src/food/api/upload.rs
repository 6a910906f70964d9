use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::food::config::UploadConfig;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Unusable upload response: {0:?}")]
    BadResponse(String),
}

/// A file received from a client, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// External service that stores a file and hands back its public URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, file: UploadedFile) -> Result<Url, UploadError>;
}

#[derive(Debug, Clone)]
pub struct UploadRelay {
    client: reqwest::Client,
    config: UploadConfig,
}

impl UploadRelay {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageHost for UploadRelay {
    async fn upload(&self, file: UploadedFile) -> Result<Url, UploadError> {
        let size = file.bytes.len();
        let mut part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().part(self.config.field.clone(), part);

        debug!("Relaying {} ({} bytes) to {}", file.file_name, size, self.config.endpoint);
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        normalize_hosted_url(&self.config.endpoint, &body)
    }
}

/// Turn a hosting service's plain-text reply into an absolute URL.
///
/// Replies may carry a trailing newline, may repeat the host in front of an
/// already absolute URL (`https://host/https://host/abc.png`), or may be a
/// bare path relative to the endpoint. URLs embedded further along the path
/// or query are left alone.
pub fn normalize_hosted_url(endpoint: &Url, body: &str) -> Result<Url, UploadError> {
    let mut text = body.trim();
    if text.is_empty() || text.contains(char::is_whitespace) {
        return Err(UploadError::BadResponse(body.to_string()));
    }

    if !is_absolute(text) {
        return endpoint
            .join(text)
            .map_err(|_| UploadError::BadResponse(body.to_string()));
    }

    while let Some(rest) = after_host(text) {
        if !is_absolute(rest) {
            break;
        }
        text = rest;
    }

    Url::parse(text).map_err(|_| UploadError::BadResponse(body.to_string()))
}

fn is_absolute(text: &str) -> bool {
    text.starts_with("https://") || text.starts_with("http://")
}

/// Text following `scheme://host/`, if there is a path at all.
fn after_host(text: &str) -> Option<&str> {
    let authority = text.find("://")? + 3;
    let slash = text[authority..].find('/')? + authority;
    Some(&text[slash + 1..])
}
