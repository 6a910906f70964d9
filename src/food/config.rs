use url::Url;

use crate::config::{var_or, ConfigError};

const DEFAULT_UPLOAD_URL: &str = "https://0x0.st";
const DEFAULT_UPLOAD_FIELD: &str = "file";

/// Where uploaded images are relayed.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub endpoint: Url,
    /// Multipart field name the hosting endpoint expects.
    pub field: String,
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = var_or("UPLOAD_URL", DEFAULT_UPLOAD_URL);
        let endpoint = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
            key: "UPLOAD_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            endpoint,
            field: var_or("UPLOAD_FIELD", DEFAULT_UPLOAD_FIELD),
        })
    }
}
