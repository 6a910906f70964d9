pub mod upload;

// Re-export common types
pub use upload::{normalize_hosted_url, ImageHost, UploadError, UploadRelay, UploadedFile};
