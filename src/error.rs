use thiserror::Error;

/// Why a single background image could not be preloaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreloadError {
    /// Remote, data or otherwise unresolvable URL.
    #[error("unsupported image url: {url}")]
    Unsupported { url: String },

    /// The resolved file does not exist.
    #[error("image not found: {url}")]
    NotFound { url: String },

    /// Underlying IO error while reading the image.
    #[error("failed to read {url}: {reason}")]
    Io { url: String, reason: String },

    /// Bytes were read but are not a decodable image.
    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The load was cancelled or its task died before settling.
    #[error("load of {url} aborted")]
    Aborted { url: String },
}

impl PreloadError {
    pub fn url(&self) -> &str {
        match self {
            PreloadError::Unsupported { url }
            | PreloadError::NotFound { url }
            | PreloadError::Io { url, .. }
            | PreloadError::Decode { url, .. }
            | PreloadError::Aborted { url } => url,
        }
    }
}
