use thiserror::Error;

/// Why a single tile could not be turned into a [`crate::fetch::TileResult`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("gzip body from {url} could not be decompressed: {source}")]
    Decompress {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("payload from {url} is not a valid vector tile: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decompress { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}
