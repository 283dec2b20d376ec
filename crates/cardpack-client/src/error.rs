use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid portal base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("GET {path} returned HTTP {status}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("GET {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body of {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;
