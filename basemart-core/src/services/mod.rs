pub mod catalog;
pub mod coins;
pub mod feed;
pub mod notify;
pub mod request;
pub mod storage;
pub mod wallet;

/// Generic errors of the data providers behind coins, NFTs and casts.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("Unexpected status {status}: {body}")]
    StatusError { status: u16, body: String },
    #[error("Parsing error: {0}")]
    ParsingError(String),
    #[error("Missing data error: {0}")]
    MissingDataError(String),
    #[error("RPC error: {0}")]
    RpcError(String),
    #[error("{provider} does not support {what}")]
    Unsupported { provider: String, what: String },
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::HttpError(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::ParsingError(e.to_string())
    }
}
