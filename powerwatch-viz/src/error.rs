use thiserror::Error;

#[derive(Error, Debug)]
pub enum VizError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: set {0}")]
    MissingCredential(String),

    #[error("Unexpected response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },

    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Nothing to plot")]
    EmptyGraph,
}

pub type Result<T> = std::result::Result<T, VizError>;
