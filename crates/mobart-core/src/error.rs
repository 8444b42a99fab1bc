use thiserror::Error;

pub type Result<T> = std::result::Result<T, RequestError>;

/// Reasons an inbound payload never becomes a unit of work
#[derive(Debug, Error)]
pub enum RequestError {
    /// Payload is not a JSON object of the request shape
    #[error("failed to decode request payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required field is absent or empty
    #[error("invalid request: missing or empty field `{0}`")]
    MissingField(&'static str),
}
