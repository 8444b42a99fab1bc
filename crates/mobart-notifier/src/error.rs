/// Errors returned when an outcome could not be delivered
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP transport or connection error
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with something other than 200
    #[error("notification rejected ({status}): {message}")]
    Rejected {
        /// HTTP status from the backend
        status: u16,
        /// Response body
        message: String,
    },

    /// Redis publish failed
    #[error("completion publish failed: {0}")]
    Redis(#[from] redis::RedisError),

    /// Delivery did not finish in time
    #[error("notification timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Event could not be serialized
    #[error("failed to serialize notification: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration could not be turned into a notifier
    #[error("notifier configuration error: {0}")]
    Config(String),

    /// Some members of a fan-out failed
    #[error("{failed} of {total} notifiers failed")]
    Fanout {
        /// Number of failed deliveries
        failed: usize,
        /// Number of attempted deliveries
        total: usize,
    },
}
