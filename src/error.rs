use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Gateway credentials for the active environment are incomplete.
    #[error("Payment method unavailable: {0}")]
    Configuration(String),
    /// Order, integrity token or payment did not resolve. Deliberately carries
    /// no detail about which lookup failed.
    #[error("Unknown order")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    /// Raised by the host inventory while confirming a payment.
    #[error("{0}")]
    Capacity(String),
    #[error("Host error: {0}")]
    Host(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
