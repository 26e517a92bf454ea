use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid address: address must not be empty")]
    InvalidAddress,
    #[error("QR encoding failed: {0}")]
    EncodingFailure(String),
    #[error("Invalid render option: {0}")]
    InvalidOption(String),
    #[error("Invalid simulator configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid payment URI: {0}")]
    InvalidUri(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
