use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Malformed message: {0}")]
    FormatError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Timeout waiting for {server}")]
    QueryTimeout { server: String },

    #[error("Response from {server} does not match the query")]
    ResponseMismatch { server: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::IoError(err.to_string())
    }
}
