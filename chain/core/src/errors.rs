use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid hash length: {0}")]
    InvalidHashLength(usize),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("unknown covenant type: {0}")]
    UnknownCovenant(u8),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
