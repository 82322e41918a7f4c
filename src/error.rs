//! Error types for message decoding and persistence.

use thiserror::Error;

/// Failures that can reach the caller of the ingest pipeline.
///
/// Extraction itself never fails: a field that cannot be recovered is simply unset.
#[derive(Debug, Error)]
pub enum LeadError {
    #[error("invalid message: {0}")]
    Mail(#[from] mailparse::MailParseError),

    #[error("storage error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address '{addr}': {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

pub type Result<T> = std::result::Result<T, LeadError>;
