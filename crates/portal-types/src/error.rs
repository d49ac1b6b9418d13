use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every layer below the HTTP surface.
/// Only portal-api decides which wire status each variant maps to.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or duplicate input. Always recoverable by the caller.
    #[error("{0}")]
    Validation(String),

    /// The entity named by an id (or slug) does not exist in its store.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Startup-time misconfiguration. Fatal, never per-request.
    #[error("configuration: {0}")]
    Configuration(String),

    /// A store operation failed. Surfaced once, never retried.
    #[error("storage: {0}")]
    Storage(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Coarse authentication/authorization failures. Deliberately does not
/// say which specific credential check failed beyond this classification.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("insufficient authority")]
    Forbidden,
}
