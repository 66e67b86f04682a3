//! Service-level error taxonomy
//!
//! Shared by the application services and mapped onto HTTP responses at the
//! API boundary. Extraction never produces errors; a field that cannot be
//! read is simply absent.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad or missing caller input. Every accumulated message is returned
    /// to the caller verbatim.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Unknown product, order or reference.
    #[error("{0} not found")]
    NotFound(String),

    /// A remote supplier, processor or carrier was unreachable or answered
    /// with a non-success status. Details are logged, never surfaced.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// A required credential or setting is absent.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn upstream(context: impl Into<String>) -> Self {
        Self::Upstream(context.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
