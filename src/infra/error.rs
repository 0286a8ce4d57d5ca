use thiserror::Error;

use crate::config::LoadError;
use crate::session::SessionError;
use crate::transport::ApiError;

/// Failures of client bootstrap and of the session flows.
///
/// Queries and plain mutations report their failures as [`ApiError`] values
/// instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ClientError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
