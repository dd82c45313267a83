//! Backend error types.

use thiserror::Error;

/// Errors reported by a [`GpuBackend`](super::GpuBackend), either directly by
/// a creation call or asynchronously through `poll_error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    #[error("invalid {kind} handle {id}")]
    InvalidHandle { kind: &'static str, id: u64 },
    #[error("GPU error: {0}")]
    Gpu(String),
}

pub type BackendResult<T> = Result<T, BackendError>;
