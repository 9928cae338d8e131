//! Runtime error types.

use thiserror::Error;

use parley_core::VerifyError;

pub use crate::config::{ConfigError, ConfigResult};

/// Errors that can occur while serving or calling the platform.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configured public key is unusable.
    #[error("Verifier setup failed: {0}")]
    Verifier(#[from] VerifyError),

    /// A required credential is not configured.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request could not be sent or its body read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
