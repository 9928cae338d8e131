//! Unified error types for the Parley core.
//!
//! The taxonomy separates setup-time failures ([`RegistrationError`], fatal
//! during startup) from request-time failures ([`ParseError`],
//! [`VerifyError`], recoverable per request). A routing miss is not an error
//! at all; see `parley_framework::Dispatch`.

use thiserror::Error;

// =============================================================================
// Registration Errors
// =============================================================================

/// Errors raised while populating dispatch tables.
///
/// These only occur during the registration phase and are expected to abort
/// startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The routing key already has a handler in this scope.
    #[error("'{key}' is already registered in {scope}")]
    DuplicateKey {
        /// The conflicting routing key.
        key: String,
        /// Human readable scope, e.g. `global scope` or `guild 1234`.
        scope: String,
    },

    /// The routing key is reserved by the framework.
    #[error("'{key}' is reserved and cannot be registered")]
    ReservedKey {
        /// The reserved routing key.
        key: String,
    },

    /// Routing keys must be non-empty.
    #[error("routing key must not be empty")]
    EmptyKey,

    /// A guild-scoped registration named no guild.
    #[error("'{key}' is guild-scoped but no guild was given")]
    NoGuilds {
        /// The routing key that would have been registered nowhere.
        key: String,
    },
}

impl RegistrationError {
    /// Creates a duplicate key error for the global scope.
    pub fn duplicate_global(key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            key: key.into(),
            scope: "global scope".to_string(),
        }
    }

    /// Creates a duplicate key error for a guild scope.
    pub fn duplicate_in_guild(key: impl Into<String>, guild_id: &str) -> Self {
        Self::DuplicateKey {
            key: key.into(),
            scope: format!("guild {guild_id}"),
        }
    }

    /// Creates a duplicate key error for a named plain table.
    pub fn duplicate_in(key: impl Into<String>, table: &str) -> Self {
        Self::DuplicateKey {
            key: key.into(),
            scope: format!("{table} table"),
        }
    }
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors that can occur while decoding an interaction payload.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not valid JSON or does not fit the expected shape.
    #[error("malformed interaction payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The `type` discriminant is absent.
    #[error("interaction payload has no 'type' field")]
    MissingType,

    /// The `type` discriminant is not one the router understands.
    #[error("unknown interaction type {0}")]
    UnknownType(u64),
}

// =============================================================================
// Verification Errors
// =============================================================================

/// Reasons a signed request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The `X-Signature-Timestamp` header was absent.
    #[error("timestamp header missing")]
    MissingTimestamp,

    /// The `X-Signature-Ed25519` header was absent.
    #[error("signature header missing")]
    MissingSignature,

    /// The configured public key could not be decoded.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The signature header could not be decoded.
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// The timestamp falls outside the accepted freshness window.
    #[error("timestamp '{0}' is outside the accepted window")]
    StaleTimestamp(String),

    /// The signature does not match the message.
    #[error("signature does not match request body")]
    BadSignature,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Result type for payload decoding.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for request verification.
pub type VerifyResult<T> = Result<T, VerifyError>;
