//! Error types for the secret-lease layer.

use thiserror::Error;

/// Errors that can occur while declaring, issuing, or dispatching leased secrets.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid secret type name.
    #[error("invalid secret type: {reason}")]
    InvalidSecretType {
        /// The reason the type name is invalid.
        reason: String,
    },

    /// A descriptor was registered without a revoke hook.
    #[error("secret type {secret_type} has no revoke hook")]
    MissingRevokeHook {
        /// The secret type that was rejected.
        secret_type: String,
    },

    /// A descriptor with the same type is already registered.
    #[error("secret type already registered: {secret_type}")]
    DuplicateSecretType {
        /// The conflicting secret type.
        secret_type: String,
    },

    /// The unique-identifier generator failed.
    #[error("lease id generation failed: {reason}")]
    IdGeneration {
        /// The generator's failure message.
        reason: String,
    },

    /// The lease identifier does not resolve to a registered secret type.
    #[error("unknown lease type: {lease_id}")]
    UnknownLeaseType {
        /// The lease identifier that could not be resolved.
        lease_id: String,
    },

    /// Renewal was requested for a secret type without a renew hook.
    #[error("lease is not renewable: {lease_id}")]
    NotRenewable {
        /// The lease identifier.
        lease_id: String,
    },

    /// A renew or revoke hook failed.
    #[error("hook failed for lease {lease_id}: {source}")]
    Hook {
        /// The lease identifier the hook was dispatched for.
        lease_id: String,
        /// The error reported by the hook.
        #[source]
        source: HookError,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {reason}")]
    Serialization {
        /// The reason serialization failed.
        reason: String,
    },
}

/// Errors returned by renew and revoke hooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The hook rejected the request.
    #[error("{reason}")]
    Failed {
        /// Why the hook failed.
        reason: String,
    },

    /// The credential backend behind the hook failed.
    #[error("backend error: {reason}")]
    Backend {
        /// The backend's failure message.
        reason: String,
    },
}

impl HookError {
    /// Creates a [`HookError::Failed`] from any message.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Creates a [`HookError::Backend`] from any message.
    #[must_use]
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Result type alias for lease operations.
pub type Result<T> = std::result::Result<T, Error>;
