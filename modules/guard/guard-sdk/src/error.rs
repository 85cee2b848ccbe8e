//! Error types for the guard dispatch layer.

use thiserror::Error;

/// Errors produced or forwarded by authentication dispatch.
///
/// Every variant is terminal for the current `authenticate` call.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A previously authenticated token has been invalidated.
    ///
    /// The caller must force a fresh authentication (e.g. logout and retry).
    #[error("authentication expired: the token was invalidated and must be re-authenticated")]
    Expired,

    /// No authenticator of the provider matches the token's context key.
    #[error(
        "token with context key '{context_key}' did not originate from any authenticator of context '{context}'"
    )]
    OriginMismatch { context_key: String, context: String },

    /// The matched authenticator could not resolve a user.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A user was resolved but credential verification returned false.
    #[error("bad credentials")]
    BadCredentials,

    /// Account-status failure raised by an [`AccountStatusChecker`](crate::AccountStatusChecker).
    #[error(transparent)]
    AccountStatus(#[from] AccountStatusError),

    /// The token variant cannot be handled by dispatch at all.
    #[error("unsupported token: {0}")]
    UnsupportedToken(String),

    /// No configured provider accepts the token.
    #[error("no authentication provider supports token origin '{origin}'")]
    ProviderNotFound { origin: String },

    /// A collaborator backend (user store, credential backend) is not available.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GuardError {
    /// Whether the caller has to discard the current token and start over.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

/// Account eligibility failures raised before or after credential verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountStatusError {
    #[error("account is disabled")]
    Disabled,

    #[error("account is locked")]
    Locked,

    #[error("account has expired")]
    AccountExpired,

    #[error("credentials have expired")]
    CredentialsExpired,

    /// Checker-specific rejection.
    #[error("account rejected: {0}")]
    Rejected(String),
}

/// Invalid security context name or authenticator id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },

    #[error("{kind} '{value}' contains invalid character '{character}'")]
    InvalidCharacter {
        kind: &'static str,
        value: String,
        character: char,
    },
}
