//! Construction errors for providers and managers.

use guard_sdk::IdentifierError;

/// Errors raised while assembling a provider or manager.
///
/// Ambiguous identities are rejected here, never at request time.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("invalid security context name: {0}")]
    InvalidContextName(#[source] IdentifierError),

    #[error("invalid authenticator id: {0}")]
    InvalidAuthenticatorId(#[source] IdentifierError),

    #[error("duplicate authenticator id '{id}' in context '{context}'")]
    DuplicateAuthenticatorId { context: String, id: String },

    #[error("{configured} authenticator ids configured but {supplied} authenticators supplied")]
    AuthenticatorCountMismatch { configured: usize, supplied: usize },

    #[error("security context '{context}' is served by more than one provider")]
    DuplicateContextName { context: String },
}
