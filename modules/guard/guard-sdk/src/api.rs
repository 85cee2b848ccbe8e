//! Collaborator traits consumed by the dispatch layer.
//!
//! Authenticators are plugins: the provider only ever talks to them through
//! [`Authenticator`], and only to the single authenticator whose context key
//! matches the incoming token.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context_key::SecurityContextName;
use crate::error::{AccountStatusError, GuardError};
use crate::models::{Credentials, PostAuthenticationToken, User};

/// Plugin trait for authentication strategies.
///
/// Implementations receive only credentials that were produced for them.
/// Any error they return is forwarded to the caller unchanged.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve the user the credentials claim to belong to.
    ///
    /// Returning `Ok(None)` makes dispatch fail with
    /// [`GuardError::AuthenticationFailed`].
    ///
    /// # Errors
    ///
    /// Any collaborator failure (e.g. `ServiceUnavailable` from the store).
    async fn resolve_user(
        &self,
        credentials: &Credentials,
        users: &dyn UserStore,
    ) -> Result<Option<Arc<dyn User>>, GuardError>;

    /// Check the credentials against the resolved user.
    ///
    /// Returning `Ok(false)` makes dispatch fail with
    /// [`GuardError::BadCredentials`].
    ///
    /// # Errors
    ///
    /// Any collaborator failure raised while verifying.
    async fn verify_credentials(
        &self,
        credentials: &Credentials,
        user: &dyn User,
    ) -> Result<bool, GuardError>;

    /// Build the token returned for a fully verified user.
    fn create_authenticated_token(
        &self,
        user: Arc<dyn User>,
        context_name: &SecurityContextName,
    ) -> PostAuthenticationToken {
        PostAuthenticationToken::builder(user, context_name.clone()).build()
    }
}

/// User lookup surface.
///
/// Dispatch never calls it; it is handed through to
/// [`Authenticator::resolve_user`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look a user up by identifier.
    ///
    /// # Errors
    ///
    /// Backend failures; an unknown user is `Ok(None)`.
    async fn find_user(&self, identifier: &str) -> Result<Option<Arc<dyn User>>, GuardError>;
}

/// Account eligibility gates run around credential verification.
pub trait AccountStatusChecker: Send + Sync {
    /// Runs after the user is resolved and before credentials are verified.
    ///
    /// # Errors
    ///
    /// [`AccountStatusError`] when the account may not authenticate.
    fn check_pre_auth(&self, user: &dyn User) -> Result<(), AccountStatusError>;

    /// Runs after credentials were verified.
    ///
    /// # Errors
    ///
    /// [`AccountStatusError`] when the account may not authenticate.
    fn check_post_auth(&self, user: &dyn User) -> Result<(), AccountStatusError>;
}
