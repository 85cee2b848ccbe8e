//! Authentication provider: dispatch for one security context.

use std::collections::HashSet;
use std::sync::Arc;

use guard_sdk::{
    AccountStatusChecker, Authenticator, AuthenticatorId, ContextKey, GuardError,
    PostAuthenticationToken, PreAuthenticationToken, SecurityContextName, Token, UserStore,
};
use tracing::{debug, warn};

use crate::config::GuardConfig;

use super::error::BuildError;

/// An authenticator bound to its stable id and precomputed context key.
struct Registration {
    id: AuthenticatorId,
    context_key: ContextKey,
    authenticator: Arc<dyn Authenticator>,
}

/// Dispatches tokens of one security context to the authenticator that
/// produced them.
///
/// Immutable after construction and holds no per-call state, so a single
/// instance can be shared across request-handling tasks without locking.
pub struct AuthenticationProvider {
    context_name: SecurityContextName,
    registrations: Vec<Registration>,
    user_store: Arc<dyn UserStore>,
    status_checker: Arc<dyn AccountStatusChecker>,
}

impl AuthenticationProvider {
    /// Create a provider whose authenticators are identified by position.
    ///
    /// # Errors
    ///
    /// [`BuildError::InvalidContextName`] if `context_name` is not a valid
    /// security context name.
    pub fn new(
        authenticators: Vec<Arc<dyn Authenticator>>,
        user_store: Arc<dyn UserStore>,
        context_name: &str,
        status_checker: Arc<dyn AccountStatusChecker>,
    ) -> Result<Self, BuildError> {
        authenticators
            .into_iter()
            .fold(
                Self::builder(context_name, user_store, status_checker),
                ProviderBuilder::authenticator,
            )
            .build()
    }

    /// Create a provider from configuration.
    ///
    /// `authenticators` are paired with `cfg.authenticator_ids` in order;
    /// with no configured ids they are identified by position.
    ///
    /// # Errors
    ///
    /// - [`BuildError::AuthenticatorCountMismatch`] if ids are configured
    ///   but their number differs from the supplied authenticators
    /// - any validation error of [`ProviderBuilder::build`]
    pub fn from_config(
        cfg: &GuardConfig,
        authenticators: Vec<Arc<dyn Authenticator>>,
        user_store: Arc<dyn UserStore>,
        status_checker: Arc<dyn AccountStatusChecker>,
    ) -> Result<Self, BuildError> {
        if cfg.authenticator_ids.is_empty() {
            return Self::new(authenticators, user_store, &cfg.context_name, status_checker);
        }
        if cfg.authenticator_ids.len() != authenticators.len() {
            return Err(BuildError::AuthenticatorCountMismatch {
                configured: cfg.authenticator_ids.len(),
                supplied: authenticators.len(),
            });
        }

        cfg.authenticator_ids
            .iter()
            .zip(authenticators)
            .fold(
                Self::builder(&cfg.context_name, user_store, status_checker),
                |builder, (id, authenticator)| builder.authenticator_with_id(id, authenticator),
            )
            .build()
    }

    #[must_use]
    pub fn builder(
        context_name: &str,
        user_store: Arc<dyn UserStore>,
        status_checker: Arc<dyn AccountStatusChecker>,
    ) -> ProviderBuilder {
        ProviderBuilder {
            context_name: context_name.to_owned(),
            entries: Vec::new(),
            user_store,
            status_checker,
        }
    }

    #[must_use]
    pub fn context_name(&self) -> &SecurityContextName {
        &self.context_name
    }

    /// Registered authenticator ids, in dispatch order.
    pub fn authenticator_ids(&self) -> impl Iterator<Item = &AuthenticatorId> {
        self.registrations.iter().map(|r| &r.id)
    }

    /// Context keys this provider answers to, in dispatch order.
    pub fn context_keys(&self) -> impl Iterator<Item = &ContextKey> {
        self.registrations.iter().map(|r| &r.context_key)
    }

    /// Whether `token` was produced by one of this provider's authenticators.
    ///
    /// Pure predicate: never calls an authenticator and never fails.
    #[must_use]
    pub fn supports(&self, token: &Token) -> bool {
        let Some((context, id)) = token.context_key().and_then(ContextKey::split) else {
            return false;
        };
        context == self.context_name.as_str()
            && self.registrations.iter().any(|r| r.id.as_str() == id)
    }

    /// Authenticate `token` against the authenticator that produced it.
    ///
    /// Only the matching authenticator is ever invoked. The sequence is:
    /// resolve user, pre-auth check, verify credentials, post-auth check,
    /// create token.
    ///
    /// An authenticated post-authentication token is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`GuardError::Expired`] for an invalidated post-authentication token
    /// - [`GuardError::OriginMismatch`] if no authenticator matches the context key
    /// - [`GuardError::AuthenticationFailed`] if no user could be resolved
    /// - [`GuardError::BadCredentials`] if verification returned false
    /// - [`GuardError::UnsupportedToken`] for an anonymous token
    /// - account-status and collaborator errors, unchanged
    #[tracing::instrument(skip_all, fields(context = %self.context_name, token = token.kind()))]
    pub async fn authenticate(&self, token: Token) -> Result<PostAuthenticationToken, GuardError> {
        let pre = match token {
            Token::PreAuthentication(pre) => pre,
            Token::PostAuthentication(post) => {
                if post.is_authenticated() {
                    debug!(user = post.user().identifier(), "token already authenticated");
                    return Ok(post);
                }
                warn!(
                    user = post.user().identifier(),
                    "authenticated token was invalidated, re-authentication required"
                );
                return Err(GuardError::Expired);
            }
            Token::Anonymous => {
                return Err(GuardError::UnsupportedToken(
                    "anonymous tokens carry no credentials".to_owned(),
                ));
            }
        };

        let Some(registration) = self
            .registrations
            .iter()
            .find(|r| r.context_key == *pre.context_key())
        else {
            warn!(
                context_key = %pre.context_key(),
                "token did not originate from any authenticator of this context"
            );
            return Err(GuardError::OriginMismatch {
                context_key: pre.context_key().to_string(),
                context: self.context_name.to_string(),
            });
        };

        self.dispatch(registration, &pre).await
    }

    #[tracing::instrument(skip_all, fields(authenticator = %registration.id))]
    async fn dispatch(
        &self,
        registration: &Registration,
        pre: &PreAuthenticationToken,
    ) -> Result<PostAuthenticationToken, GuardError> {
        let authenticator = registration.authenticator.as_ref();
        let credentials = pre.credentials();

        let user = authenticator
            .resolve_user(credentials, self.user_store.as_ref())
            .await?
            .ok_or_else(|| {
                GuardError::AuthenticationFailed(format!(
                    "authenticator '{}' resolved no user from the supplied credentials",
                    registration.id
                ))
            })?;

        self.status_checker.check_pre_auth(user.as_ref())?;

        if !authenticator
            .verify_credentials(credentials, user.as_ref())
            .await?
        {
            debug!(user = user.identifier(), "credential verification failed");
            return Err(GuardError::BadCredentials);
        }

        self.status_checker.check_post_auth(user.as_ref())?;

        let token = authenticator.create_authenticated_token(user, &self.context_name);
        debug!(user = token.user().identifier(), "authenticated");
        Ok(token)
    }
}

/// Assembles an [`AuthenticationProvider`], validating every identity up front.
pub struct ProviderBuilder {
    context_name: String,
    entries: Vec<(Option<String>, Arc<dyn Authenticator>)>,
    user_store: Arc<dyn UserStore>,
    status_checker: Arc<dyn AccountStatusChecker>,
}

impl ProviderBuilder {
    /// Register an authenticator identified by its position in the list.
    #[must_use]
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.entries.push((None, authenticator));
        self
    }

    /// Register an authenticator under a stable id.
    #[must_use]
    pub fn authenticator_with_id(
        mut self,
        id: &str,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        self.entries.push((Some(id.to_owned()), authenticator));
        self
    }

    /// Validate identities and build the provider.
    ///
    /// # Errors
    ///
    /// - [`BuildError::InvalidContextName`] for an invalid context name
    /// - [`BuildError::InvalidAuthenticatorId`] for an invalid explicit id
    /// - [`BuildError::DuplicateAuthenticatorId`] if two registrations share an id
    pub fn build(self) -> Result<AuthenticationProvider, BuildError> {
        let context_name =
            SecurityContextName::new(self.context_name).map_err(BuildError::InvalidContextName)?;

        let mut seen = HashSet::with_capacity(self.entries.len());
        let mut registrations = Vec::with_capacity(self.entries.len());
        for (index, (explicit_id, authenticator)) in self.entries.into_iter().enumerate() {
            let id = match explicit_id {
                Some(id) => AuthenticatorId::new(id).map_err(BuildError::InvalidAuthenticatorId)?,
                None => AuthenticatorId::positional(index),
            };
            if !seen.insert(id.clone()) {
                return Err(BuildError::DuplicateAuthenticatorId {
                    context: context_name.to_string(),
                    id: id.to_string(),
                });
            }
            registrations.push(Registration {
                context_key: ContextKey::new(&context_name, &id),
                id,
                authenticator,
            });
        }

        debug!(
            context = %context_name,
            authenticators = registrations.len(),
            "authentication provider built"
        );

        Ok(AuthenticationProvider {
            context_name,
            registrations,
            user_store: self.user_store,
            status_checker: self.status_checker,
        })
    }
}
