//! Routing across several security contexts.

use std::collections::HashSet;
use std::sync::Arc;

use guard_sdk::{GuardError, PostAuthenticationToken, Token};
use tracing::{debug, warn};

use super::error::BuildError;
use super::provider::AuthenticationProvider;

/// Holds one provider per security context and hands each token to the
/// provider that owns it.
pub struct ProviderManager {
    providers: Vec<Arc<AuthenticationProvider>>,
}

impl ProviderManager {
    /// # Errors
    ///
    /// [`BuildError::DuplicateContextName`] if two providers serve the same context.
    pub fn new(providers: Vec<Arc<AuthenticationProvider>>) -> Result<Self, BuildError> {
        let mut seen = HashSet::with_capacity(providers.len());
        for provider in &providers {
            if !seen.insert(provider.context_name().clone()) {
                return Err(BuildError::DuplicateContextName {
                    context: provider.context_name().to_string(),
                });
            }
        }
        Ok(Self { providers })
    }

    #[must_use]
    pub fn providers(&self) -> &[Arc<AuthenticationProvider>] {
        &self.providers
    }

    /// Provider responsible for `token`, if any.
    ///
    /// Pre-authentication tokens go to the first provider that supports
    /// them; post-authentication tokens to the provider of their context.
    #[must_use]
    pub fn provider_for(&self, token: &Token) -> Option<&Arc<AuthenticationProvider>> {
        match token {
            Token::PreAuthentication(_) => self.providers.iter().find(|p| p.supports(token)),
            Token::PostAuthentication(post) => self
                .providers
                .iter()
                .find(|p| p.context_name() == post.context_name()),
            Token::Anonymous => None,
        }
    }

    /// Authenticate `token` with the provider that owns it.
    ///
    /// # Errors
    ///
    /// - [`GuardError::ProviderNotFound`] if no provider owns the token
    /// - [`GuardError::UnsupportedToken`] for an anonymous token
    /// - any error of [`AuthenticationProvider::authenticate`], unchanged
    #[tracing::instrument(skip_all, fields(token = token.kind()))]
    pub async fn authenticate(&self, token: Token) -> Result<PostAuthenticationToken, GuardError> {
        let Some(provider) = self.provider_for(&token) else {
            return Err(log_failure(not_found(&token)));
        };
        debug!(context = %provider.context_name(), "routing token to provider");

        provider.authenticate(token).await.map_err(log_failure)
    }
}

fn not_found(token: &Token) -> GuardError {
    match token {
        Token::PreAuthentication(pre) => GuardError::ProviderNotFound {
            origin: pre.context_key().to_string(),
        },
        Token::PostAuthentication(post) => GuardError::ProviderNotFound {
            origin: post.context_name().to_string(),
        },
        Token::Anonymous => {
            GuardError::UnsupportedToken("anonymous tokens carry no credentials".to_owned())
        }
    }
}

fn log_failure(e: GuardError) -> GuardError {
    match &e {
        GuardError::ServiceUnavailable(_) | GuardError::Internal(_) => {
            tracing::error!(error = %e, "authentication dispatch failed");
        }
        _ => warn!(error = %e, "authentication rejected"),
    }
    e
}
