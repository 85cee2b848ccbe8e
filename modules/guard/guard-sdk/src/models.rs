//! Token model for the guard dispatch layer.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context_key::{ContextKey, SecurityContextName};

/// Opaque, authenticator-specific credential payload.
///
/// Dispatch never looks inside; only the authenticator that produced the
/// payload knows its concrete type and recovers it with
/// [`Credentials::downcast_ref`]. `Debug` prints the type name only.
#[derive(Clone)]
pub struct Credentials {
    payload: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Credentials {
    #[must_use]
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self {
            payload: Arc::new(payload),
            type_name: type_name::<T>(),
        }
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Rust type name of the wrapped payload.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A user record resolved by an authenticator.
///
/// The account flags default to "everything is fine"; user types backed by a
/// real account store override the ones they track.
pub trait User: Any + Send + Sync + fmt::Debug {
    /// Identifier the user was looked up by (username, subject id, ...).
    fn identifier(&self) -> &str;

    /// Roles granted to the user.
    fn roles(&self) -> &[String];

    fn is_enabled(&self) -> bool {
        true
    }

    fn is_account_non_locked(&self) -> bool {
        true
    }

    fn is_account_non_expired(&self) -> bool {
        true
    }

    fn is_credentials_non_expired(&self) -> bool {
        true
    }
}

impl dyn User {
    /// Recover the concrete user type.
    #[must_use]
    pub fn downcast_ref<T: User>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }
}

/// Unverified carrier of raw credentials plus origin identity.
#[derive(Debug, Clone)]
pub struct PreAuthenticationToken {
    context_key: ContextKey,
    credentials: Credentials,
}

impl PreAuthenticationToken {
    #[must_use]
    pub fn new(context_key: ContextKey, credentials: Credentials) -> Self {
        Self {
            context_key,
            credentials,
        }
    }

    #[must_use]
    pub fn context_key(&self) -> &ContextKey {
        &self.context_key
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Carrier of a verified user and its granted roles, with a liveness flag.
///
/// Built by an authenticator on successful dispatch. The surrounding system
/// calls [`PostAuthenticationToken::invalidate`] when the token must no longer
/// be trusted (for example because the underlying account changed).
#[derive(Debug, Clone)]
pub struct PostAuthenticationToken {
    user: Arc<dyn User>,
    context_name: SecurityContextName,
    roles: Vec<String>,
    attributes: BTreeMap<String, serde_json::Value>,
    authenticated: bool,
}

impl PostAuthenticationToken {
    /// Create a builder; roles default to the user's roles.
    #[must_use]
    pub fn builder(
        user: Arc<dyn User>,
        context_name: SecurityContextName,
    ) -> PostAuthenticationTokenBuilder {
        PostAuthenticationTokenBuilder {
            user,
            context_name,
            roles: None,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn user(&self) -> &Arc<dyn User> {
        &self.user
    }

    #[must_use]
    pub fn context_name(&self) -> &SecurityContextName {
        &self.context_name
    }

    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(name.into(), value);
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Mark the token as no longer authenticated.
    pub fn invalidate(&mut self) {
        self.authenticated = false;
    }
}

pub struct PostAuthenticationTokenBuilder {
    user: Arc<dyn User>,
    context_name: SecurityContextName,
    roles: Option<Vec<String>>,
    attributes: BTreeMap<String, serde_json::Value>,
}

impl PostAuthenticationTokenBuilder {
    /// Override the granted roles.
    #[must_use]
    pub fn roles(mut self, roles: Vec<String>) -> Self {
        self.roles = Some(roles);
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn build(self) -> PostAuthenticationToken {
        let roles = self
            .roles
            .unwrap_or_else(|| self.user.roles().to_vec());
        PostAuthenticationToken {
            user: self.user,
            context_name: self.context_name,
            roles,
            attributes: self.attributes,
            authenticated: true,
        }
    }
}

/// Token handed to dispatch by the request pipeline.
#[derive(Debug, Clone)]
pub enum Token {
    PreAuthentication(PreAuthenticationToken),
    PostAuthentication(PostAuthenticationToken),
    /// No credentials were presented.
    Anonymous,
}

impl Token {
    /// Context key of a pre-authentication token.
    #[must_use]
    pub fn context_key(&self) -> Option<&ContextKey> {
        match self {
            Self::PreAuthentication(pre) => Some(pre.context_key()),
            Self::PostAuthentication(_) | Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        match self {
            Self::PostAuthentication(post) => post.is_authenticated(),
            Self::PreAuthentication(_) | Self::Anonymous => false,
        }
    }

    /// Short name of the variant, for logs and error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PreAuthentication(_) => "pre-authentication",
            Self::PostAuthentication(_) => "post-authentication",
            Self::Anonymous => "anonymous",
        }
    }
}

impl From<PreAuthenticationToken> for Token {
    fn from(token: PreAuthenticationToken) -> Self {
        Self::PreAuthentication(token)
    }
}

impl From<PostAuthenticationToken> for Token {
    fn from(token: PostAuthenticationToken) -> Self {
        Self::PostAuthentication(token)
    }
}
