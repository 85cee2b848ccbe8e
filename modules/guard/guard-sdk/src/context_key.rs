//! Identifiers binding a token to the authenticator that produced it.
//!
//! A [`ContextKey`] is the string `"<context>_<authenticator id>"`. Context
//! names may contain the separator, authenticator ids may not, so the last
//! separator in a key is always the boundary and two distinct
//! `(context, id)` pairs can never render to the same key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// Separator placed between the context name and the authenticator id.
pub const CONTEXT_KEY_SEPARATOR: char = '_';

/// Name of one configured security perimeter (for example a named firewall).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityContextName(String);

impl SecurityContextName {
    /// Validate and wrap a context name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] if the name is empty or contains
    /// whitespace or control characters.
    pub fn new(name: impl Into<String>) -> Result<Self, IdentifierError> {
        let name = name.into();
        if name.is_empty() {
            return Err(IdentifierError::Empty {
                kind: "security context name",
            });
        }
        if let Some(character) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(IdentifierError::InvalidCharacter {
                kind: "security context name",
                value: name,
                character,
            });
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecurityContextName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SecurityContextName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SecurityContextName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SecurityContextName> for String {
    fn from(value: SecurityContextName) -> Self {
        value.0
    }
}

/// Stable key of an authenticator inside one security context.
///
/// Allowed characters are ASCII alphanumerics, `-` and `.`; the
/// [`CONTEXT_KEY_SEPARATOR`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthenticatorId(String);

impl AuthenticatorId {
    /// Validate and wrap an authenticator id.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] if the id is empty or contains a character
    /// outside `[A-Za-z0-9.-]`.
    pub fn new(id: impl Into<String>) -> Result<Self, IdentifierError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdentifierError::Empty {
                kind: "authenticator id",
            });
        }
        if let Some(character) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
        {
            return Err(IdentifierError::InvalidCharacter {
                kind: "authenticator id",
                value: id,
                character,
            });
        }
        Ok(Self(id))
    }

    /// Id derived from a position in the authenticator list.
    #[must_use]
    pub fn positional(index: usize) -> Self {
        Self(index.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthenticatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AuthenticatorId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AuthenticatorId> for String {
    fn from(value: AuthenticatorId) -> Self {
        value.0
    }
}

/// Composite identity declaring which authenticator, in which context,
/// produced a token.
///
/// Keys built with [`ContextKey::new`] are always well formed. Keys that
/// arrive from the outside are wrapped as-is with [`ContextKey::from_raw`];
/// a malformed raw key simply never matches any authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextKey(String);

impl ContextKey {
    #[must_use]
    pub fn new(context: &SecurityContextName, authenticator: &AuthenticatorId) -> Self {
        Self(format!(
            "{}{CONTEXT_KEY_SEPARATOR}{}",
            context.as_str(),
            authenticator.as_str()
        ))
    }

    /// Wrap a key received from the request pipeline without validation.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Split the key into its `(context name, authenticator id)` components.
    ///
    /// Returns `None` when there is no separator or either side is empty.
    #[must_use]
    pub fn split(&self) -> Option<(&str, &str)> {
        let (context, id) = self.0.rsplit_once(CONTEXT_KEY_SEPARATOR)?;
        if context.is_empty() || id.is_empty() {
            return None;
        }
        Some((context, id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
