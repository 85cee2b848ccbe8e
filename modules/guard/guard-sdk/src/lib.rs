//! Guard SDK
//!
//! This crate provides the contract surface of the guard dispatch layer:
//!
//! - [`Authenticator`] - Plugin trait implemented by every authentication strategy
//! - [`UserStore`] - User lookup surface handed through to authenticators
//! - [`AccountStatusChecker`] - Pre/post verification account gates
//! - [`Token`] - Pre- and post-authentication token model
//! - [`ContextKey`] - Identity binding a token to one (context, authenticator) pair
//! - [`GuardError`] - Error taxonomy produced and propagated by dispatch
//!
//! ## Usage
//!
//! The surrounding pipeline builds a pre-authentication token and hands it
//! to a provider from the `guard` crate:
//!
//! ```ignore
//! use guard_sdk::{ContextKey, Credentials, PreAuthenticationToken, Token};
//!
//! let key = ContextKey::from_raw("main_form");
//! let token = Token::PreAuthentication(PreAuthenticationToken::new(
//!     key,
//!     Credentials::new(LoginForm { username, password }),
//! ));
//!
//! if provider.supports(&token) {
//!     let authenticated = provider.authenticate(token).await?;
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod context_key;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::{AccountStatusChecker, Authenticator, UserStore};
pub use context_key::{AuthenticatorId, CONTEXT_KEY_SEPARATOR, ContextKey, SecurityContextName};
pub use error::{AccountStatusError, GuardError, IdentifierError};
pub use models::{
    Credentials, PostAuthenticationToken, PostAuthenticationTokenBuilder, PreAuthenticationToken,
    Token, User,
};
