//! Guard authentication dispatch layer
//!
//! Routes a pre-authentication token to the one authenticator that produced
//! it, runs the account-status gates around credential verification and
//! returns a post-authentication token.
//!
//! - [`AuthenticationProvider`] - dispatch for a single security context
//! - [`ProviderManager`] - picks the provider owning a token among several contexts
//! - [`UserChecker`] - default account-status checker
//! - [`GuardConfig`] - provider configuration
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;


pub use config::GuardConfig;
pub use domain::{AuthenticationProvider, BuildError, ProviderBuilder, ProviderManager, UserChecker};
