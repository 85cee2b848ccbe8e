//! Domain layer for the guard dispatch layer.

pub mod error;
pub mod manager;
pub mod provider;
pub mod user_checker;

pub use error::BuildError;
pub use manager::ProviderManager;
pub use provider::{AuthenticationProvider, ProviderBuilder};
pub use user_checker::UserChecker;

#[cfg(test)]
mod tests_dispatch;
