//! Default account-status checker driven by the [`User`] account flags.

use guard_sdk::{AccountStatusChecker, AccountStatusError, User};

/// Rejects locked, disabled and expired accounts before verification, and
/// expired credentials after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserChecker;

impl UserChecker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AccountStatusChecker for UserChecker {
    fn check_pre_auth(&self, user: &dyn User) -> Result<(), AccountStatusError> {
        if !user.is_account_non_locked() {
            return Err(AccountStatusError::Locked);
        }
        if !user.is_enabled() {
            return Err(AccountStatusError::Disabled);
        }
        if !user.is_account_non_expired() {
            return Err(AccountStatusError::AccountExpired);
        }
        Ok(())
    }

    fn check_post_auth(&self, user: &dyn User) -> Result<(), AccountStatusError> {
        if !user.is_credentials_non_expired() {
            return Err(AccountStatusError::CredentialsExpired);
        }
        Ok(())
    }
}
