//! Configuration for an authentication provider.

use serde::Deserialize;

/// Provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Security context (firewall) the provider is bound to.
    pub context_name: String,

    /// Stable ids for the supplied authenticators, in the same order.
    ///
    /// Empty means positional ids (`"0"`, `"1"`, ...).
    pub authenticator_ids: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            context_name: "main".to_owned(),
            authenticator_ids: Vec::new(),
        }
    }
}
