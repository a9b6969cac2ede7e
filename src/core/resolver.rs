// DevGate - core/resolver.rs
//
// Identity resolution chain: override → persisted store → environment list.
// First non-empty value wins. Resolution never fails: an unreadable store
// is skipped like an absent one.

use crate::core::model::{IdentitySource, ResolvedIdentity};
use crate::platform::storage::KeyValueStore;
use crate::util::error::IdentityError;
use std::collections::HashMap;

/// Read access to environment variables.
pub trait EnvSource: Send + Sync {
    /// Value of `name`, or `None` when unset or not valid Unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, for tests and hosts that inject their own.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Check an identity value supplied by a caller or read from a source.
pub fn validate_identity(value: &str) -> Result<(), IdentityError> {
    if value.trim().is_empty() {
        return Err(IdentityError::Empty);
    }
    Ok(())
}

/// Inputs to one resolution pass.
pub struct Sources<'a> {
    /// Value set through the setter, if any.
    pub override_value: Option<&'a str>,
    /// Persisted store, when the capability is available and enabled.
    pub store: Option<&'a dyn KeyValueStore>,
    /// Key the identity is stored under.
    pub storage_key: &'a str,
    /// Environment to read.
    pub env: &'a dyn EnvSource,
    /// Environment variable names, highest priority first.
    pub env_vars: &'a [String],
}

/// Run the resolution chain once.
pub fn resolve(sources: &Sources<'_>) -> Option<ResolvedIdentity> {
    if let Some(value) = sources.override_value.filter(|v| validate_identity(v).is_ok()) {
        return Some(ResolvedIdentity {
            value: value.to_string(),
            source: IdentitySource::Override,
        });
    }

    if let Some(store) = sources.store {
        match store.get(sources.storage_key) {
            Ok(Some(value)) if validate_identity(&value).is_ok() => {
                return Some(ResolvedIdentity {
                    value,
                    source: IdentitySource::Storage,
                });
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Identity store unreadable; skipping");
            }
        }
    }

    sources.env_vars.iter().find_map(|name| {
        let value = sources.env.var(name)?;
        validate_identity(&value).ok()?;
        Some(ResolvedIdentity {
            value,
            source: IdentitySource::Env(name.clone()),
        })
    })
}
