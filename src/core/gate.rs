// DevGate - core/gate.rs
//
// Process-wide identity state and the gate predicate.
//
// State:
//   - override value: set through the setter, never cleared
//   - production latch: once on, stays on; blocks mutation and all output
//
// The identity is re-resolved on every read, so a change in the store or
// the environment is picked up by the next gate check.

use crate::core::model::ResolvedIdentity;
use crate::core::resolver::{self, EnvSource, ProcessEnv, Sources};
use crate::platform::config::GateConfig;
use crate::platform::storage::{FileStore, KeyValueStore};
use crate::util::constants::{PRODUCTION_ENV_VALUE, PRODUCTION_ENV_VARS};
use crate::util::error::IdentityError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Identity state plus the sources it is resolved from.
pub struct IdentityGate {
    override_value: RwLock<Option<String>>,
    production: AtomicBool,
    store: Option<Box<dyn KeyValueStore>>,
    env: Box<dyn EnvSource>,
    env_vars: Vec<String>,
    storage_key: String,
}

impl std::fmt::Debug for IdentityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGate")
            .field("production", &self.is_production())
            .field("has_store", &self.store.is_some())
            .field("env_vars", &self.env_vars)
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

impl IdentityGate {
    /// Build a gate over explicit sources.
    ///
    /// `store` is ignored when `config.persist` is false. Production mode
    /// starts on if the config, the `production` feature, or the
    /// environment asks for it.
    pub fn new(
        config: &GateConfig,
        env: Box<dyn EnvSource>,
        store: Option<Box<dyn KeyValueStore>>,
    ) -> Self {
        let production = production_requested(config, &*env);
        if production {
            tracing::debug!("Production mode active; developer output disabled");
        }
        Self {
            override_value: RwLock::new(None),
            production: AtomicBool::new(production),
            store: if config.persist { store } else { None },
            env,
            env_vars: config.env_vars.clone(),
            storage_key: config.storage_key.clone(),
        }
    }

    /// Build a gate over the process environment and the platform store.
    pub fn from_config(config: &GateConfig) -> Self {
        let store = if config.persist {
            let detected = FileStore::detect(&config.store_scope);
            match &detected {
                Some(store) => {
                    tracing::debug!(path = %store.path().display(), "Identity store opened");
                }
                None => {
                    tracing::debug!("No platform data directory; identity will not be persisted");
                }
            }
            detected.map(|s| Box::new(s) as Box<dyn KeyValueStore>)
        } else {
            None
        };
        Self::new(config, Box::new(ProcessEnv), store)
    }

    /// True once production mode is on.
    pub fn is_production(&self) -> bool {
        self.production.load(Ordering::Acquire)
    }

    /// Switch production mode on for the rest of the process lifetime.
    pub fn enable_production_mode(&self) {
        if !self.production.swap(true, Ordering::AcqRel) {
            tracing::info!("Production mode enabled; developer output disabled");
        }
    }

    /// Resolve the identity and report which source produced it.
    ///
    /// `None` in production mode or when no source yields a value.
    pub fn identity_source(&self) -> Option<ResolvedIdentity> {
        if self.is_production() {
            return None;
        }
        // A poisoned lock still holds a valid Option<String>.
        let guard = self
            .override_value
            .read()
            .unwrap_or_else(|e| e.into_inner());
        resolver::resolve(&Sources {
            override_value: guard.as_deref(),
            store: self.store.as_deref(),
            storage_key: &self.storage_key,
            env: &*self.env,
            env_vars: &self.env_vars,
        })
    }

    /// The current identity, `None` in production mode.
    pub fn get_identity(&self) -> Option<String> {
        self.identity_source().map(|r| r.value)
    }

    /// Set the identity and persist it when storage is available.
    ///
    /// Rejected values are reported and leave the state untouched.
    pub fn set_identity(&self, id: &str) {
        match self.try_set_identity(id) {
            Ok(()) => {}
            Err(IdentityError::ProductionMode) => {
                tracing::debug!("Ignoring identity change in production mode");
            }
            Err(e) => {
                tracing::warn!(error = %e, "[devgate] Ignoring invalid Dev ID");
            }
        }
    }

    /// Like `set_identity`, returning why a value was rejected.
    ///
    /// Persistence is best effort: a store write failure still returns Ok.
    pub fn try_set_identity(&self, id: &str) -> Result<(), IdentityError> {
        if self.is_production() {
            return Err(IdentityError::ProductionMode);
        }
        resolver::validate_identity(id)?;

        {
            let mut guard = self
                .override_value
                .write()
                .unwrap_or_else(|e| e.into_inner());
            *guard = Some(id.to_string());
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.set(&self.storage_key, id) {
                tracing::debug!(error = %e, "Could not persist Dev ID");
            }
        }
        Ok(())
    }

    /// Delete the persisted identity so later runs fall back to the
    /// environment. The in-memory value set in this process is kept.
    ///
    /// Does nothing in production mode or without a store.
    pub fn clear_persisted_identity(&self) {
        if self.is_production() {
            return;
        }
        if let Some(store) = &self.store {
            if let Err(e) = store.remove(&self.storage_key) {
                tracing::debug!(error = %e, "Could not clear persisted Dev ID");
            }
        }
    }

    /// Gate predicate.
    ///
    /// False in production mode or when no identity resolves. Otherwise
    /// true for `None`, and for `Some(target)` only on an exact match.
    pub fn should_debug(&self, target: Option<&str>) -> bool {
        match self.get_identity() {
            None => false,
            Some(current) => target.map_or(true, |t| t == current),
        }
    }
}

/// Whether production mode should be on at startup.
fn production_requested(config: &GateConfig, env: &dyn EnvSource) -> bool {
    if config.production || cfg!(feature = "production") {
        return true;
    }
    PRODUCTION_ENV_VARS
        .iter()
        .find_map(|name| env.var(name).filter(|v| !v.is_empty()))
        .is_some_and(|v| v == PRODUCTION_ENV_VALUE)
}

// =============================================================================
// Unit tests
// =============================================================================
