//! Process-wide snapshot handle with atomic replacement
//!
//! Parse calls read the registry through a cloned `Arc`; reload installs a
//! whole new registry in one swap. A snapshot handed out before a reload
//! stays valid for the parse that holds it.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::registry::ProfileRegistry;

/// Shared, atomically replaceable profile snapshot.
#[derive(Debug)]
pub struct SharedProfiles {
    inner: RwLock<Arc<ProfileRegistry>>,
}

impl SharedProfiles {
    /// Wrap a freshly built registry.
    pub fn new(registry: ProfileRegistry) -> Self {
        Self {
            inner: RwLock::new(Arc::new(registry)),
        }
    }

    /// Current snapshot. Callers keep the `Arc` for the duration of one
    /// parse call and never observe a partial reload.
    pub fn snapshot(&self) -> Arc<ProfileRegistry> {
        Arc::clone(&self.inner.read().expect("profile snapshot lock poisoned"))
    }

    /// Replace the snapshot wholesale. Readers holding the previous `Arc`
    /// are unaffected.
    pub fn replace(&self, registry: ProfileRegistry) {
        let count = registry.len();
        *self.inner.write().expect("profile snapshot lock poisoned") = Arc::new(registry);
        info!(profiles = count, "profile snapshot replaced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SAMPLE_PROFILE_JSON as PROFILE_JSON;
    use crate::model::Profile;

    fn registry_with(partner: &str) -> ProfileRegistry {
        let profile: Profile = serde_json::from_str(PROFILE_JSON).unwrap();
        let mut registry = ProfileRegistry::new();
        registry.insert(partner, "default", profile);
        registry
    }

    #[test]
    fn test_snapshot_reads_current_registry() {
        let shared = SharedProfiles::new(registry_with("CARRIER01"));
        assert!(shared.snapshot().resolve("CARRIER01", "x").is_ok());
    }

    #[test]
    fn test_replace_swaps_without_disturbing_old_readers() {
        let shared = SharedProfiles::new(registry_with("CARRIER01"));
        let old = shared.snapshot();

        shared.replace(registry_with("CARRIER02"));

        // old snapshot still resolves against the pre-reload registry
        assert!(old.resolve("CARRIER01", "x").is_ok());
        assert!(old.resolve("CARRIER02", "x").is_err());

        let new = shared.snapshot();
        assert!(new.resolve("CARRIER02", "x").is_ok());
        assert!(new.resolve("CARRIER01", "x").is_err());
    }
}
