//! Immutable registry with partner/version fallback resolution

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::model::Profile;
use crate::{Error, Result};

/// Partner code reserved for the catch-all profile.
pub const GLOBAL_PARTNER: &str = "GLOBAL";

/// Version label reserved for a partner's fallback profile.
pub const DEFAULT_VERSION: &str = "default";

/// In-memory profile registry keyed by (partner, version).
///
/// Partner codes are normalized to uppercase. Built once, then read-only;
/// concurrent parse calls share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<(String, String), Arc<Profile>>,
}

impl ProfileRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile under (partner, version).
    pub fn insert(
        &mut self,
        partner: impl Into<String>,
        version: impl Into<String>,
        profile: Profile,
    ) {
        let key = (partner.into().to_uppercase(), version.into());
        self.profiles.insert(key, Arc::new(profile));
    }

    /// Resolve a profile, falling back in order:
    /// exact (partner, version) → (partner, "default") → ("GLOBAL",
    /// "default"). Fails with [`Error::NotFound`] when none match.
    pub fn resolve(&self, partner: &str, version: &str) -> Result<Arc<Profile>> {
        let partner_key = partner.to_uppercase();
        let lookup = [
            (partner_key.as_str(), version),
            (partner_key.as_str(), DEFAULT_VERSION),
            (GLOBAL_PARTNER, DEFAULT_VERSION),
        ];
        for (p, v) in lookup {
            if let Some(profile) = self.profiles.get(&(p.to_string(), v.to_string())) {
                debug!(partner = p, version = v, "resolved profile");
                return Ok(Arc::clone(profile));
            }
        }
        Err(Error::NotFound {
            partner: partner.to_string(),
            version: version.to_string(),
        })
    }

    /// Number of registered profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
