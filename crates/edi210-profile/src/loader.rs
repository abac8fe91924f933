//! Disk loader for profile trees
//!
//! Profiles live at `{base}/{partner}/{version}/profile.json`. The loader
//! walks the tree once and builds an immutable [`ProfileRegistry`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::model::Profile;
use crate::registry::ProfileRegistry;
use crate::{Error, Result};

/// File name expected inside every `{partner}/{version}` directory.
const PROFILE_FILE: &str = "profile.json";

/// Loader building a registry from a profile directory tree.
pub struct ProfileLoader {
    base: PathBuf,
}

impl ProfileLoader {
    /// Create a loader rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Walk `{base}/{partner}/{version}/profile.json` and build the
    /// registry. Version directories without a profile file are skipped
    /// with a warning; a malformed profile aborts the load.
    pub fn load(&self) -> Result<ProfileRegistry> {
        let mut registry = ProfileRegistry::new();

        for partner_dir in sorted_subdirs(&self.base)? {
            let partner = dir_name(&partner_dir);
            for version_dir in sorted_subdirs(&partner_dir)? {
                let version = dir_name(&version_dir);
                let profile_path = version_dir.join(PROFILE_FILE);
                if !profile_path.is_file() {
                    warn!(path = %profile_path.display(), "no profile file, skipping");
                    continue;
                }
                let profile = Self::load_file(&profile_path)?;
                debug!(partner = %partner, version = %version, "loaded profile");
                registry.insert(&partner, &version, profile);
            }
        }

        info!("Loaded {} partner profiles", registry.len());
        Ok(registry)
    }

    /// Parse and verify a single profile document.
    pub fn load_file(path: &Path) -> Result<Profile> {
        let text = fs::read_to_string(path)?;
        let profile: Profile = serde_json::from_str(&text).map_err(|e| {
            Error::InvalidFormat(format!("{}: {e}", path.display()))
        })?;
        profile.verify()?;
        Ok(profile)
    }
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SAMPLE_PROFILE_JSON as PROFILE_JSON;
    use std::fs;

    fn write_profile(base: &Path, partner: &str, version: &str, body: &str) {
        let dir = base.join(partner).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PROFILE_FILE), body).unwrap();
    }

    #[test]
    fn test_load_builds_registry_from_tree() {
        let tmp = tempfile::tempdir().unwrap();
        write_profile(tmp.path(), "carrier01", "004010", PROFILE_JSON);
        write_profile(tmp.path(), "carrier01", "default", PROFILE_JSON);
        write_profile(tmp.path(), "global", "default", PROFILE_JSON);

        let registry = ProfileLoader::new(tmp.path()).load().unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.resolve("CARRIER01", "004010").is_ok());
        assert!(registry.resolve("UNKNOWN", "004010").is_ok());
    }

    #[test]
    fn test_version_dir_without_profile_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_profile(tmp.path(), "global", "default", PROFILE_JSON);
        fs::create_dir_all(tmp.path().join("carrier02").join("004010")).unwrap();

        let registry = ProfileLoader::new(tmp.path()).load().unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_malformed_profile_aborts_load() {
        let tmp = tempfile::tempdir().unwrap();
        write_profile(tmp.path(), "global", "default", "{ not json");

        let err = ProfileLoader::new(tmp.path()).load().unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_base_dir_is_io_error() {
        let err = ProfileLoader::new("/nonexistent/profiles").load().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
