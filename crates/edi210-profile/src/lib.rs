//! # edi210-profile
//!
//! Partner/version extraction profiles for the EDI 210 golden-invoice
//! engine: the serde data model, an immutable registry with fallback
//! resolution, a disk loader, and a process-wide snapshot handle.
//!
//! Profiles are loaded once at startup and are read-only for the lifetime
//! of a parse call. Reload replaces the whole snapshot reference; nothing
//! mutates a registry a concurrent parse might be reading.

/// Disk loader for `{partner}/{version}/profile.json` trees.
pub mod loader;
/// Profile rule model deserialized from profile documents.
pub mod model;
/// Immutable registry with partner/version fallback resolution.
pub mod registry;
/// Process-wide snapshot handle with atomic replacement.
pub mod snapshot;

pub use loader::ProfileLoader;
pub use model::{
    ChargeBucket, ChargeRules, ChargeStrategy, CurrencyRules, DateRule, DateTarget, FieldRule,
    FirstOfRule, HeaderRules, L1Rule, PartyRule, PartyTarget, Profile, SacRule, SegmentRules,
    TotalRule,
};
pub use registry::ProfileRegistry;
pub use snapshot::SharedProfiles;

use thiserror::Error;

/// Errors that can occur when loading or resolving profiles
#[derive(Error, Debug)]
pub enum Error {
    #[error("No profile found for partner '{partner}' with version '{version}'")]
    NotFound { partner: String, version: String },

    #[error("Invalid profile format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Crate-local result type for profile operations.
pub type Result<T> = std::result::Result<T, Error>;
