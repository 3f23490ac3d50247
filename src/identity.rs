//! Process identity and environment classification.
//!
//! # Responsibilities
//! - Resolve the application's name and version once at process start
//! - Classify the runtime environment (Development vs everything else)
//!
//! # Design Decisions
//! - Both values are read once and immutable afterwards; they are cheap to
//!   clone and safe to share across threads
//! - Missing metadata falls back to sentinels instead of failing startup

use std::env;
use std::fmt;

/// Sentinel name used when the executable's file name cannot be resolved.
pub const FALLBACK_APP_NAME: &str = "the-app-with-no-name";

/// Sentinel rendered when no version metadata was supplied.
pub const UNKNOWN_VERSION: &str = "UnknownVersion";

/// Name and version of the running application.
///
/// Used only as a log-enrichment attribute.
#[derive(Debug, Clone)]
pub struct AppIdentity {
    name: String,
    version: Option<String>,
}

impl AppIdentity {
    /// Create an identity with an explicit name and version.
    ///
    /// Embedding binaries typically pass `env!("CARGO_PKG_NAME")` and
    /// `env!("CARGO_PKG_VERSION")`.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Resolve the identity from the running executable's file name.
    ///
    /// The version is not recoverable from the binary itself and stays
    /// absent until an embedder supplies it.
    pub fn detect() -> Self {
        let name = env::current_exe()
            .ok()
            .and_then(|path| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| FALLBACK_APP_NAME.to_string());

        Self {
            name,
            version: None,
        }
    }

    /// Application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version string, or the `UnknownVersion` sentinel.
    pub fn version_or_unknown(&self) -> &str {
        self.version.as_deref().unwrap_or(UNKNOWN_VERSION)
    }
}

/// Classification of the runtime environment.
///
/// Read once from [`EnvironmentTag::VAR`] at bootstrap. Any value other than
/// `Development` selects the structured log format; there is no enumerated
/// whitelist beyond that binary split. The raw value is preserved so it can
/// still be logged for operators who run richer tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentTag(String);

impl EnvironmentTag {
    /// Environment variable consulted at bootstrap.
    pub const VAR: &'static str = "APP_ENVIRONMENT";

    /// Value assumed when the variable is absent or empty.
    pub const DEFAULT: &'static str = "Development";

    /// Read the tag from the process environment.
    pub fn detect() -> Self {
        let value = env::var(Self::VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT.to_string());
        Self(value)
    }

    /// Build a tag from an explicit value.
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// True only for the exact value `Development`.
    pub fn is_development(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// Raw tag value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
