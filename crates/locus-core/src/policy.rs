//! Cache retention policy.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// How long and how many outcomes a [`CachingResolver`](crate::CachingResolver) keeps.
///
/// The default keeps every positive result forever and never caches
/// "not found".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachePolicy {
    /// Store "not found" outcomes as well as found resources.
    #[serde(default)]
    pub cache_not_found: bool,

    /// Maximum number of cached entries (unbounded when unset).
    #[serde(default)]
    pub max_entries: Option<u64>,

    /// Time-to-live of an entry, counted from insertion.
    #[serde(default, rename = "ttl_secs", with = "ttl_secs")]
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    /// Create policy from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `LOCUS_CACHE_NOT_FOUND` | Cache "not found" outcomes (`1`/`true`/`yes`) |
    /// | `LOCUS_CACHE_MAX_ENTRIES` | Entry bound |
    /// | `LOCUS_CACHE_TTL_SECS` | Entry time-to-live in seconds |
    pub fn from_env() -> Self {
        Self {
            cache_not_found: parse_env_flag("LOCUS_CACHE_NOT_FOUND").unwrap_or(false),
            max_entries: parse_env("LOCUS_CACHE_MAX_ENTRIES"),
            ttl: parse_env("LOCUS_CACHE_TTL_SECS").map(Duration::from_secs),
        }
    }

    /// Parse a YAML policy document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let policy: Self = serde_yaml::from_str(yaml)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Read and parse a YAML policy file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Reject bounds that would make the cache useless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == Some(0) {
            return Err(ConfigError::Invalid {
                message: "max_entries must be at least 1".to_string(),
            });
        }
        if self.ttl == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid {
                message: "ttl must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Cache "not found" outcomes.
    pub fn with_cache_not_found(mut self, enabled: bool) -> Self {
        self.cache_not_found = enabled;
        self
    }

    /// Bound the number of entries.
    pub fn with_max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Expire entries after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

fn parse_env<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

/// `1`/`true`/`yes` and `0`/`false`/`no`, case-insensitive.
fn parse_env_flag(var: &str) -> Option<bool> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => {
            warn!(var, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

mod ttl_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        ttl: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ttl {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
