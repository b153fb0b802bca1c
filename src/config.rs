//! Resolution configuration
//!
//! The only tunable is what happens when one name receives two different
//! bindings: twice among a model's explicit bindings, or once in each of two
//! refined concepts' maps. `first-wins` keeps the earliest binding (and logs
//! the shadowed one); `reject` turns the conflict into an error.
//!
//! Resolution order for the process-wide config:
//! 1. a config installed with [`configure`]
//! 2. the `CONCEPT_MAP_DUPLICATES` environment variable
//! 3. `ResolutionConfig::default()`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first binding in merge order.
    #[default]
    FirstWins,
    /// Fail when two different functions claim the same name.
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-wins" | "first_wins" => Ok(Self::FirstWins),
            "reject" => Ok(Self::Reject),
            other => Err(ConfigError::InvalidPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstWins => f.write_str("first-wins"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionConfig {
    pub duplicates: DuplicatePolicy,
}

impl ResolutionConfig {
    pub const DUPLICATES_VAR: &'static str = "CONCEPT_MAP_DUPLICATES";

    pub fn new(duplicates: DuplicatePolicy) -> Self {
        Self { duplicates }
    }

    /// Read the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the config through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let duplicates = match lookup(Self::DUPLICATES_VAR) {
            Some(value) => value.parse()?,
            None => DuplicatePolicy::default(),
        };
        Ok(Self { duplicates })
    }

    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }
}

static ACTIVE: OnceLock<ResolutionConfig> = OnceLock::new();

/// Install the process-wide config. Only the first call succeeds, and it must
/// happen before the first concept map is resolved to take effect.
pub fn configure(config: ResolutionConfig) -> Result<(), ConfigError> {
    let duplicates = config.duplicates;
    ACTIVE
        .set(config)
        .map_err(|_| ConfigError::AlreadyConfigured)?;
    info!(%duplicates, "concept map resolution configured");
    Ok(())
}

/// The process-wide config, falling back to the environment on first use.
pub fn current() -> &'static ResolutionConfig {
    ACTIVE.get_or_init(|| match ResolutionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!(var = ResolutionConfig::DUPLICATES_VAR, error = %e, "ignoring invalid config");
            ResolutionConfig::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn policy_parses_both_spellings() {
        assert_eq!("first-wins".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::FirstWins);
        assert_eq!(" Reject ".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Reject);
        assert!(matches!(
            "last-wins".parse::<DuplicatePolicy>(),
            Err(ConfigError::InvalidPolicy(value)) if value == "last-wins"
        ));
    }

    #[test]
    fn lookup_defaults_when_unset() {
        let config = ResolutionConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ResolutionConfig::default());
        assert_eq!(config.duplicates, DuplicatePolicy::FirstWins);
    }

    #[test]
    fn lookup_reads_duplicates_var() {
        let config = ResolutionConfig::from_lookup(|var| {
            (var == ResolutionConfig::DUPLICATES_VAR).then(|| "reject".to_string())
        })
        .unwrap();
        assert_eq!(config.duplicates, DuplicatePolicy::Reject);
    }

    #[test]
    fn yaml_round_trips_policy_names() {
        let config = ResolutionConfig::from_yaml("duplicates: reject\n").unwrap();
        assert_eq!(config, ResolutionConfig::new(DuplicatePolicy::Reject));

        let empty = ResolutionConfig::from_yaml("{}").unwrap();
        assert_eq!(empty.duplicates, DuplicatePolicy::FirstWins);

        let rendered = serde_yaml::to_string(&config).unwrap();
        assert!(rendered.contains("duplicates: reject"));
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        assert!(matches!(
            ResolutionConfig::from_yaml("duplicate: reject\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn display_matches_serde_names() {
        assert_eq!(DuplicatePolicy::Reject.to_string(), "reject");
        assert_eq!(DuplicatePolicy::FirstWins.to_string(), "first-wins");
    }
}
