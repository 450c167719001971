//! Tracker configuration
//!
//! Resolution order:
//! 1. An explicit path (`--config`)
//! 2. `<data_local_dir>/fixflex/config.toml` when it exists
//! 3. The embedded default (`config/fixflex.toml`)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::categories::{CategorySet, DEFAULT_FIXED_CATEGORIES};
use crate::error::{Error, Result};
use crate::recurring::RecurringConfig;
use crate::trends::{DEFAULT_TREND_MONTHS, MAX_TREND_MONTHS};

/// Default configuration (embedded at compile time)
const DEFAULT_CONFIG: &str = include_str!("../../../config/fixflex.toml");

/// Months covered by the default date range
pub const DEFAULT_RANGE_MONTHS: u32 = 1;

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum ConfigSource {
    Explicit(PathBuf),
    User(PathBuf),
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(path) => write!(f, "{}", path.display()),
            Self::User(path) => write!(f, "{} (user override)", path.display()),
            Self::Default => write!(f, "built-in default"),
        }
    }
}

/// Settings for one tracker session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerConfig {
    pub fixed_categories: Vec<String>,
    pub trend_months: u32,
    pub default_range_months: u32,
    pub recurring: RecurringConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fixed_categories: DEFAULT_FIXED_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trend_months: DEFAULT_TREND_MONTHS,
            default_range_months: DEFAULT_RANGE_MONTHS,
            recurring: RecurringConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration, returning it with its source
    ///
    /// An explicit path must exist; the user override is optional.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            return Ok((
                Self::from_toml(&content)?,
                ConfigSource::Explicit(path.to_path_buf()),
            ));
        }

        if let Some(path) = default_config_path().filter(|p| p.exists()) {
            debug!("Using config override at {}", path.display());
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            return Ok((Self::from_toml(&content)?, ConfigSource::User(path)));
        }

        Ok((Self::from_toml(DEFAULT_CONFIG)?, ConfigSource::Default))
    }

    /// Parse config from TOML content, filling missing keys with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();
        if let Some(fixed) = raw.fixed_categories {
            config.fixed_categories = fixed
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(months) = raw.trend_months {
            if !(DEFAULT_TREND_MONTHS..=MAX_TREND_MONTHS).contains(&months) {
                return Err(Error::Config(format!(
                    "trend_months must be between {} and {}",
                    DEFAULT_TREND_MONTHS, MAX_TREND_MONTHS
                )));
            }
            config.trend_months = months;
        }
        if let Some(months) = raw.default_range_months {
            config.default_range_months = months;
        }
        if let Some(recurring) = raw.recurring {
            if recurring.amount_tolerance.is_nan() || recurring.amount_tolerance < 0.0 {
                return Err(Error::Config(
                    "recurring.amount_tolerance must be non-negative".into(),
                ));
            }
            config.recurring = recurring;
        }

        Ok(config)
    }

    /// A fresh category rule set seeded with the configured fixed categories
    pub fn category_set(&self) -> CategorySet {
        CategorySet::new(self.fixed_categories.iter().cloned())
    }
}

/// Default user override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fixflex").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    fixed_categories: Option<Vec<String>>,
    trend_months: Option<u32>,
    default_range_months: Option<u32>,
    recurring: Option<RecurringConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_default_matches_builtin() {
        let config = TrackerConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = TrackerConfig::from_toml(
            r#"
fixed_categories = ["Rent", " Insurance "]

[recurring]
amount_tolerance = 0.05
"#,
        )
        .unwrap();
        assert_eq!(config.fixed_categories, vec!["Rent", "Insurance"]);
        assert_eq!(config.trend_months, 6);
        assert_eq!(config.recurring.amount_tolerance, 0.05);
        assert_eq!(config.recurring.min_occurrences, 3);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            TrackerConfig::from_toml("trend_months = \"six\""),
            Err(Error::Config(_))
        ));
        assert!(TrackerConfig::from_toml("trend_months = 0").is_err());
        assert!(TrackerConfig::from_toml("trend_months = 1").is_err());
        assert!(TrackerConfig::from_toml("trend_months = 121").is_err());
        assert_eq!(
            TrackerConfig::from_toml("trend_months = 120").unwrap().trend_months,
            120
        );
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "trend_months = 12").unwrap();

        let (config, source) = TrackerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.trend_months, 12);
        assert_eq!(source, ConfigSource::Explicit(file.path().to_path_buf()));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            TrackerConfig::load(Some(&missing)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_category_set_uses_fixed() {
        let config = TrackerConfig {
            fixed_categories: vec!["Rent".to_string()],
            ..Default::default()
        };
        let set = config.category_set();
        assert!(set.is_fixed("Rent"));
        assert!(!set.is_fixed("Home"));
    }
}
