//! Configuration loading and management
//!
//! # Example
//! ```yaml
//! default_limit: 20
//! max_limit: 100
//! filter_policy: reject
//! collections:
//!   tasks:
//!     default_limit: 10
//!   audit_events:
//!     max_limit: 500
//! ```

use crate::core::error::{ConfigError, QueryResult};
use crate::core::filter::FilterPolicy;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use validator::Validate;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Effective pagination and filtering settings for one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    /// Page size used when the caller gives none, or an invalid one
    pub default_limit: usize,

    /// Largest page size a caller can ask for
    pub max_limit: usize,

    /// What to do with unknown or mistyped filters
    pub filter_policy: FilterPolicy,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            filter_policy: FilterPolicy::default(),
        }
    }
}

/// Per-collection overrides of the deployment limits
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionLimits {
    #[serde(default)]
    pub default_limit: Option<usize>,

    #[serde(default)]
    pub max_limit: Option<usize>,
}

/// Complete configuration of a deployment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_limits"))]
pub struct QueryConfig {
    /// Page size used when the caller gives none
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub default_limit: usize,

    /// Largest page size a caller can ask for
    #[serde(default = "max_limit")]
    #[validate(range(min = 1))]
    pub max_limit: usize,

    /// Applies to every collection
    #[serde(default)]
    pub filter_policy: FilterPolicy,

    /// Overrides keyed by collection name
    #[serde(default)]
    pub collections: IndexMap<String, CollectionLimits>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn max_limit() -> usize {
    MAX_LIMIT
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            filter_policy: FilterPolicy::default(),
            collections: IndexMap::new(),
        }
    }
}

impl QueryConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: display.clone(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(display.clone()),
            message: e.to_string(),
        })?;

        config.checked()
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> QueryResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.checked()
    }

    /// Deployment-wide settings, without collection overrides
    pub fn settings(&self) -> QuerySettings {
        QuerySettings {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
            filter_policy: self.filter_policy,
        }
    }

    /// Effective settings for one collection
    pub fn settings_for(&self, collection: &str) -> QuerySettings {
        let base = self.settings();
        let Some(limits) = self.collections.get(collection) else {
            return base;
        };

        let max_limit = limits.max_limit.unwrap_or(base.max_limit);
        QuerySettings {
            default_limit: limits
                .default_limit
                .unwrap_or(base.default_limit)
                .min(max_limit),
            max_limit,
            filter_policy: base.filter_policy,
        }
    }

    fn checked(self) -> QueryResult<Self> {
        self.validate().map_err(|errors| {
            let field = errors
                .field_errors()
                .keys()
                .next()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "config".to_string());
            ConfigError::InvalidValue {
                field,
                message: errors.to_string(),
            }
        })?;
        Ok(self)
    }
}

fn validate_limits(config: &QueryConfig) -> Result<(), validator::ValidationError> {
    if config.default_limit > config.max_limit {
        return Err(validator::ValidationError::new("default_limit_exceeds_max_limit"));
    }

    for (name, limits) in &config.collections {
        if !is_valid_collection_name(name) {
            return Err(validator::ValidationError::new("invalid_collection_name"));
        }
        if limits.default_limit == Some(0) || limits.max_limit == Some(0) {
            return Err(validator::ValidationError::new("collection_limit_must_be_positive"));
        }
    }

    Ok(())
}

/// Whether `name` can be used as a collection (and URL segment / table) name
pub fn is_valid_collection_name(name: &str) -> bool {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NAME_REGEX.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]{0,62}$").unwrap());
    regex.is_match(name)
}
