use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_ORG: &str = "milestoneDevOrg";
const DEFAULT_SF_BINARY: &str = "sf";
const DEFAULT_MIN_TASKS: usize = 10;
const DEFAULT_MAX_TASKS: usize = 20;
const DEFAULT_CURRENT_USER_WEIGHT: f64 = 0.55;
const DEFAULT_RELATIONSHIPS_PER_ACCOUNT: usize = 3;
const DEFAULT_LOG_PATH: &str = "orgseed.log.jsonl";

/// Root configuration shared by both tools, loaded from YAML.
///
/// Every block is optional; a missing file behaves like [`SeedConfig::default`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SeedConfig {
    #[serde(default = "default_org")]
    pub org: String,
    #[serde(default = "default_sf_binary")]
    pub sf_binary: String,
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub owners: OwnersConfig,
    #[serde(default = "default_relationships_per_account")]
    pub relationships_per_account: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            org: default_org(),
            sf_binary: default_sf_binary(),
            tasks: TasksConfig::default(),
            owners: OwnersConfig::default(),
            relationships_per_account: DEFAULT_RELATIONSHIPS_PER_ACCOUNT,
            logging: LoggingConfig::default(),
        }
    }
}

impl SeedConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SeedConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.org.trim().is_empty() {
            return Err(invalid("org", "target org must not be empty"));
        }
        if self.sf_binary.trim().is_empty() {
            return Err(invalid("sf_binary", "sf binary must not be empty"));
        }
        self.tasks.validate()?;
        self.owners.validate()?;
        self.logging.normalize();
        Ok(())
    }
}

fn default_org() -> String {
    DEFAULT_ORG.to_string()
}

fn default_sf_binary() -> String {
    DEFAULT_SF_BINARY.to_string()
}

fn default_relationships_per_account() -> usize {
    DEFAULT_RELATIONSHIPS_PER_ACCOUNT
}

/// Number of top-level tasks seeded per account.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct TasksConfig {
    #[serde(default = "default_min_tasks")]
    pub min: usize,
    #[serde(default = "default_max_tasks")]
    pub max: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_TASKS,
            max: DEFAULT_MAX_TASKS,
        }
    }
}

impl TasksConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.min < 1 {
            return Err(invalid("tasks.min", "minimum task count must be at least 1"));
        }
        if self.max < self.min {
            return Err(invalid(
                "tasks.max",
                "maximum task count must not be below the minimum",
            ));
        }
        Ok(())
    }
}

fn default_min_tasks() -> usize {
    DEFAULT_MIN_TASKS
}

fn default_max_tasks() -> usize {
    DEFAULT_MAX_TASKS
}

/// The owner roster: the authenticated user plus colleagues found by name.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OwnersConfig {
    #[serde(default = "default_current_user_weight")]
    pub current_user_weight: f64,
    #[serde(default = "default_optional_owners")]
    pub optional: Vec<OptionalOwnerConfig>,
}

impl Default for OwnersConfig {
    fn default() -> Self {
        Self {
            current_user_weight: DEFAULT_CURRENT_USER_WEIGHT,
            optional: default_optional_owners(),
        }
    }
}

impl OwnersConfig {
    /// Renames the first owner that may be picked on any account.
    pub fn set_unrestricted_name(&mut self, name: impl Into<String>) {
        if let Some(owner) = self.optional.iter_mut().find(|o| !o.restrict_to_account) {
            owner.name = name.into();
        }
    }

    /// Renames the first owner limited to their own account.
    pub fn set_restricted_name(&mut self, name: impl Into<String>) {
        if let Some(owner) = self.optional.iter_mut().find(|o| o.restrict_to_account) {
            owner.name = name.into();
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_weight("owners.current_user_weight", self.current_user_weight)?;

        let mut seen = HashSet::new();
        for (idx, owner) in self.optional.iter().enumerate() {
            if owner.name.trim().is_empty() {
                return Err(invalid(
                    format!("owners.optional[{idx}].name"),
                    "owner name must not be empty",
                ));
            }
            if !seen.insert(owner.name.clone()) {
                return Err(invalid(
                    "owners.optional",
                    format!("owner '{}' defined more than once", owner.name),
                ));
            }
            validate_weight(&format!("owners.optional[{idx}].weight"), owner.weight)?;
        }
        Ok(())
    }
}

/// A colleague located by a `User.Name` fragment.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OptionalOwnerConfig {
    pub name: String,
    pub weight: f64,
    /// Only eligible on the account their contact belongs to.
    #[serde(default)]
    pub restrict_to_account: bool,
    /// Maximum number of picks per run.
    #[serde(default)]
    pub quota: Option<u32>,
}

fn default_current_user_weight() -> f64 {
    DEFAULT_CURRENT_USER_WEIGHT
}

fn default_optional_owners() -> Vec<OptionalOwnerConfig> {
    vec![
        OptionalOwnerConfig {
            name: "Kevin P".to_string(),
            weight: 0.35,
            restrict_to_account: false,
            quota: None,
        },
        OptionalOwnerConfig {
            name: "William Hank".to_string(),
            weight: 0.10,
            restrict_to_account: true,
            quota: Some(4),
        },
    ]
}

fn validate_weight(field: &str, weight: f64) -> Result<(), ValidationError> {
    if !(weight > 0.0 && weight <= 1.0) {
        return Err(invalid(field, format!("weight {weight} must be in (0, 1]")));
    }
    Ok(())
}

/// Logging defaults to human-readable output on stderr.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            log_path: default_log_path(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_PATH)
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.into(),
        message: message.into(),
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
