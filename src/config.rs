use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_PATH};
use crate::error::{BuildError, Result};

/// What to do with a row whose foreign key matches no minister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Ignore the row; best-effort join
    DropSilently,
    /// Report the row as a blocking validation error
    Validate,
}

/// Join policy per relation. The asymmetric defaults are load-bearing:
/// downstream output changes if they are unified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelationPolicies {
    pub ministries: JoinPolicy,
    pub biography: JoinPolicy,
    pub collaborators: JoinPolicy,
    pub delegates: JoinPolicy,
}

impl Default for RelationPolicies {
    fn default() -> Self {
        Self {
            ministries: JoinPolicy::DropSilently,
            biography: JoinPolicy::DropSilently,
            collaborators: JoinPolicy::DropSilently,
            delegates: JoinPolicy::Validate,
        }
    }
}

impl RelationPolicies {
    pub fn policy(&self, relation: Relation) -> JoinPolicy {
        match relation {
            Relation::Ministries => self.ministries,
            Relation::Biography => self.biography,
            Relation::Collaborators => self.collaborators,
            Relation::Delegates => self.delegates,
        }
    }
}

/// Foreign-key relations folded onto a minister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Ministries,
    Biography,
    Collaborators,
    Delegates,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Ministries => "ministries",
            Relation::Biography => "biography",
            Relation::Collaborators => "collaborators",
            Relation::Delegates => "delegates",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiographyOrder {
    /// Stable sort on the sort index alone
    #[default]
    SortIndex,
    /// Group by accent-folded section label, then sort index
    SectionThenIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// When set, also write one file per minister plus an index manifest
    pub split_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            split_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub policies: RelationPolicies,
    pub biography_order: BiographyOrder,
    /// Directory for JSON log files; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `cabinet.toml` in the
    /// working directory is used when present, else the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BuildError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
