use crate::domain::TagPrefix;
use crate::error::{LineageError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// File name searched for in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "lineage.toml";

/// Represents the complete configuration for git-lineage.
///
/// Contains the version tag prefix and the branch naming rules used to
/// decide which branches can be the source of another.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    #[serde(default = "default_branches")]
    pub branches: BTreeMap<String, BranchConfig>,
}

/// Naming rule for one kind of branch.
///
/// `source_branches` lists the keys of other entries in
/// [Config::branches] that a branch of this kind may be created from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchConfig {
    pub regex: String,

    #[serde(default)]
    pub source_branches: Vec<String>,
}

impl BranchConfig {
    fn new(regex: &str, source_branches: &[&str]) -> Self {
        BranchConfig {
            regex: regex.to_string(),
            source_branches: source_branches.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Returns the default tag prefix pattern.
fn default_tag_prefix() -> String {
    "[vV]".to_string()
}

/// Returns the default branch naming rules.
fn default_branches() -> BTreeMap<String, BranchConfig> {
    let mut map = BTreeMap::new();
    map.insert(
        "main".to_string(),
        BranchConfig::new(r"^(master|main)$", &["develop", "release"]),
    );
    map.insert(
        "develop".to_string(),
        BranchConfig::new(r"^dev(elop)?(ment)?$", &["main"]),
    );
    map.insert(
        "release".to_string(),
        BranchConfig::new(
            r"^releases?[/-]",
            &["develop", "main", "support", "release"],
        ),
    );
    map.insert(
        "feature".to_string(),
        BranchConfig::new(
            r"^features?[/-]",
            &["develop", "main", "release", "feature", "support", "hotfix"],
        ),
    );
    map.insert(
        "hotfix".to_string(),
        BranchConfig::new(r"^hotfix(es)?[/-]", &["release", "main", "support", "hotfix"]),
    );
    map.insert(
        "support".to_string(),
        BranchConfig::new(r"^support[/-]", &["main"]),
    );
    map
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag_prefix: default_tag_prefix(),
            branches: default_branches(),
        }
    }
}

impl Config {
    /// Compile the configured tag prefix
    pub fn tag_prefix(&self) -> Result<TagPrefix> {
        TagPrefix::new(&self.tag_prefix)
    }

    /// Finds the rule whose regex matches `branch_name`.
    ///
    /// When several rules match, the first by key order wins.
    pub fn config_for_branch(&self, branch_name: &str) -> Result<Option<(&str, &BranchConfig)>> {
        let rules = self.compiled_rules()?;
        Ok(Self::matching_rule(&rules, branch_name)
            .and_then(|key| self.branches.get_key_value(key))
            .map(|(key, branch_config)| (key.as_str(), branch_config)))
    }

    /// Patterns a source branch of `branch_name` must match.
    ///
    /// A branch with no matching rule may come from any branch.
    pub fn source_branch_patterns(&self, branch_name: &str) -> Result<Vec<Regex>> {
        let rules = self.compiled_rules()?;
        let Some(key) = Self::matching_rule(&rules, branch_name) else {
            debug!("No configuration for '{}'; any branch can be its source", branch_name);
            return Ok(vec![Regex::new(".*")?]);
        };

        let mut patterns = Vec::new();
        for source in &self.branches[key].source_branches {
            match rules.get(source.as_str()) {
                Some(regex) => patterns.push(regex.clone()),
                None => warn!(
                    "Configuration '{}' names unknown source branch '{}'",
                    key, source
                ),
            }
        }

        Ok(patterns)
    }

    /// Every rule's regex, compiled once
    fn compiled_rules(&self) -> Result<BTreeMap<&str, Regex>> {
        let mut rules = BTreeMap::new();
        for (key, branch_config) in &self.branches {
            rules.insert(key.as_str(), Regex::new(&branch_config.regex)?);
        }
        Ok(rules)
    }

    fn matching_rule<'a>(rules: &BTreeMap<&'a str, Regex>, branch_name: &str) -> Option<&'a str> {
        let matching: Vec<&str> = rules
            .iter()
            .filter(|(_, regex)| regex.is_match(branch_name))
            .map(|(key, _)| *key)
            .collect();

        if matching.len() > 1 {
            warn!(
                "Branch '{}' matches several configurations ({}); using '{}'",
                branch_name,
                matching.join(", "),
                matching[0]
            );
        }

        matching.first().copied()
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `lineage.toml` in current directory
/// 3. `git-lineage/lineage.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("git-lineage").join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| LineageError::config(format!("Cannot parse configuration: {}", e)))?;
    Ok(config)
}
