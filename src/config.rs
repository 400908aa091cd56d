use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};

/// Represents the complete configuration for git-release.
///
/// Contains remote/push policy, version manifest locations, build tool
/// settings, and the optional chat notification destination.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default = "default_manifests")]
    pub manifests: Vec<String>,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,
}

/// Remote synchronization and tagging policy.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Name of the upstream remote used for fetch and push.
    #[serde(default = "default_remote_name")]
    pub name: String,

    /// Branch on the remote that receives the release merge commit.
    #[serde(default = "default_target_branch")]
    pub target_branch: String,

    /// Fetch every configured remote instead of only `name`.
    #[serde(default)]
    pub fetch_all: bool,

    /// Move the version tag with `-f` when it already exists locally.
    #[serde(default = "default_true")]
    pub force_tag: bool,
}

/// Build tool invocation settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    /// Program executed for the build stage.
    #[serde(default = "default_build_command")]
    pub command: String,

    /// File whose presence enables the build stage.
    #[serde(default = "default_build_config_file")]
    pub config_file: String,

    /// Named tasks run after the default task.
    #[serde(default = "default_build_tasks")]
    pub tasks: Vec<String>,
}

/// Chat notification destination.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotifyConfig {
    /// Endpoint receiving the release announcement.
    pub url: String,

    /// Room identifier passed along with the message.
    pub room: String,

    /// Optional bearer token for the endpoint.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_remote_name() -> String {
    "upstream".to_string()
}

fn default_target_branch() -> String {
    "master".to_string()
}

fn default_true() -> bool {
    true
}

fn default_manifests() -> Vec<String> {
    vec!["package.json".to_string(), "bower.json".to_string()]
}

fn default_build_command() -> String {
    "grunt".to_string()
}

fn default_build_config_file() -> String {
    "Gruntfile.js".to_string()
}

fn default_build_tasks() -> Vec<String> {
    vec!["check-coverage".to_string()]
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            name: default_remote_name(),
            target_branch: default_target_branch(),
            fetch_all: false,
            force_tag: true,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            command: default_build_command(),
            config_file: default_build_config_file(),
            tasks: default_build_tasks(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: RemoteConfig::default(),
            manifests: default_manifests(),
            build: BuildConfig::default(),
            notify: None,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitrelease.toml` in current directory
/// 3. `~/.config/.gitrelease.toml` in user config directory
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
    } else if Path::new("./gitrelease.toml").exists() {
        fs::read_to_string("./gitrelease.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".gitrelease.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config =
        toml::from_str(&config_str).map_err(|e| ReleaseError::config(e.to_string()))?;
    Ok(config)
}
