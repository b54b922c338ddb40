//! Server configuration.
//!
//! Loaded from TOML at startup. Every field has a default, so an empty file
//! (or no file at all at the default location) yields a working server.
//!
//! ```toml
//! fastlane_command = "/opt/homebrew/bin/fastlane"
//! build_timeout_secs = 1200
//!
//! [ios]
//! required_env_vars = ["MATCH_PASSWORD"]
//!
//! [android]
//! required_tools = ["fastlane", "java"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use fastlane_kernel::Platform;
use fastlane_kernel::project::{BuildSettings, default_required_tools};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "FASTLANE_MCP_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Per-platform pre-flight requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Tools that must be on PATH. `None` uses the platform defaults.
    pub required_tools: Option<Vec<String>>,
    /// Environment variables that must be set and non-empty.
    pub required_env_vars: Vec<String>,
}

/// Configuration for the MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpServerConfig {
    /// Server name reported to clients.
    pub name: String,
    /// Server version reported to clients.
    pub version: String,
    /// Executable used to run lanes.
    pub fastlane_command: String,
    pub build_timeout_secs: u64,
    /// Timeout for each `which` lookup during pre-flight.
    pub tool_check_timeout_secs: u64,
    pub ios: PlatformConfig,
    pub android: PlatformConfig,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            name: "fastlane-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            fastlane_command: "fastlane".to_string(),
            build_timeout_secs: 600,
            tool_check_timeout_secs: 30,
            ios: PlatformConfig::default(),
            android: PlatformConfig::default(),
        }
    }
}

impl McpServerConfig {
    /// Load from `$FASTLANE_MCP_CONFIG`, else the default location.
    ///
    /// A missing file at the default location gives the defaults; a missing
    /// file named by the environment variable is an error.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load_from(Path::new(&path));
        }

        let path = default_config_path();
        if path.is_file() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn platform(&self, platform: Platform) -> &PlatformConfig {
        match platform {
            Platform::Ios => &self.ios,
            Platform::Android => &self.android,
        }
    }

    /// Build settings for one platform.
    pub fn build_settings(&self, platform: Platform) -> BuildSettings {
        let platform_config = self.platform(platform);
        BuildSettings {
            fastlane_command: self.fastlane_command.clone(),
            timeout: Duration::from_secs(self.build_timeout_secs),
            tool_timeout: Duration::from_secs(self.tool_check_timeout_secs),
            required_tools: platform_config
                .required_tools
                .clone()
                .unwrap_or_else(|| default_required_tools(platform)),
            required_env_vars: platform_config.required_env_vars.clone(),
        }
    }
}

/// `$XDG_CONFIG_HOME/fastlane-mcp`, falling back to `~/.config/fastlane-mcp`.
pub fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp"))
                .join(".config")
        })
        .join("fastlane-mcp")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_gives_defaults() {
        let config = McpServerConfig::from_toml_str("").expect("parse");
        assert_eq!(config, McpServerConfig::default());
        assert_eq!(config.name, "fastlane-mcp");
        assert_eq!(config.build_timeout_secs, 600);
    }

    #[test]
    fn default_settings_per_platform() {
        let config = McpServerConfig::default();

        let ios = config.build_settings(Platform::Ios);
        assert_eq!(ios.required_tools, vec!["fastlane", "xcodebuild"]);
        assert_eq!(ios.timeout, Duration::from_secs(600));
        assert_eq!(ios.tool_timeout, Duration::from_secs(30));
        assert!(ios.required_env_vars.is_empty());

        let android = config.build_settings(Platform::Android);
        assert_eq!(android.required_tools, vec!["fastlane"]);
    }

    #[test]
    fn platform_tables_override_defaults() {
        let config = McpServerConfig::from_toml_str(
            r#"
fastlane_command = "/usr/local/bin/fastlane"
build_timeout_secs = 1200

[ios]
required_env_vars = ["MATCH_PASSWORD"]

[android]
required_tools = ["fastlane", "java"]
"#,
        )
        .expect("parse");

        let ios = config.build_settings(Platform::Ios);
        assert_eq!(ios.fastlane_command, "/usr/local/bin/fastlane");
        assert_eq!(ios.timeout, Duration::from_secs(1200));
        assert_eq!(ios.required_tools, vec!["fastlane", "xcodebuild"]);
        assert_eq!(ios.required_env_vars, vec!["MATCH_PASSWORD"]);

        let android = config.build_settings(Platform::Android);
        assert_eq!(android.required_tools, vec!["fastlane", "java"]);
    }

    #[test]
    fn empty_tool_list_disables_tool_checks() {
        let config = McpServerConfig::from_toml_str("[ios]\nrequired_tools = []\n").expect("parse");
        assert!(config.build_settings(Platform::Ios).required_tools.is_empty());
    }

    #[test]
    fn load_from_reads_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "name = \"builds\"\n").expect("write");

        let config = McpServerConfig::load_from(&path).expect("load");
        assert_eq!(config.name, "builds");
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let tmp = TempDir::new().expect("tempdir");
        let err = McpServerConfig::load_from(&tmp.path().join("absent.toml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_names_the_path() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "build_timeout_secs = \"soon\"\n").expect("write");

        let err = McpServerConfig::load_from(&path).expect_err("bad type");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn default_path_is_under_fastlane_mcp() {
        let path = default_config_path();
        assert!(path.ends_with("fastlane-mcp/config.toml"));
    }
}
