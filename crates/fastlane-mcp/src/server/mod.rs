//! MCP server: configuration and the tool handler.

mod config;
mod handler;

pub use config::{
    CONFIG_ENV_VAR, ConfigError, McpServerConfig, PlatformConfig, config_dir, default_config_path,
};
pub use handler::{
    AnalyzeProjectInput, BuildInput, DEFAULT_LANE, FastlaneServerHandler, ListLanesInput,
    PluginDetailsInput, SearchPluginsInput,
};
