//! fastlane-kernel: the core of fastlane-mcp.
//!
//! This crate provides:
//!
//! - **Lanes**: a line-oriented scanner that discovers lanes in a Fastfile
//! - **Sanitize**: lane-name and project-path validation
//! - **Paths**: Fastfile lookup for nested (`<project>/ios/fastlane`) and
//!   flat (`<project>/fastlane`) project layouts
//! - **Exec**: time-boxed external command execution behind [`CommandRunner`]
//! - **Validator**: pre-flight checks (environment, tools, project structure)
//! - **Diagnosis**: known build-failure signatures and remediation hints
//! - **Plugins**: a static catalog of fastlane plugins
//! - **Project**: the operations exposed to MCP clients (analyze, list, build)

pub mod diagnosis;
pub mod error;
pub mod exec;
pub mod lanes;
pub mod paths;
pub mod platform;
pub mod plugins;
pub mod project;
pub mod sanitize;
pub mod validator;

pub use error::FastlaneError;
pub use exec::{CommandRunner, ExecRequest, ExecutionResult, SystemRunner};
pub use lanes::{LaneRecord, parse_lanes};
pub use platform::Platform;
pub use sanitize::ValidationError;
