//! Pre-flight orchestration.

use std::path::PathBuf;
use std::time::Duration;

use super::environment::validate_environment;
use super::issue::ValidationResult;
use super::project::validate_project;
use super::tools::{TOOL_LOOKUP_TIMEOUT, validate_tools};
use crate::exec::CommandRunner;
use crate::platform::Platform;

/// What a pre-flight run should check.
///
/// Empty lists skip their category; no project path skips the project
/// structure check. A default context checks nothing and is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreflightContext {
    pub project_path: Option<PathBuf>,
    pub platform: Option<Platform>,
    pub lane: Option<String>,
    pub required_env_vars: Vec<String>,
    pub required_tools: Vec<String>,
}

impl PreflightContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn lane(mut self, lane: impl Into<String>) -> Self {
        self.lane = Some(lane.into());
        self
    }

    pub fn env_vars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_env_vars.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_tools.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Runs the environment, tool, and project validators in that order.
pub struct Preflight<'a> {
    runner: &'a dyn CommandRunner,
    tool_timeout: Duration,
}

impl<'a> Preflight<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            tool_timeout: TOOL_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Run every requested check and aggregate the issues.
    ///
    /// Issues are ordered environment, then tools, then project. The result
    /// is valid iff none of them is an error.
    pub async fn run(&self, ctx: &PreflightContext) -> ValidationResult {
        let mut issues = Vec::new();

        if !ctx.required_env_vars.is_empty() {
            issues.extend(validate_environment(&ctx.required_env_vars));
        }

        if !ctx.required_tools.is_empty() {
            issues.extend(validate_tools(&ctx.required_tools, self.runner, self.tool_timeout).await);
        }

        if let Some(ref project) = ctx.project_path {
            issues.extend(validate_project(project, ctx.platform, ctx.lane.as_deref()));
        }

        let result = ValidationResult::from_issues(issues);
        tracing::info!(
            valid = result.valid,
            errors = result.errors().count(),
            warnings = result.warnings().count(),
            "preflight complete"
        );
        result
    }
}

/// Run pre-flight checks with the default tool lookup timeout.
pub async fn run_preflight(ctx: &PreflightContext, runner: &dyn CommandRunner) -> ValidationResult {
    Preflight::new(runner).run(ctx).await
}
