//! Project-level operations: analyze, list lanes, build.
//!
//! These are what the MCP tools call. Each validates its inputs before
//! touching the filesystem or spawning anything.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::diagnosis::failure_report;
use crate::error::FastlaneError;
use crate::exec::{CommandRunner, DEFAULT_TIMEOUT, ExecRequest, fastlane_args};
use crate::lanes::{LaneRecord, declares_platform, parse_lanes};
use crate::paths::{
    candidate_fastfiles, fastfile_in, find_config_dir, find_execution_dir, flat_config_dir,
    nested_config_dir,
};
use crate::platform::Platform;
use crate::sanitize::{sanitize_lane_name, validate_project_path};
use crate::validator::{Preflight, PreflightContext, TOOL_LOOKUP_TIMEOUT};

/// Environment variable carrying the requested build environment to lanes.
pub const BUILD_ENV_VAR: &str = "FASTLANE_ENV";

/// Platforms and lanes discovered in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectAnalysis {
    pub project_path: PathBuf,
    pub platforms: Vec<Platform>,
    pub lanes: Vec<LaneRecord>,
    pub has_fastlane: bool,
}

/// Lanes matching a [`list_lanes`] query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneListing {
    pub project_path: PathBuf,
    pub platform_filter: Option<Platform>,
    pub lanes: Vec<LaneRecord>,
}

/// Read a Fastfile, or `None` if it does not exist.
fn read_fastfile(path: &Path) -> Result<Option<String>, FastlaneError> {
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|e| FastlaneError::io(path, e))
}

/// Parse lanes, filling in `platform` for lanes declared outside a block.
fn lanes_with_default(content: &str, platform: Option<Platform>) -> Vec<LaneRecord> {
    parse_lanes(content)
        .into_iter()
        .map(|mut lane| {
            lane.platform = lane.platform.or(platform);
            lane
        })
        .collect()
}

/// Discover platforms and lanes across both project layouts.
///
/// Nested platform directories are read first, in [`Platform::ALL`] order,
/// followed by the flat `fastlane/Fastfile`.
pub fn analyze_project(project_path: &str) -> Result<ProjectAnalysis, FastlaneError> {
    let project = validate_project_path(project_path)?;
    let mut platforms = Vec::new();
    let mut lanes = Vec::new();

    for platform in Platform::ALL {
        let fastfile = fastfile_in(&nested_config_dir(&project, platform));
        if let Some(content) = read_fastfile(&fastfile)? {
            platforms.push(platform);
            lanes.extend(lanes_with_default(&content, Some(platform)));
        }
    }

    let root_fastfile = fastfile_in(&flat_config_dir(&project));
    let root_content = read_fastfile(&root_fastfile)?;
    if let Some(ref content) = root_content {
        let root_lanes = parse_lanes(content);
        for lane in &root_lanes {
            if let Some(platform) = lane.platform {
                if !platforms.contains(&platform) {
                    platforms.push(platform);
                }
            }
        }
        lanes.extend(root_lanes);
    }

    let has_fastlane = !platforms.is_empty() || root_content.is_some();
    tracing::info!(
        project = %project.display(),
        platforms = ?platforms,
        lanes = lanes.len(),
        "analyzed project"
    );

    Ok(ProjectAnalysis {
        project_path: project,
        platforms,
        lanes,
        has_fastlane,
    })
}

/// List lanes, optionally for one platform, hiding private lanes unless asked.
///
/// With a platform the resolved Fastfile must exist (nested preferred,
/// flat fallback); lanes from a flat Fastfile are limited to that
/// platform's block and shared lanes. Without a platform every layout is
/// scanned and missing Fastfiles are skipped.
pub fn list_lanes(
    project_path: &str,
    platform: Option<Platform>,
    include_private: bool,
) -> Result<LaneListing, FastlaneError> {
    let project = validate_project_path(project_path)?;
    let mut lanes = Vec::new();

    match platform {
        Some(platform) => {
            let Some(config_dir) = find_config_dir(&project, Some(platform)) else {
                return Err(FastlaneError::ConfigNotFound(candidate_fastfiles(
                    &project,
                    Some(platform),
                )));
            };
            let fastfile = fastfile_in(&config_dir);
            let content = read_fastfile(&fastfile)?
                .ok_or_else(|| FastlaneError::ConfigNotFound(vec![fastfile.clone()]))?;
            lanes.extend(
                parse_lanes(&content)
                    .into_iter()
                    .filter(|lane| lane.platform.is_none() || lane.platform == Some(platform))
                    .map(|mut lane| {
                        lane.platform = Some(platform);
                        lane
                    }),
            );
        }
        None => {
            let mut sources: Vec<(Option<Platform>, PathBuf)> = Platform::ALL
                .iter()
                .map(|&p| (Some(p), fastfile_in(&nested_config_dir(&project, p))))
                .collect();
            sources.push((None, fastfile_in(&flat_config_dir(&project))));

            for (default_platform, fastfile) in sources {
                if let Some(content) = read_fastfile(&fastfile)? {
                    lanes.extend(lanes_with_default(&content, default_platform));
                }
            }
        }
    }

    if !include_private {
        lanes.retain(|lane| !lane.is_private);
    }

    tracing::info!(
        project = %project.display(),
        platform = ?platform,
        include_private,
        lanes = lanes.len(),
        "listed lanes"
    );

    Ok(LaneListing {
        project_path: project,
        platform_filter: platform,
        lanes,
    })
}

/// Tools a build for `platform` needs on PATH unless configured otherwise.
pub fn default_required_tools(platform: Platform) -> Vec<String> {
    match platform {
        Platform::Ios => vec!["fastlane".to_string(), "xcodebuild".to_string()],
        Platform::Android => vec!["fastlane".to_string()],
    }
}

/// A build request from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub project_path: String,
    pub platform: Platform,
    pub lane: String,
    /// Exported to the lane as `FASTLANE_ENV` (e.g. `debug`, `release`).
    pub environment: Option<String>,
    /// Passes `clean:true` to the lane.
    pub clean: bool,
}

impl BuildRequest {
    pub fn new(project_path: impl Into<String>, platform: Platform, lane: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            platform,
            lane: lane.into(),
            environment: None,
            clean: false,
        }
    }
}

/// Server-side knobs for builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub fastlane_command: String,
    pub timeout: Duration,
    pub tool_timeout: Duration,
    pub required_tools: Vec<String>,
    pub required_env_vars: Vec<String>,
}

impl BuildSettings {
    /// Defaults for `platform`: `fastlane` on PATH, 10 minute build timeout.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            fastlane_command: "fastlane".to_string(),
            timeout: DEFAULT_TIMEOUT,
            tool_timeout: TOOL_LOOKUP_TIMEOUT,
            required_tools: default_required_tools(platform),
            required_env_vars: Vec::new(),
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutput {
    pub success: bool,
    pub platform: Platform,
    pub lane: String,
    pub working_dir: PathBuf,
    pub output: String,
}

/// Validate, pre-flight, and run a lane for one platform.
///
/// Nothing is spawned until the lane name and path are valid and
/// pre-flight reports no errors. A non-zero exit becomes
/// [`FastlaneError::CommandFailed`] with a diagnosis and the output tails.
pub async fn build(
    request: &BuildRequest,
    settings: &BuildSettings,
    runner: &dyn CommandRunner,
) -> Result<BuildOutput, FastlaneError> {
    let lane = sanitize_lane_name(&request.lane)?;
    let project = validate_project_path(&request.project_path)?;
    let platform = request.platform;

    let ctx = PreflightContext::new()
        .project(&project)
        .platform(platform)
        .lane(&lane)
        .env_vars(settings.required_env_vars.iter().cloned())
        .tools(settings.required_tools.iter().cloned());
    let preflight = Preflight::new(runner)
        .with_tool_timeout(settings.tool_timeout)
        .run(&ctx)
        .await;

    if !preflight.valid {
        return Err(FastlaneError::Preflight {
            report: preflight.format_issues(),
            issues: preflight.issues,
        });
    }
    for warning in preflight.warnings() {
        tracing::warn!(code = %warning.code, "{}", warning.message);
    }

    let working_dir = find_execution_dir(&project, platform);
    let prefix = if fastfile_declares_platform(&project, platform)? {
        Some(platform)
    } else {
        None
    };

    let mut options = Vec::new();
    if request.clean {
        options.push(("clean".to_string(), "true".to_string()));
    }

    let mut exec = ExecRequest::new(&settings.fastlane_command)
        .args(fastlane_args(&lane, prefix, &options))
        .cwd(&working_dir)
        .timeout(settings.timeout);
    if let Some(ref environment) = request.environment {
        exec = exec.env(BUILD_ENV_VAR, environment);
    }

    tracing::info!(
        platform = %platform,
        lane = %lane,
        working_dir = %working_dir.display(),
        "starting build"
    );
    let result = runner.run(exec).await;

    if !result.ok() {
        tracing::warn!(platform = %platform, lane = %lane, exit_code = result.exit_code, "build failed");
        return Err(FastlaneError::CommandFailed {
            message: failure_report(&result.stdout, &result.stderr),
            exit_code: result.exit_code,
        });
    }

    tracing::info!(platform = %platform, lane = %lane, "build succeeded");
    Ok(BuildOutput {
        success: true,
        platform,
        lane,
        working_dir,
        output: result.stdout,
    })
}

/// Whether the resolved Fastfile opens a `platform :<platform> do` block.
///
/// Lanes in a platform-scoped Fastfile are invoked as
/// `fastlane <platform> <lane>`; otherwise the lane name alone is used.
fn fastfile_declares_platform(project: &Path, platform: Platform) -> Result<bool, FastlaneError> {
    let Some(config_dir) = find_config_dir(project, Some(platform)) else {
        return Ok(false);
    };
    let Some(content) = read_fastfile(&fastfile_in(&config_dir))? else {
        return Ok(false);
    };
    Ok(declares_platform(&content, platform))
}
