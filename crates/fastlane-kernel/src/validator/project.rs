//! Project structure checks: a Fastfile exists, and declares the lane.

use std::path::{Path, PathBuf};

use super::issue::{IssueCode, ValidationIssue};
use crate::lanes::declares_lane;
use crate::paths::{candidate_fastfiles, fastfile_in, find_config_dir};
use crate::platform::Platform;

/// Check that a Fastfile resolves for `platform` and, when given, that it
/// mentions `lane`.
///
/// A missing Fastfile is an error and ends the check. An undeclared lane is
/// only a warning; the lookup is a literal text search.
pub fn validate_project(
    project: &Path,
    platform: Option<Platform>,
    lane: Option<&str>,
) -> Vec<ValidationIssue> {
    let Some(config_dir) = find_config_dir(project, platform) else {
        return vec![no_fastfile(&candidate_fastfiles(project, platform))];
    };

    let Some(lane) = lane else {
        return Vec::new();
    };

    let fastfile = fastfile_in(&config_dir);
    let content = match std::fs::read_to_string(&fastfile) {
        Ok(content) => content,
        Err(e) => {
            return vec![
                ValidationIssue::error(
                    IssueCode::NoFastfile,
                    format!("Fastfile found at {} but could not be read: {e}", fastfile.display()),
                )
                .with_suggestion("Check the file's permissions and encoding"),
            ];
        }
    };

    if declares_lane(&content, lane) {
        Vec::new()
    } else {
        vec![
            ValidationIssue::warning(
                IssueCode::LaneNotFound,
                format!("Lane '{lane}' not found in {}", fastfile.display()),
            )
            .with_suggestion("Available lanes can be listed with 'fastlane lanes'"),
        ]
    }
}

fn no_fastfile(candidates: &[PathBuf]) -> ValidationIssue {
    let checked = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    ValidationIssue::error(IssueCode::NoFastfile, format!("Fastfile not found at {checked}"))
        .with_suggestion("Run 'fastlane init' to create a Fastfile")
}
