//! Input sanitization for values that reach the external fastlane CLI.
//!
//! Lane names end up as process arguments and project paths become working
//! directories, so both are checked before any process is spawned.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Lane names start with a letter and continue with letters, digits, `_` or `-`.
static SAFE_LANE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("lane regex is valid")
});

/// Characters with meaning to a shell.
static DANGEROUS_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[;&|`$(){}\[\]<>!#*?~\\"']"#)
        .expect("dangerous-chars regex is valid")
});

/// A rejected lane name, project path, or platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Lane name must be a non-empty string")]
    EmptyLaneName,

    #[error("Lane name contains invalid characters: {0}")]
    LaneInvalidCharacters(String),

    #[error("Invalid lane name format: {0}")]
    LaneInvalidFormat(String),

    #[error("Path must be a non-empty string")]
    EmptyPath,

    #[error("Path contains suspicious traversal: {0}")]
    PathTraversal(String),

    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Unsupported platform: {0} (expected 'ios' or 'android')")]
    UnknownPlatform(String),
}

impl ValidationError {
    /// Stable identifier for the kind of rejection.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyLaneName => "empty_lane_name",
            Self::LaneInvalidCharacters(_) => "lane_invalid_characters",
            Self::LaneInvalidFormat(_) => "lane_invalid_format",
            Self::EmptyPath => "empty_path",
            Self::PathTraversal(_) => "path_traversal",
            Self::PathNotFound(_) => "path_not_found",
            Self::NotADirectory(_) => "not_a_directory",
            Self::UnknownPlatform(_) => "unknown_platform",
        }
    }
}

/// Validate a lane name and return it with surrounding whitespace removed.
pub fn sanitize_lane_name(lane: &str) -> Result<String, ValidationError> {
    let trimmed = lane.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyLaneName);
    }

    if DANGEROUS_CHARS.is_match(trimmed) {
        return Err(ValidationError::LaneInvalidCharacters(trimmed.to_string()));
    }

    if !SAFE_LANE.is_match(trimmed) {
        return Err(ValidationError::LaneInvalidFormat(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validate that `path` names an existing directory and return its canonical form.
///
/// A `..` path segment is rejected outright; `..` inside a segment name
/// (`test..dir`) is an ordinary file name and is accepted.
pub fn validate_project_path(path: &str) -> Result<PathBuf, ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::EmptyPath);
    }

    let raw = Path::new(path);
    if raw.components().any(|c| c == Component::ParentDir) {
        return Err(ValidationError::PathTraversal(path.to_string()));
    }

    if !raw.exists() {
        return Err(ValidationError::PathNotFound(path.to_string()));
    }

    if !raw.is_dir() {
        return Err(ValidationError::NotADirectory(path.to_string()));
    }

    raw.canonicalize()
        .map_err(|_| ValidationError::PathNotFound(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn accepts_simple_lane() {
        assert_eq!(sanitize_lane_name("build").expect("valid"), "build");
    }

    #[test]
    fn strips_whitespace() {
        assert_eq!(sanitize_lane_name("  build  ").expect("valid"), "build");
    }

    #[rstest]
    #[case::snake("deploy_beta")]
    #[case::kebab("deploy-beta")]
    #[case::digits("build2")]
    fn accepts_identifier_lanes(#[case] lane: &str) {
        assert_eq!(sanitize_lane_name(lane).expect("valid"), lane);
    }

    #[rstest]
    #[case::semicolon("build; rm -rf /")]
    #[case::subshell("build$(whoami)")]
    #[case::pipe("build | cat")]
    #[case::backtick("build`id`")]
    #[case::redirect("build > /tmp/x")]
    fn rejects_shell_metacharacters(#[case] lane: &str) {
        let err = sanitize_lane_name(lane).expect_err("should be rejected");
        assert!(matches!(err, ValidationError::LaneInvalidCharacters(_)), "{err:?}");
    }

    #[rstest]
    #[case::leading_digit("123build")]
    #[case::inner_space("build lane")]
    #[case::leading_underscore("_helper")]
    fn rejects_bad_format(#[case] lane: &str) {
        let err = sanitize_lane_name(lane).expect_err("should be rejected");
        assert!(matches!(err, ValidationError::LaneInvalidFormat(_)), "{err:?}");
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn rejects_empty_lane(#[case] lane: &str) {
        assert_eq!(sanitize_lane_name(lane), Err(ValidationError::EmptyLaneName));
    }

    #[test]
    fn accepts_existing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().to_string_lossy().to_string();
        let resolved = validate_project_path(&path).expect("valid dir");
        assert_eq!(resolved, dir.path().canonicalize().expect("canonicalize"));
    }

    #[test]
    fn rejects_empty_path() {
        assert_eq!(validate_project_path(""), Err(ValidationError::EmptyPath));
    }

    #[test]
    fn rejects_missing_path() {
        let err = validate_project_path("/nonexistent/path/12345").expect_err("missing");
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn rejects_file_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("Fastfile");
        std::fs::write(&file, "lane :build do\nend").expect("write");
        let err = validate_project_path(&file.to_string_lossy()).expect_err("file");
        assert!(matches!(err, ValidationError::NotADirectory(_)));
    }

    #[test]
    fn rejects_parent_segment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = format!("{}/../etc", dir.path().display());
        let err = validate_project_path(&path).expect_err("traversal");
        assert!(matches!(err, ValidationError::PathTraversal(_)));
        assert_eq!(err.kind(), "path_traversal");
    }

    #[test]
    fn accepts_dots_inside_segment_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("test..dir");
        std::fs::create_dir(&nested).expect("mkdir");
        assert!(validate_project_path(&nested.to_string_lossy()).is_ok());
    }
}
