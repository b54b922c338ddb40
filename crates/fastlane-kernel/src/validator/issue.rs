//! Validation issue types.

use std::fmt;

use serde::Serialize;

/// How serious an issue is. Errors block a build; warnings never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
}

impl IssueLevel {
    /// Marker used in formatted reports.
    fn icon(&self) -> &'static str {
        match self {
            IssueLevel::Error => "X",
            IssueLevel::Warning => "!",
        }
    }
}

/// Stable identifiers for each class of issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Required environment variable is unset.
    EnvMissing,
    /// Required environment variable is set to the empty string.
    EnvEmpty,
    /// Required tool is not on PATH.
    ToolMissing,
    /// No Fastfile in either supported layout, or the resolved Fastfile
    /// exists but could not be read.
    NoFastfile,
    /// Requested lane is not declared in the Fastfile.
    LaneNotFound,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::EnvMissing => "ENV_MISSING",
            IssueCode::EnvEmpty => "ENV_EMPTY",
            IssueCode::ToolMissing => "TOOL_MISSING",
            IssueCode::NoFastfile => "NO_FASTFILE",
            IssueCode::LaneNotFound => "LANE_NOT_FOUND",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found during pre-flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub level: IssueLevel,
    pub code: IssueCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            code,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            code,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == IssueLevel::Error
    }
}

/// Aggregate outcome of a pre-flight run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True iff no issue has [`IssueLevel::Error`].
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let valid = !issues.iter().any(ValidationIssue::is_error);
        Self { valid, issues }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    /// Render issues one per line, with suggestions indented beneath.
    ///
    /// ```text
    /// [X] Required tool not found: xcodebuild
    ///     -> Install Xcode from the App Store
    /// [!] Environment variable is empty: MATCH_PASSWORD
    /// ```
    pub fn format_issues(&self) -> String {
        let mut lines = Vec::with_capacity(self.issues.len() * 2);
        for issue in &self.issues {
            lines.push(format!("[{}] {}", issue.level.icon(), issue.message));
            if let Some(ref suggestion) = issue.suggestion {
                lines.push(format!("    -> {suggestion}"));
            }
        }
        lines.join("\n")
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::from_issues(Vec::new())
    }
}
