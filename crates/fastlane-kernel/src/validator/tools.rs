//! Required tool availability checks.

use std::time::Duration;

use super::issue::{IssueCode, ValidationIssue};
use crate::exec::{CommandRunner, ExecRequest};

/// Upper bound for a single `which` lookup.
pub const TOOL_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Install hints for tools fastlane builds commonly depend on.
const TOOL_INSTALL_HINTS: &[(&str, &str)] = &[
    ("fastlane", "Install with: gem install fastlane OR brew install fastlane"),
    ("xcodebuild", "Install Xcode from the App Store"),
    ("gradle", "Install with: brew install gradle"),
    ("bundler", "Install with: gem install bundler"),
    ("pod", "Install with: gem install cocoapods"),
    ("ruby", "Install with: brew install ruby"),
];

/// Install hint for `tool`, or a generic PATH hint for unknown tools.
pub fn install_hint(tool: &str) -> String {
    TOOL_INSTALL_HINTS
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, hint)| (*hint).to_string())
        .unwrap_or_else(|| format!("Install {tool} and ensure it's in your PATH"))
}

/// Check each tool with `which`, in order. A non-zero exit is an error.
pub async fn validate_tools(
    required: &[String],
    runner: &dyn CommandRunner,
    timeout: Duration,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for tool in required {
        let result = runner
            .run(ExecRequest::new("which").args([tool.as_str()]).timeout(timeout))
            .await;

        if !result.ok() {
            tracing::debug!(tool = %tool, exit_code = result.exit_code, "tool missing");
            issues.push(
                ValidationIssue::error(
                    IssueCode::ToolMissing,
                    format!("Required tool not found: {tool}"),
                )
                .with_suggestion(install_hint(tool)),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::exec::{ExecutionResult, SystemRunner};

    /// Pretends only `installed` tools exist; records lookups.
    struct FakeWhich {
        installed: HashSet<&'static str>,
        calls: Mutex<Vec<ExecRequest>>,
    }

    impl FakeWhich {
        fn new(installed: &[&'static str]) -> Self {
            Self {
                installed: installed.iter().copied().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for FakeWhich {
        async fn run(&self, request: ExecRequest) -> ExecutionResult {
            let found = self.installed.contains(request.args[0].as_str());
            self.calls.lock().expect("lock").push(request);
            if found {
                ExecutionResult::new("/usr/bin/tool\n", "", 0)
            } else {
                ExecutionResult::new("", "", 1)
            }
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn installed_tools_pass() {
        let runner = FakeWhich::new(&["fastlane", "xcodebuild"]);
        let issues =
            validate_tools(&names(&["fastlane", "xcodebuild"]), &runner, TOOL_LOOKUP_TIMEOUT).await;
        assert!(issues.is_empty());

        let calls = runner.calls.lock().expect("lock");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command, "which");
        assert_eq!(calls[0].args, vec!["fastlane"]);
        assert_eq!(calls[0].cwd, None);
    }

    #[tokio::test]
    async fn missing_tool_uses_known_hint() {
        let runner = FakeWhich::new(&[]);
        let issues = validate_tools(&names(&["pod"]), &runner, TOOL_LOOKUP_TIMEOUT).await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::ToolMissing);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("pod"));
        assert_eq!(
            issues[0].suggestion.as_deref(),
            Some("Install with: gem install cocoapods")
        );
    }

    #[tokio::test]
    async fn unknown_tool_gets_generic_hint() {
        let runner = FakeWhich::new(&[]);
        let issues = validate_tools(&names(&["swiftlint"]), &runner, TOOL_LOOKUP_TIMEOUT).await;
        assert_eq!(
            issues[0].suggestion.as_deref(),
            Some("Install swiftlint and ensure it's in your PATH")
        );
    }

    #[tokio::test]
    async fn issues_follow_input_order() {
        let runner = FakeWhich::new(&["ruby"]);
        let issues =
            validate_tools(&names(&["gradle", "ruby", "bundler"]), &runner, TOOL_LOOKUP_TIMEOUT)
                .await;
        let messages: Vec<_> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Required tool not found: gradle",
                "Required tool not found: bundler"
            ]
        );
    }

    #[tokio::test]
    async fn real_lookup_reports_unknown_tool() {
        let issues = validate_tools(
            &names(&["definitely-not-a-real-tool-xyz"]),
            &SystemRunner,
            TOOL_LOOKUP_TIMEOUT,
        )
        .await;
        assert_eq!(issues.len(), 1);
    }
}
