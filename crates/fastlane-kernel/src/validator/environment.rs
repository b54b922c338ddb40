//! Required environment variable checks.

use std::ffi::OsString;

use super::issue::{IssueCode, ValidationIssue};

/// Check that each variable in `required` is set and non-empty in the
/// process environment.
pub fn validate_environment(required: &[String]) -> Vec<ValidationIssue> {
    validate_environment_with(required, |name| std::env::var_os(name))
}

/// Same as [`validate_environment`] with an explicit variable lookup.
///
/// Unset produces an error, set-but-empty a warning; issues follow the
/// order of `required`.
pub fn validate_environment_with<F>(required: &[String], lookup: F) -> Vec<ValidationIssue>
where
    F: Fn(&str) -> Option<OsString>,
{
    let mut issues = Vec::new();

    for name in required {
        match lookup(name) {
            None => issues.push(
                ValidationIssue::error(
                    IssueCode::EnvMissing,
                    format!("Required environment variable not set: {name}"),
                )
                .with_suggestion(format!("Set {name} in your environment or .env file")),
            ),
            Some(value) if value.is_empty() => issues.push(
                ValidationIssue::warning(
                    IssueCode::EnvEmpty,
                    format!("Environment variable is empty: {name}"),
                )
                .with_suggestion(format!("Verify {name} has the correct value")),
            ),
            Some(_) => {}
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::validator::IssueLevel;

    fn lookup_in<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<OsString> + 'a {
        move |name: &str| vars.get(name).map(|v| OsString::from(*v))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_variable_has_no_issue() {
        let vars = HashMap::from([("MATCH_PASSWORD", "secret")]);
        let issues = validate_environment_with(&names(&["MATCH_PASSWORD"]), lookup_in(&vars));
        assert!(issues.is_empty());
    }

    #[test]
    fn missing_variable_is_error() {
        let vars = HashMap::new();
        let issues = validate_environment_with(&names(&["APP_STORE_KEY"]), lookup_in(&vars));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, IssueLevel::Error);
        assert_eq!(issues[0].code, IssueCode::EnvMissing);
        assert!(issues[0].message.contains("APP_STORE_KEY"));
        assert!(issues[0].suggestion.is_some());
    }

    #[test]
    fn empty_variable_is_warning() {
        let vars = HashMap::from([("FASTLANE_USER", "")]);
        let issues = validate_environment_with(&names(&["FASTLANE_USER"]), lookup_in(&vars));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, IssueLevel::Warning);
        assert_eq!(issues[0].code, IssueCode::EnvEmpty);
    }

    #[test]
    fn preserves_input_order() {
        let vars = HashMap::from([("B", ""), ("C", "ok")]);
        let issues = validate_environment_with(&names(&["A", "B", "C", "D"]), lookup_in(&vars));
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![IssueCode::EnvMissing, IssueCode::EnvEmpty, IssueCode::EnvMissing]
        );
        assert!(issues[2].message.ends_with(": D"));
    }

    #[test]
    fn reads_process_environment() {
        // PATH is set in any environment the tests run in.
        assert!(validate_environment(&names(&["PATH"])).is_empty());

        let issues = validate_environment(&names(&["FASTLANE_MCP_SURELY_UNSET_VAR_1234"]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::EnvMissing);
    }
}
