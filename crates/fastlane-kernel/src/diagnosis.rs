//! Build failure diagnosis from known error signatures.
//!
//! Patterns are checked in table order against the combined command
//! output; the first match wins. Unrecognized output gets a generic
//! diagnosis that carries the original text.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Characters of each output stream kept in failure messages.
pub const OUTPUT_TAIL_CHARS: usize = 2000;

/// A recognizable failure with remediation hints.
#[derive(Debug)]
pub struct ErrorPattern {
    pub id: &'static str,
    pub pattern: Regex,
    pub category: &'static str,
    pub message: &'static str,
    pub diagnosis: &'static str,
    pub suggestions: &'static [&'static str],
}

struct PatternSpec {
    id: &'static str,
    regex: &'static str,
    category: &'static str,
    message: &'static str,
    diagnosis: &'static str,
    suggestions: &'static [&'static str],
}

const PATTERN_SPECS: &[PatternSpec] = &[
    PatternSpec {
        id: "no_signing_certificate",
        regex: r"No signing certificate|Code Sign error|No certificate",
        category: "signing",
        message: "Code signing certificate not found",
        diagnosis: "Your signing certificate is not installed in the keychain or has expired",
        suggestions: &[
            "Run 'fastlane match development' to sync certificates",
            "Check Keychain Access for expired certificates",
            "Verify your Apple Developer account has valid certificates",
        ],
    },
    PatternSpec {
        id: "no_provisioning_profile",
        regex: r"No provisioning profile|Provisioning profile.*not found|couldn't find provisioning profile",
        category: "signing",
        message: "Provisioning profile not found",
        diagnosis: "The required provisioning profile is missing or expired",
        suggestions: &[
            "Run 'fastlane match appstore' or 'fastlane match development'",
            "Check that the bundle ID matches your provisioning profile",
            "Verify the profile hasn't expired in the Developer Portal",
        ],
    },
    PatternSpec {
        id: "xcode_not_selected",
        regex: r"xcode-select.*error|no developer tools were found",
        category: "environment",
        message: "Xcode developer tools not configured",
        diagnosis: "Xcode command line tools are not properly installed or selected",
        suggestions: &[
            "Run 'xcode-select --install' to install command line tools",
            "Run 'sudo xcode-select -s /Applications/Xcode.app' to select Xcode",
        ],
    },
    PatternSpec {
        id: "simulator_not_found",
        regex: r"Unable to find a destination matching|No simulator found|destination.*not found",
        category: "simulator",
        message: "iOS Simulator not found",
        diagnosis: "The specified simulator device or iOS version is not available",
        suggestions: &[
            "Open Xcode and download the required simulator runtime",
            "Run 'xcrun simctl list devices' to see available simulators",
            "Check your destination parameter matches an available device",
        ],
    },
    PatternSpec {
        id: "cocoapods_not_installed",
        regex: r"pod.*command not found|CocoaPods.*not installed",
        category: "dependencies",
        message: "CocoaPods not installed",
        diagnosis: "CocoaPods is required but not installed",
        suggestions: &[
            "Run 'gem install cocoapods'",
            "Run 'pod setup' after installation",
            "Consider using 'bundle exec pod' if using Bundler",
        ],
    },
    PatternSpec {
        id: "pod_install_failed",
        regex: r"pod install.*failed|Unable to find a specification",
        category: "dependencies",
        message: "CocoaPods installation failed",
        diagnosis: "One or more pods failed to install",
        suggestions: &[
            "Run 'pod repo update' to update the spec repo",
            "Check your Podfile for typos in pod names",
            "Try removing Podfile.lock and running 'pod install' again",
        ],
    },
    PatternSpec {
        id: "gradle_build_failed",
        regex: r"Gradle build failed|FAILURE: Build failed|Could not resolve",
        category: "build",
        message: "Gradle build failed",
        diagnosis: "The Android Gradle build encountered an error",
        suggestions: &[
            "Run './gradlew clean' and try again",
            "Check build.gradle for dependency conflicts",
            "Verify your Android SDK and build tools are up to date",
        ],
    },
    PatternSpec {
        id: "android_sdk_not_found",
        regex: r"SDK location not found|ANDROID_HOME.*not set|ANDROID_SDK_ROOT",
        category: "environment",
        message: "Android SDK not found",
        diagnosis: "The Android SDK is not installed or ANDROID_HOME is not set",
        suggestions: &[
            "Install Android Studio which includes the SDK",
            "Set ANDROID_HOME environment variable to your SDK path",
            "Run 'sdkmanager --licenses' to accept licenses",
        ],
    },
    PatternSpec {
        id: "keystore_not_found",
        regex: r"Keystore.*not found|keystore file|release-key",
        category: "signing",
        message: "Android keystore not found",
        diagnosis: "The signing keystore file is missing or path is incorrect",
        suggestions: &[
            "Verify the keystore path in your gradle.properties",
            "Create a keystore with 'keytool -genkey -v -keystore release.keystore'",
            "Check that MYAPP_RELEASE_STORE_FILE points to the correct file",
        ],
    },
    PatternSpec {
        id: "ruby_version_mismatch",
        regex: r"ruby.*version.*required|Your Ruby version is",
        category: "environment",
        message: "Ruby version mismatch",
        diagnosis: "The installed Ruby version doesn't meet requirements",
        suggestions: &[
            "Install the required Ruby version with 'rbenv install X.X.X'",
            "Check .ruby-version file for the required version",
            "Run 'rbenv local X.X.X' to set the version for this project",
        ],
    },
    PatternSpec {
        id: "bundler_not_installed",
        regex: r"bundler.*not found|bundle.*command not found",
        category: "dependencies",
        message: "Bundler not installed",
        diagnosis: "Ruby Bundler is required but not installed",
        suggestions: &[
            "Run 'gem install bundler'",
            "Ensure your Ruby environment is properly configured",
        ],
    },
    PatternSpec {
        id: "timeout_error",
        regex: r"timed out|timeout|Operation timed out",
        category: "network",
        message: "Operation timed out",
        diagnosis: "A network operation or build step exceeded the timeout limit",
        suggestions: &[
            "Check your network connection",
            "Increase timeout settings if building large projects",
            "Try again - this may be a temporary issue",
        ],
    },
];

/// Known failure signatures, in match priority order.
pub static ERROR_PATTERNS: LazyLock<Vec<ErrorPattern>> = LazyLock::new(|| {
    PATTERN_SPECS
        .iter()
        .map(|spec| ErrorPattern {
            id: spec.id,
            pattern: RegexBuilder::new(spec.regex)
                .case_insensitive(true)
                .build()
                .expect("error pattern regex is valid"),
            category: spec.category,
            message: spec.message,
            diagnosis: spec.diagnosis,
            suggestions: spec.suggestions,
        })
        .collect()
});

/// Outcome of matching command output against [`ERROR_PATTERNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
    pub message: String,
    pub diagnosis: String,
    pub suggestions: Vec<String>,
    /// The diagnosed text, kept only when no pattern matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

impl Diagnosis {
    /// Human-readable header, explanation, and bulleted suggestions.
    pub fn render(&self) -> String {
        let bullets = self
            .suggestions
            .iter()
            .map(|s| format!("  - {s}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "{}\n\nDiagnosis: {}\n\nSuggestions:\n{}",
            self.message, self.diagnosis, bullets
        )
    }
}

/// Match `output` against the known failure signatures.
pub fn diagnose(output: &str) -> Diagnosis {
    if let Some(pattern) = ERROR_PATTERNS.iter().find(|p| p.pattern.is_match(output)) {
        tracing::debug!(pattern = pattern.id, "diagnosed failure");
        return Diagnosis {
            matched: true,
            pattern_id: Some(pattern.id),
            category: Some(pattern.category),
            message: pattern.message.to_string(),
            diagnosis: pattern.diagnosis.to_string(),
            suggestions: pattern.suggestions.iter().map(|s| s.to_string()).collect(),
            original: None,
        };
    }

    Diagnosis {
        matched: false,
        pattern_id: None,
        category: None,
        message: "Build or command failed".to_string(),
        diagnosis: "An unrecognized error occurred".to_string(),
        suggestions: vec![
            "Check the full error output below for details".to_string(),
            "Search for the error message online".to_string(),
        ],
        original: Some(output.to_string()),
    }
}

/// The last `max_chars` characters of `text`.
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    match text.char_indices().nth(count - max_chars) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// Diagnosis followed by the tail of each non-empty output stream.
pub fn failure_report(stdout: &str, stderr: &str) -> String {
    let combined = match (stdout.is_empty(), stderr.is_empty()) {
        (false, false) => format!("{stdout}\n{stderr}"),
        (true, _) => stderr.to_string(),
        (false, true) => stdout.to_string(),
    };

    let mut report = diagnose(&combined).render();
    for (label, stream) in [("stdout", stdout), ("stderr", stderr)] {
        let trimmed = stream.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        report.push_str(&format!(
            "\n\n--- {label} (last {OUTPUT_TAIL_CHARS} chars) ---\n{}",
            tail_chars(trimmed, OUTPUT_TAIL_CHARS)
        ));
    }
    report
}
