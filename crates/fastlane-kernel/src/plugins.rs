//! Static catalog of commonly used fastlane plugins.

use serde::Serialize;

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: &'static str,
    pub description: &'static str,
    /// Keywords that suggest a project could use this plugin.
    pub signals: &'static [&'static str],
    /// Actions the plugin adds.
    pub capabilities: &'static [&'static str],
    pub homepage: Option<&'static str>,
}

impl PluginInfo {
    /// The Gemfile line that installs this plugin.
    pub fn installation(&self) -> String {
        format!("Add to your Gemfile: gem '{}'", self.name)
    }

    fn matches(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self.description.to_lowercase().contains(query_lower)
            || self
                .signals
                .iter()
                .any(|s| s.to_lowercase().contains(query_lower))
    }
}

pub const PLUGIN_CATALOG: &[PluginInfo] = &[
    PluginInfo {
        name: "fastlane-plugin-firebase_app_distribution",
        description: "Distribute builds via Firebase App Distribution",
        signals: &["firebase", "crashlytics", "google-services"],
        capabilities: &["firebase_app_distribution"],
        homepage: Some("https://github.com/fastlane/fastlane-plugin-firebase_app_distribution"),
    },
    PluginInfo {
        name: "fastlane-plugin-appcenter",
        description: "Distribute builds via Microsoft AppCenter",
        signals: &["appcenter", "hockeyapp"],
        capabilities: &["appcenter_upload"],
        homepage: Some("https://github.com/microsoft/fastlane-plugin-appcenter"),
    },
    PluginInfo {
        name: "fastlane-plugin-versioning",
        description: "Manage app version and build numbers",
        signals: &["version", "build_number"],
        capabilities: &["increment_version_number", "get_version_number"],
        homepage: Some("https://github.com/SiarheiFeworks/fastlane-plugin-versioning"),
    },
    PluginInfo {
        name: "fastlane-plugin-badge",
        description: "Add badges to app icons",
        signals: &["badge", "icon"],
        capabilities: &["add_badge"],
        homepage: Some("https://github.com/HazAT/fastlane-plugin-badge"),
    },
    PluginInfo {
        name: "fastlane-plugin-xcconfig",
        description: "Read and update xcconfig files",
        signals: &["xcconfig", "configuration"],
        capabilities: &["read_xcconfig", "update_xcconfig"],
        homepage: Some("https://github.com/sovanna/fastlane-plugin-xcconfig"),
    },
    PluginInfo {
        name: "fastlane-plugin-emergetools",
        description: "Upload builds to Emerge Tools for size analysis",
        signals: &["emerge", "size", "binary"],
        capabilities: &["emerge_upload"],
        homepage: Some("https://github.com/EmergeTools/fastlane-plugin-emerge"),
    },
    PluginInfo {
        name: "fastlane-plugin-sentry",
        description: "Upload dSYMs to Sentry",
        signals: &["sentry", "dsym", "crash"],
        capabilities: &["sentry_upload_dsym"],
        homepage: Some("https://github.com/getsentry/sentry-fastlane-plugin"),
    },
    PluginInfo {
        name: "fastlane-plugin-aws_s3",
        description: "Upload builds to AWS S3",
        signals: &["s3", "aws", "bucket"],
        capabilities: &["aws_s3"],
        homepage: Some("https://github.com/joshdholtz/fastlane-plugin-aws_s3"),
    },
    PluginInfo {
        name: "fastlane-plugin-slack_bot",
        description: "Post messages to Slack using bot tokens",
        signals: &["slack", "notification"],
        capabilities: &["slack_bot"],
        homepage: Some("https://github.com/aspect-app/fastlane-plugin-slack_bot"),
    },
    PluginInfo {
        name: "fastlane-plugin-test_center",
        description: "Advanced testing utilities",
        signals: &["test", "xctest", "parallel"],
        capabilities: &["multi_scan", "collate_junit_reports"],
        homepage: Some("https://github.com/lyndsey-ferguson/fastlane-plugin-test_center"),
    },
];

/// Case-insensitive substring search over name, description, and signals.
pub fn search_plugins(query: &str) -> Vec<PluginInfo> {
    let query_lower = query.to_lowercase();
    PLUGIN_CATALOG
        .iter()
        .filter(|p| p.matches(&query_lower))
        .copied()
        .collect()
}

/// Exact lookup by plugin name.
pub fn get_plugin_info(name: &str) -> Option<PluginInfo> {
    PLUGIN_CATALOG.iter().find(|p| p.name == name).copied()
}
