//! Lane discovery from Fastfile text.
//!
//! This is a line scanner, not a Ruby parser. It understands the
//! conventional layout fastlane generates:
//!
//! ```ruby
//! platform :ios do
//!   desc "Build the app"
//!   lane :build do
//!     gym
//!   end
//!
//!   private_lane :_helper do
//!   end
//! end
//! ```
//!
//! Two pieces of state are carried between lines: the platform block
//! currently open and the most recent `desc`. Block depth is not tracked,
//! so any bare `end` seen while a platform is open closes that platform.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::platform::Platform;

static PLATFORM_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^platform\s+:(\w+)\s+do\s*$").expect("platform regex is valid")
});

static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^desc\s+(?:"([^"]+)"|'([^']+)')\s*$"#)
        .expect("desc regex is valid")
});

static LANE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(private_lane|lane)\s+:(\w+)\s+do").expect("lane regex is valid")
});

/// One lane declaration found in a Fastfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneRecord {
    pub name: String,
    /// Platform block the lane was declared in; `None` for top-level lanes.
    pub platform: Option<Platform>,
    pub description: Option<String>,
    /// Declared with `private_lane`, or named with a leading underscore.
    pub is_private: bool,
}

/// Scan Fastfile content and return its lanes in declaration order.
///
/// Never fails: text without recognizable lane declarations yields an
/// empty list.
pub fn parse_lanes(content: &str) -> Vec<LaneRecord> {
    let mut lanes = Vec::new();
    let mut current_platform: Option<Platform> = None;
    let mut pending_description: Option<String> = None;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(caps) = PLATFORM_OPEN.captures(trimmed) {
            // Unknown platforms leave the current block untouched.
            if let Ok(platform) = caps[1].parse::<Platform>() {
                current_platform = Some(platform);
            }
            continue;
        }

        if let Some(caps) = DESCRIPTION.captures(trimmed) {
            pending_description = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string());
            continue;
        }

        if let Some(caps) = LANE_DECL.captures(trimmed) {
            let name = caps[2].to_string();
            let is_private = &caps[1] == "private_lane" || name.starts_with('_');
            lanes.push(LaneRecord {
                name,
                platform: current_platform,
                description: pending_description.take(),
                is_private,
            });
            continue;
        }

        if trimmed == "end" && current_platform.is_some() {
            current_platform = None;
        }
    }

    tracing::debug!(lanes = lanes.len(), "parsed Fastfile");
    lanes
}

/// Literal check for a `lane :<name>` or `private_lane :<name>` declaration.
///
/// Deliberately textual: it does not go through [`parse_lanes`], so it also
/// matches declarations the scanner would not recognize.
pub fn declares_lane(content: &str, lane: &str) -> bool {
    content.contains(&format!("lane :{lane}")) || content.contains(&format!("private_lane :{lane}"))
}

/// Whether the Fastfile opens a `platform :<platform> do` block anywhere.
///
/// Independent of the lane scanner's block tracking, so lanes declared after
/// an inner `end` still count as belonging to a platform-scoped Fastfile.
pub fn declares_platform(content: &str, platform: Platform) -> bool {
    content.lines().any(|line| {
        PLATFORM_OPEN
            .captures(line.trim())
            .is_some_and(|caps| &caps[1] == platform.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
platform :ios do
  desc "Build the app"
  lane :build do
    gym
  end

  desc "Deploy to TestFlight"
  lane :deploy do
    pilot
  end

  private_lane :_helper do
    puts "helper"
  end
end

platform :android do
  desc 'Build Android app'
  lane :build do
    gradle(task: "assembleRelease")
  end
end
"#;

    #[test]
    fn parses_platform_blocks() {
        let lanes = parse_lanes(SAMPLE);
        let summary: Vec<_> = lanes
            .iter()
            .map(|l| (l.name.as_str(), l.platform))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("build", Some(Platform::Ios)),
                // The `end` of `lane :build` closed the ios block.
                ("deploy", None),
                ("_helper", None),
                ("build", Some(Platform::Android)),
            ]
        );
    }

    #[test]
    fn attaches_descriptions_with_either_quote() {
        let lanes = parse_lanes(SAMPLE);
        assert_eq!(lanes[0].description.as_deref(), Some("Build the app"));
        assert_eq!(lanes[1].description.as_deref(), Some("Deploy to TestFlight"));
        assert_eq!(lanes[2].description, None);
        assert_eq!(lanes[3].description.as_deref(), Some("Build Android app"));
    }

    #[test]
    fn marks_private_lanes() {
        let content = "private_lane :cleanup do\nend\nlane :_internal do\nend\nlane :public do\nend\n";
        let lanes = parse_lanes(content);
        let flags: Vec<_> = lanes.iter().map(|l| l.is_private).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn top_level_lanes_have_no_platform() {
        let lanes = parse_lanes("lane :shared do\n  puts 'hi'\nend\n");
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].platform, None);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_lanes("").is_empty());
        assert!(parse_lanes("# just a comment\n\n").is_empty());
    }

    #[test]
    fn unknown_platform_keeps_current_block() {
        let content = "platform :ios do\nplatform :mac do\nlane :a do\n";
        let lanes = parse_lanes(content);
        assert_eq!(lanes[0].platform, Some(Platform::Ios));
    }

    #[test]
    fn dangling_description_attaches_to_next_lane() {
        let content = "desc \"Orphan\"\nfoo = 1\n\nlane :later do\nend\nlane :after do\nend\n";
        let lanes = parse_lanes(content);
        assert_eq!(lanes[0].description.as_deref(), Some("Orphan"));
        assert_eq!(lanes[1].description, None);
    }

    #[test]
    fn latest_description_wins() {
        let content = "desc \"first\"\ndesc \"second\"\nlane :build do\nend\n";
        let lanes = parse_lanes(content);
        assert_eq!(lanes[0].description.as_deref(), Some("second"));
    }

    #[test]
    fn comments_are_transparent() {
        let content = "platform :ios do\n  desc \"Build\"\n  # lane :commented do\n  lane :build do\n";
        let lanes = parse_lanes(content);
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].description.as_deref(), Some("Build"));
        assert_eq!(lanes[0].platform, Some(Platform::Ios));
    }

    #[test]
    fn nested_end_closes_platform_early() {
        // The first `end` closes the lane body in Ruby, but the scanner
        // treats it as closing the platform block.
        let content = "platform :ios do\nlane :a do\nend\nlane :b do\nend\nend\n";
        let lanes = parse_lanes(content);
        assert_eq!(lanes[0].platform, Some(Platform::Ios));
        assert_eq!(lanes[1].platform, None);
    }

    #[test]
    fn declares_platform_sees_every_block() {
        assert!(declares_platform(SAMPLE, Platform::Ios));
        assert!(declares_platform(SAMPLE, Platform::Android));
        assert!(!declares_platform("lane :build do\nend\n", Platform::Ios));
        // A lane the scanner places outside the block still lives in a
        // platform-scoped Fastfile.
        let content = "platform :ios do\nlane :a do\nend\nlane :b do\nend\nend\n";
        assert_eq!(parse_lanes(content)[1].platform, None);
        assert!(declares_platform(content, Platform::Ios));
        assert!(!declares_platform(content, Platform::Android));
    }

    #[test]
    fn declares_lane_is_literal() {
        let content = "lane :build do\nend\nprivate_lane :sign do\nend\n";
        assert!(declares_lane(content, "build"));
        assert!(declares_lane(content, "sign"));
        assert!(!declares_lane(content, "deploy"));
        // Prefix matches count: "lane :build" contains "lane :bui".
        assert!(declares_lane(content, "bui"));
    }
}
