//! Pre-flight validation for fastlane builds.
//!
//! The validators run before any build process is spawned to catch
//! problems early. They check:
//!
//! - **Environment**: required variables are set (unset = error, empty = warning)
//! - **Tools**: required executables resolve via `which`
//! - **Project**: a Fastfile exists for the platform and declares the lane
//!
//! # Example
//!
//! ```ignore
//! use fastlane_kernel::validator::{PreflightContext, run_preflight};
//! use fastlane_kernel::{Platform, SystemRunner};
//!
//! let ctx = PreflightContext::new()
//!     .project("/path/to/app")
//!     .platform(Platform::Ios)
//!     .lane("build")
//!     .tools(["fastlane", "xcodebuild"]);
//! let result = run_preflight(&ctx, &SystemRunner).await;
//!
//! if !result.valid {
//!     eprintln!("{}", result.format_issues());
//! }
//! ```

mod environment;
mod issue;
mod preflight;
mod project;
mod tools;

pub use environment::{validate_environment, validate_environment_with};
pub use issue::{IssueCode, IssueLevel, ValidationIssue, ValidationResult};
pub use preflight::{Preflight, PreflightContext, run_preflight};
pub use project::validate_project;
pub use tools::{TOOL_LOOKUP_TIMEOUT, install_hint, validate_tools};
