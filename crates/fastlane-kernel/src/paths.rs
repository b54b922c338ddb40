//! Fastfile location for the two supported project layouts.
//!
//! | Layout | Fastfile | fastlane runs from |
//! |--------|----------|--------------------|
//! | nested (React Native style) | `<project>/<platform>/fastlane/Fastfile` | `<project>/<platform>` |
//! | flat (native style) | `<project>/fastlane/Fastfile` | `<project>` |

use std::path::{Path, PathBuf};

use crate::platform::Platform;

/// Directory name fastlane keeps its configuration in.
pub const FASTLANE_DIR: &str = "fastlane";

/// File name of the lane definitions.
pub const FASTFILE: &str = "Fastfile";

/// `<project>/<platform>/fastlane`.
pub fn nested_config_dir(project: &Path, platform: Platform) -> PathBuf {
    project.join(platform.as_str()).join(FASTLANE_DIR)
}

/// `<project>/fastlane`.
pub fn flat_config_dir(project: &Path) -> PathBuf {
    project.join(FASTLANE_DIR)
}

/// Fastfile path inside a fastlane configuration directory.
pub fn fastfile_in(config_dir: &Path) -> PathBuf {
    config_dir.join(FASTFILE)
}

/// Find the fastlane directory that holds a Fastfile.
///
/// With a platform the nested layout wins when it has a Fastfile; the flat
/// layout is the fallback. Without a platform only the flat layout is checked.
pub fn find_config_dir(project: &Path, platform: Option<Platform>) -> Option<PathBuf> {
    if let Some(platform) = platform {
        let nested = nested_config_dir(project, platform);
        if fastfile_in(&nested).is_file() {
            return Some(nested);
        }
    }

    let flat = flat_config_dir(project);
    if fastfile_in(&flat).is_file() {
        return Some(flat);
    }

    None
}

/// Candidate Fastfile paths in lookup order, for error messages.
pub fn candidate_fastfiles(project: &Path, platform: Option<Platform>) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(platform) = platform {
        candidates.push(fastfile_in(&nested_config_dir(project, platform)));
    }
    candidates.push(fastfile_in(&flat_config_dir(project)));
    candidates
}

/// Working directory for running fastlane for `platform`.
///
/// Always returns a directory: the platform subdirectory when it carries a
/// Fastfile, otherwise the project root, even if no Fastfile exists there.
pub fn find_execution_dir(project: &Path, platform: Platform) -> PathBuf {
    if fastfile_in(&nested_config_dir(project, platform)).is_file() {
        return project.join(platform.as_str());
    }
    project.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_fastfile(root: &Path, rel: &str) {
        let dir = root.join(rel);
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join(FASTFILE), "lane :build do\nend\n").expect("write");
    }

    #[test]
    fn prefers_nested_layout() {
        let tmp = TempDir::new().expect("tempdir");
        write_fastfile(tmp.path(), "ios/fastlane");
        write_fastfile(tmp.path(), "fastlane");

        let found = find_config_dir(tmp.path(), Some(Platform::Ios));
        assert_eq!(found, Some(tmp.path().join("ios").join("fastlane")));
    }

    #[test]
    fn falls_back_to_flat_layout() {
        let tmp = TempDir::new().expect("tempdir");
        write_fastfile(tmp.path(), "fastlane");

        let found = find_config_dir(tmp.path(), Some(Platform::Android));
        assert_eq!(found, Some(tmp.path().join("fastlane")));
    }

    #[test]
    fn without_platform_only_flat_counts() {
        let tmp = TempDir::new().expect("tempdir");
        write_fastfile(tmp.path(), "ios/fastlane");

        assert_eq!(find_config_dir(tmp.path(), None), None);
    }

    #[test]
    fn fastlane_dir_without_fastfile_is_absent() {
        let tmp = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(tmp.path().join("ios/fastlane")).expect("mkdir");

        assert_eq!(find_config_dir(tmp.path(), Some(Platform::Ios)), None);
    }

    #[test]
    fn execution_dir_prefers_platform_subdirectory() {
        let tmp = TempDir::new().expect("tempdir");
        write_fastfile(tmp.path(), "ios/fastlane");
        write_fastfile(tmp.path(), "fastlane");

        assert_eq!(
            find_execution_dir(tmp.path(), Platform::Ios),
            tmp.path().join("ios")
        );
    }

    #[test]
    fn execution_dir_defaults_to_root() {
        let tmp = TempDir::new().expect("tempdir");
        assert_eq!(find_execution_dir(tmp.path(), Platform::Android), tmp.path());

        write_fastfile(tmp.path(), "fastlane");
        assert_eq!(find_execution_dir(tmp.path(), Platform::Android), tmp.path());
    }

    #[test]
    fn candidates_depend_on_platform() {
        let root = Path::new("/project");
        assert_eq!(
            candidate_fastfiles(root, Some(Platform::Ios)),
            vec![
                PathBuf::from("/project/ios/fastlane/Fastfile"),
                PathBuf::from("/project/fastlane/Fastfile"),
            ]
        );
        assert_eq!(
            candidate_fastfiles(root, None),
            vec![PathBuf::from("/project/fastlane/Fastfile")]
        );
    }
}
