//! Native iOS project discovery.

use std::path::{Path, PathBuf};

/// Resolved locations inside the generated iOS project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosProjectPaths {
    /// Directory holding `Info.plist` and the `*.lproj` folders.
    pub res_dir: PathBuf,
    /// The Xcode project file (may not exist yet).
    pub pbxproj: PathBuf,
}

/// Locates the iOS resource directory under the project root.
///
/// Checks the capacitor-style layouts in order (`ios/App/App`, then
/// `ios/App`); the first one containing an `Info.plist` wins. Returns
/// `None` when no candidate matches, which skips the platform.
pub fn locate_ios_project(project_root: &Path) -> Option<IosProjectPaths> {
    let candidates = [
        project_root.join("ios").join("App").join("App"),
        project_root.join("ios").join("App"),
    ];
    for candidate in candidates {
        if candidate.join("Info.plist").is_file() {
            let pbxproj = candidate
                .parent()?
                .join("App.xcodeproj")
                .join("project.pbxproj");
            return Some(IosProjectPaths {
                res_dir: candidate,
                pbxproj,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prefers_the_nested_app_directory() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("ios/App/App");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Info.plist"), "<plist/>").unwrap();

        let paths = locate_ios_project(root.path()).unwrap();
        assert_eq!(paths.res_dir, nested);
        assert_eq!(
            paths.pbxproj,
            root.path().join("ios/App/App.xcodeproj/project.pbxproj")
        );
    }

    #[test]
    fn falls_back_to_the_flat_layout() {
        let root = TempDir::new().unwrap();
        let flat = root.path().join("ios/App");
        std::fs::create_dir_all(&flat).unwrap();
        std::fs::write(flat.join("Info.plist"), "<plist/>").unwrap();

        let paths = locate_ios_project(root.path()).unwrap();
        assert_eq!(paths.res_dir, flat);
        assert_eq!(
            paths.pbxproj,
            root.path().join("ios/App.xcodeproj/project.pbxproj")
        );
    }

    #[test]
    fn missing_project_yields_none() {
        let root = TempDir::new().unwrap();
        assert!(locate_ios_project(root.path()).is_none());
    }
}
