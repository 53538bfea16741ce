//! Directory resolution using the platform's standard locations

use std::path::PathBuf;

use tracing::warn;

use crate::application::ports::DirectoryResolver;
use crate::domain::recording::Directory;

/// Folder created under the per-user cache and data directories
const APP_DIR: &str = "voice-recorder";

/// Maps directory categories onto `dirs` locations:
/// DOCUMENTS to the documents folder, LIBRARY and CACHE to an
/// application folder under the data and cache directories.
pub struct PlatformDirectories {
    root: Option<PathBuf>,
}

impl PlatformDirectories {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve every category under `root` instead (`root/documents`, ...)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn locate(&self, directory: Directory) -> Option<PathBuf> {
        if let Some(root) = &self.root {
            return Some(root.join(directory.as_str().to_lowercase()));
        }
        match directory {
            Directory::Documents => dirs::document_dir(),
            Directory::Library => dirs::data_dir().map(|dir| dir.join(APP_DIR)),
            Directory::Cache => dirs::cache_dir().map(|dir| dir.join(APP_DIR)),
        }
    }
}

impl Default for PlatformDirectories {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryResolver for PlatformDirectories {
    /// Resolves and creates the directory. `None` if either step fails.
    fn base_dir(&self, directory: Directory) -> Option<PathBuf> {
        let path = self.locate(directory)?;
        if !path.is_dir() {
            if let Err(e) = std::fs::create_dir_all(&path) {
                warn!(path = %path.display(), error = %e, "Cannot create base directory");
                return None;
            }
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rooted_directories_are_created() {
        let root = TempDir::new().unwrap();
        let dirs = PlatformDirectories::with_root(root.path());

        let cache = dirs.base_dir(Directory::Cache).unwrap();
        assert_eq!(cache, root.path().join("cache"));
        assert!(cache.is_dir());
        assert_ne!(dirs.base_dir(Directory::Library), Some(cache));
    }

    #[test]
    fn uncreatable_directory_is_none() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        let dirs = PlatformDirectories::with_root(&blocker);
        assert!(dirs.base_dir(Directory::Documents).is_none());
    }

    #[test]
    fn app_folders_are_namespaced() {
        let dirs = PlatformDirectories::new();
        if let Some(path) = dirs.locate(Directory::Cache) {
            assert!(path.ends_with(APP_DIR));
        }
    }
}
