//! Directory resolution port

use std::path::PathBuf;

use crate::domain::recording::Directory;

/// Port for resolving directory categories to absolute paths
pub trait DirectoryResolver: Send + Sync {
    /// Base directory for a category, or `None` if the platform has none
    fn base_dir(&self, directory: Directory) -> Option<PathBuf>;
}
