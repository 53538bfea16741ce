//! Recording target options

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidDirectoryError;

/// Base directory category for recorded files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Directory {
    Cache,
    Library,
    #[default]
    Documents,
}

impl Directory {
    /// All categories in declaration order
    pub const ALL: [Directory; 3] = [Self::Cache, Self::Library, Self::Documents];

    /// Get the wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "CACHE",
            Self::Library => "LIBRARY",
            Self::Documents => "DOCUMENTS",
        }
    }

    /// Lenient lookup used by the bridge: anything that is not a known
    /// category resolves to `Documents`.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Directory {
    type Err = InvalidDirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CACHE" => Ok(Self::Cache),
            "LIBRARY" => Ok(Self::Library),
            "DOCUMENTS" => Ok(Self::Documents),
            _ => Err(InvalidDirectoryError {
                input: s.to_string(),
            }),
        }
    }
}

/// Where a recording should be written.
///
/// The sub-directory is stored normalized: leading and trailing `/` are
/// trimmed and an empty result means "no sub-directory".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordOptions {
    directory: Directory,
    sub_directory: Option<String>,
}

impl RecordOptions {
    /// Create options for a directory category
    pub fn new(directory: Directory) -> Self {
        Self {
            directory,
            sub_directory: None,
        }
    }

    /// Set the sub-directory (normalized)
    pub fn with_sub_directory(mut self, sub_directory: impl AsRef<str>) -> Self {
        self.sub_directory = normalize_sub_directory(sub_directory.as_ref());
        self
    }

    /// The directory category
    pub fn directory(&self) -> Directory {
        self.directory
    }

    /// The normalized sub-directory, if any
    pub fn sub_directory(&self) -> Option<&str> {
        self.sub_directory.as_deref()
    }
}

/// Trim leading/trailing path separators; `None` when nothing is left.
pub fn normalize_sub_directory(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
