//! # Artifacts
//!
//! Opaque handles to report artifacts and the store that resolves them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Handle to a produced report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(PathBuf);

impl ArtifactRef {
    /// Creates a reference to a filesystem path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The referenced path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Resolves artifact references.
pub trait ArtifactStore: Send + Sync + fmt::Debug {
    /// Returns true if the artifact still exists.
    fn exists(&self, artifact: &ArtifactRef) -> bool;
}

/// Artifacts stored as plain files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactStore;

impl ArtifactStore for FsArtifactStore {
    fn exists(&self, artifact: &ArtifactRef) -> bool {
        artifact.path().is_file()
    }
}
