//! Collision-resistant scratch paths for downloaded artifacts.
//!
//! # Design
//! - Every allocation is a fresh 32-hex-character stem inside the scratch
//!   directory; strategies append their own extension.
//! - Cleanup works on the stem so partial outputs with unknown extensions are
//!   removed as well.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{FetchError, FetchResult};

/// Generator of unique scratch paths under a fixed directory.
#[derive(Debug, Clone)]
pub struct TempPaths {
    dir: Arc<PathBuf>,
}

impl TempPaths {
    /// Create a generator rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir.into()),
        }
    }

    /// Scratch directory used for allocations.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Allocate a new, unused path stem (no extension).
    #[must_use]
    pub fn allocate(&self) -> PathBuf {
        self.dir.join(Uuid::new_v4().simple().to_string())
    }

    /// Make sure the scratch directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Io`] when the directory cannot be created.
    pub async fn ensure_dir(&self) -> FetchResult<()> {
        tokio::fs::create_dir_all(self.dir.as_path())
            .await
            .map_err(|source| FetchError::io("temp.create_dir", self.dir.as_path(), source))
    }

    /// List files whose name is `<stem>.<anything>`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Io`] when the scratch directory cannot be read.
    pub async fn artifacts_for(&self, stem: &Path) -> FetchResult<Vec<PathBuf>> {
        let Some(prefix) = stem_prefix(stem) else {
            return Ok(Vec::new());
        };
        let mut entries = tokio::fs::read_dir(self.dir.as_path())
            .await
            .map_err(|source| FetchError::io("temp.read_dir", self.dir.as_path(), source))?;
        let mut matches = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| FetchError::io("temp.read_dir", self.dir.as_path(), source))?
        {
            let name = entry.file_name();
            if name.to_str().is_some_and(|name| name.starts_with(&prefix)) {
                matches.push(entry.path());
            }
        }
        matches.sort();
        Ok(matches)
    }

    /// Remove every artifact allocated under `stem`, logging failures.
    pub async fn purge(&self, stem: &Path) {
        match self.artifacts_for(stem).await {
            Ok(paths) => {
                for path in paths {
                    remove_quietly(&path).await;
                }
            }
            Err(err) => warn!(error = %err, stem = %stem.display(), "failed to scan temp artifacts"),
        }
    }
}

/// Remove `path`, ignoring files that are already gone.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed temp artifact"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(error = %err, path = %path.display(), "failed to remove temp artifact"),
    }
}

fn stem_prefix(stem: &Path) -> Option<String> {
    stem.file_name()
        .and_then(OsStr::to_str)
        .map(|name| format!("{name}."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_unique_hex_stems() {
        let temp = TempPaths::new("/tmp");
        let first = temp.allocate();
        let second = temp.allocate();
        assert_ne!(first, second);
        let name = first
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or_default();
        assert_eq!(name.len(), 32);
        assert!(name.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(first.parent(), Some(Path::new("/tmp")));
    }

    #[tokio::test]
    async fn purge_removes_only_matching_artifacts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let temp = TempPaths::new(dir.path());
        let stem = temp.allocate();
        let other = temp.allocate();

        let mp3 = stem.with_extension("mp3");
        let part = stem.with_extension("webm.part");
        let unrelated = other.with_extension("mp3");
        for path in [&mp3, &part, &unrelated] {
            tokio::fs::write(path, b"data").await?;
        }

        let found = temp.artifacts_for(&stem).await?;
        assert_eq!(found.len(), 2);

        temp.purge(&stem).await;
        assert!(!mp3.exists());
        assert!(!part.exists());
        assert!(unrelated.exists());
        Ok(())
    }
}
