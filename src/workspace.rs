//! Repository working tree access with a single commit point.
//!
//! Commands read everything they need up front, build the new file contents
//! in memory as [`FileChange`]s and only then hand them to
//! [`Workspace::commit`]. A failure before the commit leaves the tree as it
//! was.
use log::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::Result;

/// New content for a file, relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub content: String,
}

/// Repository root on disk.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Content of a file, `None` when it does not exist.
    pub fn read_optional(&self, relative: &str) -> Result<Option<String>> {
        let path = self.path(relative);
        if !path.exists() {
            debug!("no file found for path: {}", path.display());
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Write every change whose content differs from what is on disk.
    /// Returns the paths actually written.
    pub fn commit(&self, changes: &[FileChange]) -> Result<Vec<String>> {
        let mut written = vec![];

        for change in changes.iter() {
            if self.read_optional(&change.path)?.as_deref()
                == Some(change.content.as_str())
            {
                debug!("unchanged: {}", change.path);
                continue;
            }

            let path = self.path(&change.path);
            if let Some(parent) = path.parent()
                && !parent.exists()
            {
                fs::create_dir_all(parent)?;
            }

            fs::write(&path, &change.content)?;
            info!("updated {}", change.path);
            written.push(change.path.clone());
        }

        Ok(written)
    }
}
