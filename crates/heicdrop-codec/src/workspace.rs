//! Scratch directory for a single decode.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const INPUT_NAME: &str = "source.heic";
const OUTPUT_STEM: &str = "decoded";
const OUTPUT_EXTENSION: &str = "png";

/// Temporary directory holding the source bytes and the decoder's output.
///
/// The decoder writes `decoded.png` for a single image. When a file holds
/// several top-level images it writes `decoded-1.png`, `decoded-2.png`, ...
/// instead. Everything is removed when the workspace is dropped.
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("heicdrop-")
            .map_err(|e| Error::Workspace(e.to_string()))?;
        Ok(Self { temp_dir })
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path the source bytes are written to.
    pub fn input(&self) -> PathBuf {
        self.temp_dir.path().join(INPUT_NAME)
    }

    /// Path handed to the decoder as its output.
    pub fn output(&self) -> PathBuf {
        self.temp_dir
            .path()
            .join(format!("{}.{}", OUTPUT_STEM, OUTPUT_EXTENSION))
    }

    /// Decoded images, primary first.
    ///
    /// Numbered outputs are ordered by their index, not lexically, so
    /// `decoded-10.png` sorts after `decoded-2.png`.
    pub fn outputs(&self) -> Result<Vec<PathBuf>> {
        let single = self.output();
        if single.exists() {
            return Ok(vec![single]);
        }

        let prefix = format!("{}-", OUTPUT_STEM);
        let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(self.temp_dir.path())? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(OUTPUT_EXTENSION) {
                continue;
            }
            let index = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix(&prefix))
                .and_then(|n| n.parse::<u32>().ok());
            if let Some(index) = index {
                numbered.push((index, path));
            }
        }

        numbered.sort_by_key(|(index, _)| *index);
        Ok(numbered.into_iter().map(|(_, path)| path).collect())
    }
}
