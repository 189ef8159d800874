//! The save capability.

use async_trait::async_trait;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Upper bound on `name (n).ext` attempts before giving up.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// A failed save.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SaveError {
    message: String,
}

impl SaveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Hands converted bytes to the user under a suggested file name.
#[async_trait]
pub trait Saver: Send + Sync {
    async fn save(&self, bytes: Bytes, suggested_name: &str) -> Result<(), SaveError>;
}

/// Saves into a directory the way a browser saves downloads.
///
/// Existing files are never overwritten: if `photo.jpeg` is taken the output
/// becomes `photo (1).jpeg`, then `photo (2).jpeg`, and so on. Each file is
/// written to a temporary name first and moved into place, so a partially
/// written image is never visible under its final name.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Saver for DirectorySaver {
    async fn save(&self, bytes: Bytes, suggested_name: &str) -> Result<(), SaveError> {
        if suggested_name.is_empty() || suggested_name.contains(['/', '\\']) {
            return Err(SaveError::new(format!(
                "Invalid output file name: {:?}",
                suggested_name
            )));
        }

        let dir = self.dir.clone();
        let name = suggested_name.to_string();
        let saved = tokio::task::spawn_blocking(move || write_unique(&dir, &name, &bytes))
            .await
            .map_err(|e| SaveError::new(format!("Save task failed: {}", e)))??;

        tracing::info!("Saved {}", saved.display());
        Ok(())
    }
}

fn write_unique(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, SaveError> {
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = dir.join(numbered_name(name, attempt));
        match file.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                file = e.file;
            }
            Err(e) => return Err(e.error.into()),
        }
    }

    Err(SaveError::new(format!(
        "No free file name for {} in {}",
        name,
        dir.display()
    )))
}

/// `photo.jpeg` -> `photo (n).jpeg`, with `n = 0` meaning the name unchanged.
fn numbered_name(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 => format!("{} ({}){}", &name[..idx], n, &name[idx..]),
        _ => format!("{} ({})", name, n),
    }
}
