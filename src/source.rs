//! Handles to candidate input files.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use heicdrop_common::paths::sniff_media_type;
use heicdrop_common::DedupKey;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Bytes read from the head of a file to guess its media type.
const SNIFF_LEN: usize = 64;

/// Where a file's bytes come from.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Read lazily from disk when the conversion starts.
    Path(PathBuf),
    /// Already in memory.
    Memory(Bytes),
}

/// A candidate input file as handed over by a trigger source.
///
/// Handles are immutable once built; the queue only ever reads them.
#[derive(Debug, Clone, Serialize)]
pub struct FileHandle {
    name: String,
    media_type: Option<String>,
    /// Milliseconds since the Unix epoch.
    last_modified: i64,
    #[serde(skip)]
    source: ByteSource,
}

impl FileHandle {
    /// Build a handle around bytes that are already loaded.
    pub fn from_memory(
        name: impl Into<String>,
        media_type: Option<String>,
        last_modified: i64,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type,
            last_modified,
            source: ByteSource::Memory(bytes.into()),
        }
    }

    /// Build a handle for a file on disk.
    ///
    /// The declared media type is sniffed from the file signature and the
    /// last-modified time comes from filesystem metadata (0 when the platform
    /// does not report one).
    pub async fn from_path(path: &Path) -> heicdrop_common::Result<Self> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                heicdrop_common::Error::not_found(path.display().to_string())
            } else {
                heicdrop_common::Error::Io(e)
            }
        })?;

        if !metadata.is_file() {
            return Err(heicdrop_common::Error::invalid_input(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                heicdrop_common::Error::invalid_input(format!(
                    "Path has no file name: {}",
                    path.display()
                ))
            })?;

        let last_modified = metadata
            .modified()
            .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
            .unwrap_or(0);

        let header = read_header(path).await?;
        let media_type = sniff_media_type(&header).map(str::to_string);

        Ok(Self {
            name,
            media_type,
            last_modified,
            source: ByteSource::Path(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    /// The (name, last-modified) pair used to suppress duplicate adds.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.name.clone(), self.last_modified)
    }

    /// Load the file's full contents.
    pub async fn read(&self) -> std::io::Result<Bytes> {
        match &self.source {
            ByteSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
            ByteSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

async fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buf = vec![0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heic_header() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&24u32.to_be_bytes());
        buf.extend_from_slice(b"ftypheic");
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(b"mif1heic");
        buf.extend_from_slice(&[0u8; 32]);
        buf
    }

    #[tokio::test]
    async fn test_from_memory() {
        let handle = FileHandle::from_memory("a.heic", None, 7, b"abc".to_vec());
        assert_eq!(handle.name(), "a.heic");
        assert_eq!(handle.media_type(), None);
        assert_eq!(handle.dedup_key(), DedupKey::new("a.heic", 7));
        assert_eq!(handle.read().await.unwrap(), Bytes::from_static(b"abc"));
    }

    #[tokio::test]
    async fn test_from_path_sniffs_heic() {
        let dir = tempfile::tempdir().unwrap();
        // no extension, recognised by content only
        let path = dir.path().join("IMG_0001");
        std::fs::write(&path, heic_header()).unwrap();

        let handle = FileHandle::from_path(&path).await.unwrap();
        assert_eq!(handle.name(), "IMG_0001");
        assert_eq!(handle.media_type(), Some("image/heic"));
        assert!(handle.last_modified() > 0);
        assert_eq!(handle.read().await.unwrap().len(), heic_header().len());
    }

    #[tokio::test]
    async fn test_from_path_other_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let handle = FileHandle::from_path(&path).await.unwrap();
        assert_eq!(handle.media_type(), None);
    }

    #[tokio::test]
    async fn test_from_path_missing() {
        let err = FileHandle::from_path(Path::new("/nonexistent/photo.heic"))
            .await
            .unwrap_err();
        assert!(matches!(err, heicdrop_common::Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_from_path_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileHandle::from_path(dir.path()).await.unwrap_err();
        assert!(matches!(err, heicdrop_common::Error::InvalidInput(_)));
    }
}
