//! HEIC to JPEG transcoding through libheif's command-line decoder.

use crate::jpeg::transcode_file;
use crate::workspace::Workspace;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs an external libheif decoder and re-encodes its output as JPEG.
#[derive(Debug, Clone)]
pub struct HeifDecoder {
    tool: PathBuf,
}

impl HeifDecoder {
    /// Use the decoder at `tool`.
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    /// Locate a decoder, preferring `configured` over `PATH` lookup.
    pub fn discover(configured: Option<&Path>) -> Result<Self> {
        crate::tools::find_decoder(configured).map(Self::new)
    }

    /// Path of the decoder executable.
    pub fn tool(&self) -> &Path {
        &self.tool
    }

    fn tool_name(&self) -> String {
        self.tool
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.tool.display().to_string())
    }

    /// Decode HEIC bytes and encode the primary image as JPEG.
    ///
    /// When the source holds several top-level images only the first is
    /// loaded; the rest are never read. The quality is on the 1-100 scale,
    /// see [`crate::quality_percent`].
    pub async fn to_jpeg(&self, source: &[u8], quality: u8) -> Result<Vec<u8>> {
        if source.is_empty() {
            return Err(Error::InvalidInput("empty source file".to_string()));
        }

        let workspace = Workspace::new()?;
        tokio::fs::write(workspace.input(), source).await?;

        self.run(&workspace.input(), &workspace.output()).await?;

        let outputs = workspace.outputs()?;
        let Some(primary) = outputs.first().cloned() else {
            return Err(Error::NoOutput {
                tool: self.tool_name(),
            });
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "{} decoded {} image(s) in {}",
            self.tool_name(),
            outputs.len(),
            workspace.temp_dir().display()
        );

        // Image decode and JPEG encode are CPU bound
        let encoded = tokio::task::spawn_blocking(move || {
            let result = transcode_file(&primary, quality);
            drop(workspace);
            result
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))??;

        Ok(encoded)
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::trace!("Running {} {:?} {:?}", self.tool.display(), input, output);

        let result = Command::new(&self.tool)
            .arg(input)
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::tool_not_found(self.tool_name()));
            }
            Err(e) => return Err(Error::Io(e)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed(self.tool_name(), stderr.trim()));
        }

        Ok(())
    }
}
