//! External decoder detection.
//!
//! HEIC decoding is delegated to libheif's command-line decoder. Newer
//! libheif releases ship it as `heif-dec`; older ones as `heif-convert`.
//! Both accept `<input> <output>` and pick the output format from the
//! output file's extension.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Decoder executables, in order of preference.
pub const DECODER_CANDIDATES: &[&str] = &["heif-dec", "heif-convert"];

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use heicdrop_codec::check_tool;
///
/// let info = check_tool("heif-dec");
/// if info.available {
///     println!("heif-dec version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    check_tool_with_arg(name, "--version")
}

/// Check if a tool is available using a custom version argument.
fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let result = Command::new(name).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() => {
            // libheif tools print their version on stdout, some builds on stderr
            let text = if output.stdout.is_empty() {
                &output.stderr
            } else {
                &output.stdout
            };
            let version = String::from_utf8_lossy(text)
                .lines()
                .next()
                .map(|s| s.trim().to_string());

            let path = which::which(name).ok();

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check every known decoder.
pub fn check_tools() -> Vec<ToolInfo> {
    DECODER_CANDIDATES.iter().map(|name| check_tool(name)).collect()
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Resolve the decoder to use.
///
/// A configured path wins and must exist. Otherwise the first entry of
/// [`DECODER_CANDIDATES`] found on `PATH` is used.
pub fn find_decoder(config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::file_not_found(path));
    }

    DECODER_CANDIDATES
        .iter()
        .find_map(|name| require_tool(name).ok())
        .ok_or_else(|| Error::tool_not_found(DECODER_CANDIDATES.join(" or ")))
}
