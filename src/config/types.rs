use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory converted JPEG files are saved into
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchConfig {
    /// How long a dropped file must stay unchanged before it is picked up
    #[serde(default = "default_settle_time")]
    pub settle_time_secs: u64,

    /// How often pending drops are checked for having settled
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_settle_time() -> u64 {
    2
}

fn default_poll_interval() -> u64 {
    500
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            settle_time_secs: default_settle_time(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit path to `heif-dec` or `heif-convert`; looked up on PATH if unset
    #[serde(default)]
    pub heif_dec: Option<PathBuf>,
}
