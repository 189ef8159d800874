mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./heicdrop.toml", "~/.config/heicdrop/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Expand a leading `~` in every configured path
fn expand_paths(config: &mut Config) {
    config.output.dir = expand_tilde(&config.output.dir);
    if let Some(ref tool) = config.tools.heif_dec {
        config.tools.heif_dec = Some(expand_tilde(tool));
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.watch.poll_interval_ms == 0 {
        anyhow::bail!("watch.poll_interval_ms cannot be 0");
    }

    if config.output.dir.exists() && !config.output.dir.is_dir() {
        anyhow::bail!(
            "Output path exists but is not a directory: {:?}",
            config.output.dir
        );
    }

    if let Some(ref tool) = config.tools.heif_dec {
        if !tool.exists() {
            tracing::warn!("Configured decoder does not exist: {:?}", tool);
        }
    }

    Ok(())
}
