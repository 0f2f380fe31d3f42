use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use checkrunner_core::Config;

/// Load `explicit` when given, otherwise the nearest config file above
/// `start_dir`
pub fn load_config(explicit: Option<&Path>, start_dir: &Path) -> Result<Config> {
    match explicit {
        Some(path) => {
            debug!("Using config file {:?}", path);
            Config::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Config::load_nearest(start_dir)
            .with_context(|| format!("Failed to load config for {}", start_dir.display())),
    }
}
