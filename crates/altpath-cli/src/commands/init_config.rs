//! `init-config` command: write a default configuration file.

use std::path::Path;

use anyhow::{bail, Context, Result};

use altpath_lib::EngineConfig;

/// Write `EngineConfig::default()` to `path`, refusing to clobber without `force`.
pub fn handle_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; use --force to overwrite",
            path.display()
        );
    }
    EngineConfig::default()
        .save(path)
        .with_context(|| format!("failed to write configuration to {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
