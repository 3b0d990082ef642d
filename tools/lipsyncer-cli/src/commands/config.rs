//! Show or write the application config.

use std::path::Path;

use lipsyncer_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, path: Option<&Path>, init: bool) -> anyhow::Result<()> {
    if init {
        let target = path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        if target.exists() {
            anyhow::bail!("{} already exists", target.display());
        }

        match path {
            Some(path) => config.save_to(path),
            None => config.save(),
        }
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        println!("Wrote config to {}", target.display());
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
