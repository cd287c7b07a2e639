//! Catalog command.

use std::path::Path;

use anyhow::{Context, Result};
use swatchbook_meta::catalog;

use crate::config::load_config;

/// Print the catalog of the components (or examples) directory as JSON.
pub fn run(config_path: &Path, examples: bool) -> Result<()> {
    let config = load_config(config_path)?.into_server_config();
    let root = if examples {
        &config.examples_dir
    } else {
        &config.components_dir
    };

    let tree = catalog(root)?;
    let json = serde_json::to_string_pretty(&tree).context("Failed to serialize catalog")?;
    println!("{}", json);

    Ok(())
}
