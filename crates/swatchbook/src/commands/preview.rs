//! Render a single component example.

use std::path::Path;

use anyhow::Result;
use swatchbook_render::build_preview;
use swatchbook_server::AppState;

use crate::config::load_config;

/// Render `component`'s example and print the markup.
pub fn run(config_path: &Path, component: &str, example: Option<&str>) -> Result<()> {
    let state = AppState::new(load_config(config_path)?.into_server_config());

    let preview = build_preview(&state.templates, &state.library, component, example)?;
    tracing::debug!("Rendered {} example {}", component, preview.example);
    println!("{}", preview.markup);

    Ok(())
}
