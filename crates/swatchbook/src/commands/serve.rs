//! Component library server command.

use std::path::Path;

use anyhow::Result;
use swatchbook_render::ReloadMode;
use swatchbook_server::Server;

use crate::config::load_config;

/// Command-line overrides for the server.
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub watch: bool,
    pub open: bool,
}

/// Run the serve command.
pub async fn run(config_path: &Path, options: ServeOptions) -> Result<()> {
    let mut config = load_config(config_path)?.into_server_config();

    if let Some(port) = options.port {
        config.port = port;
    }
    if let Some(host) = options.host {
        config.host = host;
    }
    if options.watch {
        config.reload = ReloadMode::Watch;
    }
    config.open = options.open;

    if !config.components_dir.is_dir() {
        tracing::warn!(
            "Components directory {} not found. Run 'swatchbook init' to scaffold one.",
            config.components_dir.display()
        );
    }

    Server::new(config).start().await?;

    Ok(())
}
