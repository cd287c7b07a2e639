//! Configuration file (swatchbook.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use swatchbook_render::ReloadMode;
use swatchbook_server::ServerConfig;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_components")]
    pub components: String,
    #[serde(default = "default_examples")]
    pub examples: String,
    /// Layout overrides, searched before examples and components
    pub views: Option<String>,
    #[serde(default = "default_public")]
    pub public: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            components: default_components(),
            examples: default_examples(),
            views: None,
            public: default_public(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct TemplatesConfig {
    #[serde(default)]
    pub macro_prefix: String,
    #[serde(default)]
    pub reload: ReloadMode,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_robots_header")]
    pub robots_header: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            robots_header: default_robots_header(),
        }
    }
}

fn default_components() -> String {
    "src/components".to_string()
}
fn default_examples() -> String {
    "src/examples".to_string()
}
fn default_public() -> Option<String> {
    Some("public".to_string())
}
fn default_exclude() -> Vec<String> {
    vec!["globals".to_string(), "all".to_string(), "icons".to_string()]
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_robots_header() -> bool {
    true
}

impl ConfigFile {
    /// Server configuration for this file, with paths relative to the
    /// working directory.
    pub fn into_server_config(self) -> ServerConfig {
        ServerConfig {
            components_dir: PathBuf::from(self.paths.components),
            examples_dir: PathBuf::from(self.paths.examples),
            views_dir: self.paths.views.map(PathBuf::from),
            public_dir: self.paths.public.map(PathBuf::from),
            catalog_exclude: self.catalog.exclude,
            macro_prefix: self.templates.macro_prefix,
            reload: self.templates.reload,
            robots_header: self.server.robots_header,
            port: self.server.port,
            host: self.server.host,
            open: false,
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
