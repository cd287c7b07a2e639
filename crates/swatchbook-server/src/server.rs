//! Server configuration, shared state and startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use swatchbook_meta::ComponentLibrary;
use swatchbook_render::{ReloadMode, TemplateConfig, TemplateEnvironment};

use crate::routes::router;
use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory containing one subdirectory per component
    pub components_dir: PathBuf,

    /// Directory containing example pages (`{name}/index.njk`)
    pub examples_dir: PathBuf,

    /// Directory of layout overrides, searched before everything else
    pub views_dir: Option<PathBuf>,

    /// Directory served under `/public`
    pub public_dir: Option<PathBuf>,

    /// Top-level component entries hidden from the index
    pub catalog_exclude: Vec<String>,

    /// Prefix for component macro names
    pub macro_prefix: String,

    /// When compiled templates are dropped
    pub reload: ReloadMode,

    /// Send `X-Robots-Tag: none` on every response
    pub robots_header: bool,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            components_dir: PathBuf::from("src/components"),
            examples_dir: PathBuf::from("src/examples"),
            views_dir: None,
            public_dir: Some(PathBuf::from("public")),
            catalog_exclude: vec![
                "globals".to_string(),
                "all".to_string(),
                "icons".to_string(),
            ],
            macro_prefix: String::new(),
            reload: ReloadMode::default(),
            robots_header: true,
            port: 3000,
            host: "127.0.0.1".to_string(),
            open: false,
        }
    }
}

impl ServerConfig {
    /// Template search path: views, then examples, then components.
    pub fn template_search_paths(&self) -> Vec<PathBuf> {
        self.views_dir
            .iter()
            .cloned()
            .chain([self.examples_dir.clone(), self.components_dir.clone()])
            .collect()
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Server on {0} stopped: {1}")]
    Serve(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// State shared by every request handler.
pub struct AppState {
    pub config: ServerConfig,
    pub library: ComponentLibrary,
    pub templates: TemplateEnvironment,
}

impl AppState {
    /// Build the component library and template environment for `config`.
    pub fn new(config: ServerConfig) -> Self {
        let templates = TemplateEnvironment::new(&TemplateConfig {
            search_paths: config.template_search_paths(),
            macro_prefix: config.macro_prefix.clone(),
            reload: config.reload,
        });
        let library = ComponentLibrary::new(&config.components_dir, &config.macro_prefix);

        Self {
            config,
            library,
            templates,
        }
    }
}

/// Component library server.
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Start the server and run until it fails.
    pub async fn start(self) -> Result<(), ServerError> {
        let address = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| ServerError::InvalidAddress(address.clone()))?;

        let state = Arc::new(AppState::new(self.config));

        if state.templates.reload_mode() == ReloadMode::Watch {
            spawn_template_watcher(&state)?;
        }

        let app = router(Arc::clone(&state));

        let url = format!("http://{}", addr);
        tracing::info!("Listening on port {}   url: {}", addr.port(), url);

        if state.config.open {
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Serve(addr, e.to_string()))?;

        Ok(())
    }
}

/// Clear compiled templates whenever a file under a template directory changes.
fn spawn_template_watcher(state: &Arc<AppState>) -> Result<(), ServerError> {
    let paths = state.templates.search_paths().to_vec();
    let (watcher, mut rx) =
        FileWatcher::new(&paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

    tracing::info!("Watching {} template directories for changes", paths.len());

    let state = Arc::clone(state);
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            handle_watch_event(&state, &event);
        }
        // Keep watcher alive
        drop(watcher);
    });

    Ok(())
}

fn handle_watch_event(state: &AppState, event: &WatchEvent) {
    if event.invalidates_templates() {
        tracing::info!("Template change: {}", event.path().display());
        state.templates.reload();
    } else {
        tracing::debug!("Data change: {}", event.path().display());
    }
}
