//! HTTP server for browsing and previewing swatchbook components.
//!
//! Serves the component index, per-component pages with every example
//! rendered, isolated example previews and example pages. Component data and
//! directory listings are read from disk on every request.

pub mod error;
pub mod negotiate;
pub mod routes;
pub mod server;
pub mod watcher;

pub use error::SiteError;
pub use negotiate::{negotiate, RequestContext, ResponseFormat};
pub use routes::router;
pub use server::{AppState, Server, ServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
