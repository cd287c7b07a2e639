//! Request errors and their negotiated responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use swatchbook_meta::{CatalogError, LoadError};
use swatchbook_render::{PreviewError, RenderError};

use crate::negotiate::{RequestContext, ResponseFormat};
use crate::server::AppState;

const NOT_FOUND_TITLE: &str = "Page not found";
const NOT_FOUND_MESSAGE: &str = "If you entered a web address please check it was correct.";
const INTERNAL_TITLE: &str = "Internal server error";

/// Returned when the error page template itself cannot be rendered.
const FALLBACK_ERROR_PAGE: &str =
    "<!DOCTYPE html><html lang=\"en\"><body><h1>Internal server error</h1></body></html>";

/// Every failure a request can end in.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl SiteError {
    pub fn status(&self) -> StatusCode {
        match self {
            SiteError::NotFound(_) => StatusCode::NOT_FOUND,
            SiteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the response for this error in the format the client asked for.
    pub fn into_response_for(self, state: &AppState, ctx: &RequestContext) -> Response {
        let status = self.status();

        let (error, short, message) = match &self {
            SiteError::NotFound(detail) => {
                tracing::debug!("404 {}: {}", ctx.url, detail);
                (NOT_FOUND_TITLE, "Not found", NOT_FOUND_MESSAGE.to_string())
            }
            SiteError::Internal(detail) => {
                tracing::error!("500 {}: {}", ctx.url, detail);
                (INTERNAL_TITLE, INTERNAL_TITLE, detail.clone())
            }
        };

        match ctx.format {
            ResponseFormat::Html => {
                let page = ErrorPage {
                    error,
                    message: &message,
                    url: &ctx.url,
                };
                let html = state
                    .templates
                    .render_page("http-error.njk", &page)
                    .unwrap_or_else(|e| {
                        tracing::warn!("Failed to render error page: {}", e);
                        FALLBACK_ERROR_PAGE.to_string()
                    });
                (status, Html(html)).into_response()
            }
            ResponseFormat::Json => {
                let body = match self {
                    SiteError::NotFound(_) => ErrorBody {
                        error: short,
                        message: None,
                    },
                    SiteError::Internal(_) => ErrorBody {
                        error: short,
                        message: Some(message.as_str()),
                    },
                };
                (status, Json(body)).into_response()
            }
            ResponseFormat::Text => (status, short).into_response(),
        }
    }
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    error: &'a str,
    message: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl From<CatalogError> for SiteError {
    fn from(err: CatalogError) -> Self {
        SiteError::Internal(err.to_string())
    }
}

impl From<LoadError> for SiteError {
    fn from(err: LoadError) -> Self {
        if err.is_not_found() {
            SiteError::NotFound(err.to_string())
        } else {
            SiteError::Internal(err.to_string())
        }
    }
}

impl From<RenderError> for SiteError {
    fn from(err: RenderError) -> Self {
        if err.is_not_found() {
            SiteError::NotFound(err.to_string())
        } else {
            SiteError::Internal(err.to_string())
        }
    }
}

impl From<PreviewError> for SiteError {
    fn from(err: PreviewError) -> Self {
        if err.is_not_found() {
            SiteError::NotFound(err.to_string())
        } else {
            SiteError::Internal(err.to_string())
        }
    }
}
