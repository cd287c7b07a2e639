//! Router construction and page handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::handler::Handler;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use swatchbook_meta::{catalog, is_valid_name, titlecase, CatalogError, CatalogNode, ComponentData};
use swatchbook_render::{build_preview, render_examples, RenderedExample};

use crate::error::SiteError;
use crate::negotiate::RequestContext;
use crate::server::AppState;

/// Body class that lets preview styles adapt to being embedded in an iframe.
pub const IFRAME_BODY_CLASS: &str = "app-iframe-in-component-preview";

const ROBOTS_TXT: &str = "User-agent: *\nDisallow: /";

/// Create the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/components/{name}", get(component_page))
        .route("/components/{name}/preview", get(default_preview))
        .route("/components/{name}/{example}/preview", get(example_preview))
        .route("/examples/{example}", get(example_page))
        .route("/robots.txt", get(robots));

    // Static misses get the same negotiated 404 as unknown routes
    let missing = not_found.with_state(Arc::clone(&state));

    if let Some(public_dir) = &state.config.public_dir {
        router = router.nest_service("/public", ServeDir::new(public_dir).fallback(missing.clone()));
    }

    let icons_dir = state.config.components_dir.join("icons");
    router = router
        .nest_service("/icons", ServeDir::new(icons_dir).fallback(missing))
        .fallback(not_found);

    if state.config.robots_header {
        // none - equivalent to noindex, nofollow
        router = router.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-robots-tag"),
            HeaderValue::from_static("none"),
        ));
    }

    router.with_state(state)
}

#[derive(Serialize)]
struct IndexPage {
    components: BTreeMap<String, CatalogNode>,
    examples: BTreeMap<String, CatalogNode>,
}

#[derive(Serialize)]
struct ComponentPage<'a> {
    name: &'a str,
    title: String,
    data: &'a ComponentData,
    examples: &'a [RenderedExample],
}

#[derive(Serialize)]
struct PreviewPage<'a> {
    title: String,
    example: &'a str,
    body_classes: &'a str,
    component_data: &'a ComponentData,
    component_view: &'a str,
}

/// Query string of a preview request, read as raw pairs so repeated or odd
/// keys never reject the request.
type PreviewQuery = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Whether any `iframe` value in the query is non-empty.
fn embedded(query: PreviewQuery) -> bool {
    match query {
        Ok(Query(pairs)) => pairs
            .iter()
            .any(|(key, value)| key == "iframe" && !value.is_empty()),
        Err(e) => {
            tracing::debug!("Ignoring unreadable query string: {}", e);
            false
        }
    }
}

/// Path segments that fail to extract, such as invalid UTF-8, are a 404.
fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, SiteError> {
    path.map(|Path(value)| value)
        .map_err(|e| SiteError::NotFound(e.body_text()))
}

fn respond(state: &AppState, ctx: &RequestContext, result: Result<String, SiteError>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(err) => err.into_response_for(state, ctx),
    }
}

/// Index page: component and example listings.
async fn index(State(state): State<Arc<AppState>>, ctx: RequestContext) -> Response {
    respond(&state, &ctx, render_index(&state))
}

fn render_index(state: &AppState) -> Result<String, SiteError> {
    let components = catalog(&state.config.components_dir)?
        .without_children(state.config.catalog_exclude.as_slice())
        .into_children();

    let examples = match catalog(&state.config.examples_dir) {
        Ok(tree) => tree.into_children(),
        Err(CatalogError::RootNotFound(path)) => {
            tracing::debug!("No examples directory at {}", path.display());
            BTreeMap::new()
        }
        Err(e) => return Err(e.into()),
    };

    let page = IndexPage {
        components,
        examples,
    };
    Ok(state.templates.render_page("index.njk", &page)?)
}

/// Component page: every example rendered with its markup and macro call.
async fn component_page(
    State(state): State<Arc<AppState>>,
    name: Result<Path<String>, PathRejection>,
    ctx: RequestContext,
) -> Response {
    let result = path_param(name).and_then(|name| render_component_page(&state, &name));
    respond(&state, &ctx, result)
}

fn render_component_page(state: &AppState, name: &str) -> Result<String, SiteError> {
    let rendered = render_examples(&state.templates, &state.library, name)?;

    let page = ComponentPage {
        name,
        title: titlecase(name),
        data: &rendered.data,
        examples: &rendered.examples,
    };
    Ok(state.templates.render_page("component.njk", &page)?)
}

/// Preview of the default example.
async fn default_preview(
    State(state): State<Arc<AppState>>,
    name: Result<Path<String>, PathRejection>,
    query: PreviewQuery,
    ctx: RequestContext,
) -> Response {
    let embed = embedded(query);
    let result = path_param(name).and_then(|name| render_preview(&state, &name, None, embed));
    respond(&state, &ctx, result)
}

/// Preview of a named example.
async fn example_preview(
    State(state): State<Arc<AppState>>,
    params: Result<Path<(String, String)>, PathRejection>,
    query: PreviewQuery,
    ctx: RequestContext,
) -> Response {
    let embed = embedded(query);
    let result = path_param(params)
        .and_then(|(name, example)| render_preview(&state, &name, Some(&example), embed));
    respond(&state, &ctx, result)
}

fn render_preview(
    state: &AppState,
    name: &str,
    example: Option<&str>,
    embed: bool,
) -> Result<String, SiteError> {
    let preview = build_preview(&state.templates, &state.library, name, example)?;

    let page = PreviewPage {
        title: titlecase(name),
        example: &preview.example,
        body_classes: if embed {
            IFRAME_BODY_CLASS
        } else {
            ""
        },
        component_data: &preview.component,
        component_view: &preview.markup,
    };
    Ok(state
        .templates
        .render_page("component-preview.njk", &page)?)
}

/// Example page rendered from `{example}/index.njk`.
async fn example_page(
    State(state): State<Arc<AppState>>,
    example: Result<Path<String>, PathRejection>,
    ctx: RequestContext,
) -> Response {
    let result = path_param(example).and_then(|example| render_example_page(&state, &example));
    respond(&state, &ctx, result)
}

fn render_example_page(state: &AppState, example: &str) -> Result<String, SiteError> {
    if !is_valid_name(example) {
        return Err(SiteError::NotFound(format!("Invalid example name: {:?}", example)));
    }

    Ok(state
        .templates
        .render_page(&format!("{}/index.njk", example), ())?)
}

async fn robots() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ROBOTS_TXT,
    )
}

/// Nothing else matched.
async fn not_found(State(state): State<Arc<AppState>>, ctx: RequestContext) -> Response {
    SiteError::NotFound(format!("No route for {}", ctx.url)).into_response_for(&state, &ctx)
}
