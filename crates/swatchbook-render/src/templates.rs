//! Template engine for rendering pages and component macros.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use minijinja::{path_loader, AutoEscape, Environment, ErrorKind, Value};
use serde::{Deserialize, Serialize};

use swatchbook_meta::{component_name_to_macro_name, titlecase};

/// When compiled templates are thrown away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadMode {
    /// Recompile templates for every render
    #[default]
    EveryRequest,

    /// Recompile after a file watcher reports a change
    Watch,

    /// Keep compiled templates for the life of the process
    Cached,
}

/// Configuration for a [`TemplateEnvironment`].
#[derive(Debug, Clone, Default)]
pub struct TemplateConfig {
    /// Directories searched for templates, in order, before the built-in layouts
    pub search_paths: Vec<PathBuf>,

    /// Prefix used by the `component_name_to_macro_name` filter
    pub macro_prefix: String,

    pub reload: ReloadMode,
}

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Macro '{macro_name}' is not defined in {template}")]
    MacroNotFound {
        template: String,
        macro_name: String,
    },

    #[error("Failed to render {template}: {source}")]
    Template {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

impl RenderError {
    fn from_template(template: &str, source: minijinja::Error) -> Self {
        RenderError::Template {
            template: template.to_string(),
            source,
        }
    }

    /// Whether the requested template does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::TemplateNotFound(_))
    }
}

/// Template engine using minijinja.
///
/// Templates are looked up in the configured search paths and then in the
/// built-in layouts, so a file on disk named like a layout overrides it.
pub struct TemplateEnvironment {
    env: RwLock<Environment<'static>>,
    reload: ReloadMode,
    search_paths: Vec<PathBuf>,
}

impl TemplateEnvironment {
    /// Create a template environment from its configuration.
    pub fn new(config: &TemplateConfig) -> Self {
        let mut env = Environment::new();

        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_path_join_callback(join_relative);
        env.set_loader(search_path_loader(&config.search_paths));

        let prefix = config.macro_prefix.clone();
        env.add_filter("component_name_to_macro_name", move |name: String| {
            component_name_to_macro_name(&prefix, &name)
        });
        env.add_filter("titlecase", |name: String| titlecase(&name));

        Self {
            env: RwLock::new(env),
            reload: config.reload,
            search_paths: config.search_paths.clone(),
        }
    }

    pub fn reload_mode(&self) -> ReloadMode {
        self.reload
    }

    /// Directories searched for templates.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Drop every compiled template so the next render reads from disk.
    pub fn reload(&self) {
        self.env
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_templates();
    }

    /// Render a page template with the given context.
    pub fn render_page<S: Serialize>(&self, template: &str, ctx: S) -> Result<String, RenderError> {
        self.refresh();
        let env = self.read();

        let tmpl = env.get_template(template).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                RenderError::TemplateNotFound(template.to_string())
            } else {
                RenderError::from_template(template, e)
            }
        })?;

        tmpl.render(ctx)
            .map_err(|e| RenderError::from_template(template, e))
    }

    /// Call `macro_name` defined in `template` with a single parameter object.
    ///
    /// The output is trimmed of surrounding whitespace.
    pub fn call_macro<S: Serialize>(
        &self,
        template: &str,
        macro_name: &str,
        params: &S,
    ) -> Result<String, RenderError> {
        self.refresh();
        let env = self.read();

        let tmpl = env
            .get_template(template)
            .map_err(|e| RenderError::from_template(template, e))?;
        let (_, state) = tmpl
            .render_and_return_state(())
            .map_err(|e| RenderError::from_template(template, e))?;

        if state.lookup(macro_name).is_none() {
            return Err(RenderError::MacroNotFound {
                template: template.to_string(),
                macro_name: macro_name.to_string(),
            });
        }

        let markup = state
            .call_macro(macro_name, &[Value::from_serialize(params)])
            .map_err(|e| RenderError::from_template(template, e))?;

        Ok(markup.trim().to_string())
    }

    fn refresh(&self) {
        if self.reload == ReloadMode::EveryRequest {
            self.reload();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Environment<'static>> {
        self.env.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TemplateEnvironment {
    fn default() -> Self {
        Self::new(&TemplateConfig::default())
    }
}

/// Loader that tries each search path in order, then the built-in layouts.
fn search_path_loader(
    paths: &[PathBuf],
) -> impl Fn(&str) -> Result<Option<String>, minijinja::Error> + Send + Sync + 'static {
    let loaders: Vec<_> = paths.iter().map(|dir| path_loader(dir.clone())).collect();

    move |name: &str| {
        for loader in &loaders {
            if let Some(source) = loader(name)? {
                return Ok(Some(source));
            }
        }
        Ok(builtin_layout(name).map(str::to_string))
    }
}

/// Resolve `./` and `../` template names against the including template.
fn join_relative<'s>(name: &'s str, parent: &'s str) -> Cow<'s, str> {
    if !name.starts_with("./") && !name.starts_with("../") {
        return Cow::Borrowed(name);
    }

    let mut segments: Vec<&str> = parent.split('/').collect();
    segments.pop();

    for segment in name.split('/') {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    Cow::Owned(segments.join("/"))
}

fn builtin_layout(name: &str) -> Option<&'static str> {
    match name {
        "layout.njk" => Some(LAYOUT_TEMPLATE),
        "index.njk" => Some(INDEX_TEMPLATE),
        "component.njk" => Some(COMPONENT_TEMPLATE),
        "component-preview.njk" => Some(COMPONENT_PREVIEW_TEMPLATE),
        "http-error.njk" => Some(HTTP_ERROR_TEMPLATE),
        _ => None,
    }
}

const LAYOUT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}Swatchbook{% endblock %}</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0; }
    .app-main { max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
    .app-example__frame { width: 100%; min-height: 12rem; border: 1px solid #b1b4b6; }
    pre { background: #f5f5f5; padding: 1rem; border-radius: 0.5rem; overflow-x: auto; }
  </style>
  {% block head %}{% endblock %}
</head>
<body{% if body_classes %} class="{{ body_classes }}"{% endif %}>
{% block body %}{% endblock %}
</body>
</html>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "layout.njk" %}

{% block body %}
<main class="app-main">
  <h1>Components</h1>
  <ul class="app-component-list">
  {% for name, node in components|items %}
    {% if node.kind == "directory" %}
    <li>
      <a href="/components/{{ name }}">{{ name|titlecase }}</a>
      (<a href="/components/{{ name }}/preview">preview</a>)
    </li>
    {% else %}
    <li class="app-component-list__file">{{ name }}</li>
    {% endif %}
  {% endfor %}
  </ul>

  {% if examples %}
  <h2>Examples</h2>
  <ul class="app-example-list">
  {% for name, node in examples|items %}
    {% if node.kind == "directory" %}
    <li><a href="/examples/{{ name }}">{{ name|titlecase }}</a></li>
    {% endif %}
  {% endfor %}
  </ul>
  {% endif %}
</main>
{% endblock %}"##;

const COMPONENT_TEMPLATE: &str = r##"{% extends "layout.njk" %}

{% block title %}{{ title }} - Swatchbook{% endblock %}

{% block body %}
<main class="app-main">
  <a href="/" class="app-back-link">All components</a>
  <h1>{{ title }}</h1>

  {% for example in examples %}
  <section class="app-example" id="example-{{ example.name }}">
    <h2>{{ example.name|titlecase }}</h2>
    <iframe class="app-example__frame" src="/components/{{ name }}/{{ example.name }}/preview?iframe=1" title="{{ title }} example: {{ example.name }}"></iframe>
    <p><a href="/components/{{ name }}/{{ example.name }}/preview">Open this example in a new window</a></p>

    <h3>Markup</h3>
    <pre><code class="language-html">{{ example.markup }}</code></pre>

    <h3>Macro</h3>
    <pre><code>{{ example.snippet }}</code></pre>
  </section>
  {% endfor %}

  {% if data.params %}
  <h2>Parameters</h2>
  <table class="app-params">
    <thead>
      <tr><th>Name</th><th>Type</th><th>Required</th><th>Description</th></tr>
    </thead>
    <tbody>
    {% for param in data.params %}
      <tr>
        <td><code>{{ param.name }}</code></td>
        <td>{{ param.type or "" }}</td>
        <td>{{ "Yes" if param.required else "No" }}</td>
        <td>{{ param.description or "" }}</td>
      </tr>
    {% endfor %}
    </tbody>
  </table>
  {% endif %}

  {% if data.accessibility_criteria %}
  <h2>Accessibility criteria</h2>
  <div class="app-accessibility">{{ data.accessibility_criteria }}</div>
  {% endif %}
</main>
{% endblock %}"##;

const COMPONENT_PREVIEW_TEMPLATE: &str = r##"{% extends "layout.njk" %}

{% block title %}{{ title }} example: {{ example }} - Swatchbook{% endblock %}

{% block body %}
{{ component_view|safe }}
{% endblock %}"##;

const HTTP_ERROR_TEMPLATE: &str = r##"{% extends "layout.njk" %}

{% block title %}{{ error }} - Swatchbook{% endblock %}

{% block body %}
<main class="app-main">
  <h1>{{ error }}</h1>
  <p>{{ message }}</p>
  {% if url %}
  <p><code>{{ url }}</code></p>
  {% endif %}
</main>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;
    use std::fs;
    use tempfile::tempdir;

    fn engine_with(dir: &std::path::Path, reload: ReloadMode) -> TemplateEnvironment {
        TemplateEnvironment::new(&TemplateConfig {
            search_paths: vec![dir.to_path_buf()],
            macro_prefix: String::new(),
            reload,
        })
    }

    #[test]
    fn renders_builtin_error_page() {
        let engine = TemplateEnvironment::default();

        let html = engine
            .render_page(
                "http-error.njk",
                context! {
                    error => "Page not found",
                    message => "Check the address",
                    url => "/nope",
                },
            )
            .unwrap();

        assert!(html.contains("<title>Page not found - Swatchbook</title>"));
        assert!(html.contains("<h1>Page not found</h1>"));
        assert!(html.contains("nope</code>"));
    }

    #[test]
    fn escapes_context_values() {
        let engine = TemplateEnvironment::default();

        let html = engine
            .render_page(
                "http-error.njk",
                context! { error => "Oops", message => "<script>alert(1)</script>" },
            )
            .unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn search_path_overrides_builtin_layout() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("http-error.njk"), "custom {{ error }}").unwrap();
        let engine = engine_with(temp.path(), ReloadMode::Cached);

        let html = engine
            .render_page("http-error.njk", context! { error => "Gone" })
            .unwrap();

        assert_eq!(html, "custom Gone");
    }

    #[test]
    fn reports_missing_templates() {
        let temp = tempdir().unwrap();
        let engine = engine_with(temp.path(), ReloadMode::Cached);

        let err = engine.render_page("nope/index.njk", ()).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn resolves_relative_includes() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("cards")).unwrap();
        fs::write(
            temp.path().join("cards/index.njk"),
            r#"<div>{% include "./body.njk" %}</div>"#,
        )
        .unwrap();
        fs::write(temp.path().join("cards/body.njk"), "card body").unwrap();
        let engine = engine_with(temp.path(), ReloadMode::Cached);

        let html = engine.render_page("cards/index.njk", ()).unwrap();

        assert_eq!(html, "<div>card body</div>");
    }

    #[test]
    fn joins_relative_names() {
        assert_eq!(join_relative("./template.njk", "button/macro.njk"), "button/template.njk");
        assert_eq!(join_relative("../tag/macro.njk", "button/macro.njk"), "tag/macro.njk");
        assert_eq!(join_relative("layout.njk", "button/macro.njk"), "layout.njk");
    }

    #[test]
    fn applies_name_filters() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("names.njk"),
            "{{ 'back-link'|component_name_to_macro_name }} {{ 'back-link'|titlecase }}",
        )
        .unwrap();
        let engine = TemplateEnvironment::new(&TemplateConfig {
            search_paths: vec![temp.path().to_path_buf()],
            macro_prefix: "govuk".to_string(),
            reload: ReloadMode::Cached,
        });

        let out = engine.render_page("names.njk", ()).unwrap();

        assert_eq!(out, "govukBackLink Back link");
    }

    #[test]
    fn calls_macro_with_parameter_object() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("button")).unwrap();
        fs::write(
            temp.path().join("button/macro.njk"),
            "{% macro button(params) %}\n  <button>{{ params.text }}</button>\n{% endmacro %}\n",
        )
        .unwrap();
        let engine = engine_with(temp.path(), ReloadMode::Cached);

        let markup = engine
            .call_macro(
                "button/macro.njk",
                "button",
                &serde_json::json!({ "text": "Save & continue" }),
            )
            .unwrap();

        assert_eq!(markup, "<button>Save &amp; continue</button>");
    }

    #[test]
    fn reports_undefined_macro() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("tag")).unwrap();
        fs::write(temp.path().join("tag/macro.njk"), "").unwrap();
        let engine = engine_with(temp.path(), ReloadMode::Cached);

        let err = engine
            .call_macro("tag/macro.njk", "tag", &serde_json::json!({}))
            .unwrap_err();

        assert!(matches!(err, RenderError::MacroNotFound { .. }));
    }

    #[test]
    fn cached_mode_keeps_templates_until_reload() {
        let temp = tempdir().unwrap();
        let page = temp.path().join("page.njk");
        fs::write(&page, "first").unwrap();
        let engine = engine_with(temp.path(), ReloadMode::Cached);

        assert_eq!(engine.render_page("page.njk", ()).unwrap(), "first");

        fs::write(&page, "second").unwrap();
        assert_eq!(engine.render_page("page.njk", ()).unwrap(), "first");

        engine.reload();
        assert_eq!(engine.render_page("page.njk", ()).unwrap(), "second");
    }

    #[test]
    fn every_request_mode_reads_fresh_templates() {
        let temp = tempdir().unwrap();
        let page = temp.path().join("page.njk");
        fs::write(&page, "first").unwrap();
        let engine = engine_with(temp.path(), ReloadMode::EveryRequest);

        assert_eq!(engine.render_page("page.njk", ()).unwrap(), "first");

        fs::write(&page, "second").unwrap();
        assert_eq!(engine.render_page("page.njk", ()).unwrap(), "second");
    }

    #[test]
    fn parses_reload_mode_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            reload: ReloadMode,
        }

        let parsed: Wrapper = serde_json::from_str(r#"{"reload":"every-request"}"#).unwrap();
        assert_eq!(parsed.reload, ReloadMode::EveryRequest);

        let parsed: Wrapper = serde_json::from_str(r#"{"reload":"watch"}"#).unwrap();
        assert_eq!(parsed.reload, ReloadMode::Watch);
    }
}
