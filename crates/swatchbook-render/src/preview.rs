//! Component previews.
//!
//! A preview calls a component's macro from `{component}/macro.njk` with the
//! data of one of its examples. The macro is looked up and called through the
//! template engine, so example data never becomes template source.

use serde::Serialize;

use swatchbook_meta::{ComponentData, ComponentLibrary, ExampleSpec, LoadError, DEFAULT_EXAMPLE};

use crate::templates::{RenderError, TemplateEnvironment};

/// A call of one component macro with one parameter object.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroInvocation {
    pub component_name: String,
    pub macro_name: String,
    pub template_name: String,
    pub params: serde_json::Value,
}

impl MacroInvocation {
    /// Build the invocation for `component` with `params`.
    pub fn new(library: &ComponentLibrary, component: &str, params: serde_json::Value) -> Self {
        Self {
            component_name: component.to_string(),
            macro_name: library.macro_name(component),
            template_name: format!("{}/macro.njk", component),
            params,
        }
    }

    /// Render the macro and return its trimmed markup.
    pub fn render(&self, templates: &TemplateEnvironment) -> Result<String, RenderError> {
        templates.call_macro(&self.template_name, &self.macro_name, &self.params)
    }

    /// Template code a reader would write to make this call, for display.
    pub fn snippet(&self) -> String {
        let params = serde_json::to_string_pretty(&self.params).unwrap_or_else(|_| "{}".into());

        format!(
            "{{% from \"{}\" import {} %}}\n\n{{{{ {}({}) }}}}",
            self.template_name, self.macro_name, self.macro_name, params
        )
    }
}

/// One rendered example of a component.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedExample {
    pub name: String,
    pub markup: String,
    pub snippet: String,
}

/// Output of [`build_preview`].
#[derive(Debug, Clone)]
pub struct RenderedPreview {
    pub component: ComponentData,
    pub example: String,
    pub markup: String,
}

/// Output of [`render_examples`].
#[derive(Debug, Clone)]
pub struct ComponentExamples {
    pub data: ComponentData,
    pub examples: Vec<RenderedExample>,
}

/// Errors that can occur while building a preview.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Example '{example}' not found for component '{component}'")]
    ExampleNotFound { component: String, example: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PreviewError {
    /// Whether the component or example does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            PreviewError::Load(e) => e.is_not_found(),
            PreviewError::ExampleNotFound { .. } => true,
            PreviewError::Render(e) => e.is_not_found(),
        }
    }
}

/// Render one example of `component`, `"default"` when `example` is `None`.
///
/// Component data is read from disk on every call.
pub fn build_preview(
    templates: &TemplateEnvironment,
    library: &ComponentLibrary,
    component: &str,
    example: Option<&str>,
) -> Result<RenderedPreview, PreviewError> {
    let data = library.load_component(component)?;
    let example_name = example.unwrap_or(DEFAULT_EXAMPLE);

    let spec = data
        .example(example_name)
        .ok_or_else(|| PreviewError::ExampleNotFound {
            component: component.to_string(),
            example: example_name.to_string(),
        })?;

    let markup = render_example(templates, library, component, spec)?.markup;

    Ok(RenderedPreview {
        example: example_name.to_string(),
        component: data,
        markup,
    })
}

/// Render every example of `component` in file order.
pub fn render_examples(
    templates: &TemplateEnvironment,
    library: &ComponentLibrary,
    component: &str,
) -> Result<ComponentExamples, PreviewError> {
    let data = library.load_component(component)?;

    let examples = data
        .examples
        .iter()
        .map(|spec| render_example(templates, library, component, spec))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ComponentExamples { data, examples })
}

fn render_example(
    templates: &TemplateEnvironment,
    library: &ComponentLibrary,
    component: &str,
    spec: &ExampleSpec,
) -> Result<RenderedExample, RenderError> {
    let invocation = MacroInvocation::new(library, component, spec.data.clone());

    tracing::debug!(
        "Rendering {} example '{}' with {}",
        component,
        spec.name,
        invocation.macro_name
    );

    Ok(RenderedExample {
        name: spec.name.clone(),
        markup: invocation.render(templates)?,
        snippet: invocation.snippet(),
    })
}
