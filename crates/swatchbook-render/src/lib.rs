//! Template environment and component macro previews.
//!
//! Pages and component macros are rendered with minijinja. Component previews
//! call a component's macro directly with its example data instead of
//! generating template source.

pub mod preview;
pub mod templates;

pub use preview::{
    build_preview, render_examples, ComponentExamples, MacroInvocation, PreviewError,
    RenderedExample, RenderedPreview,
};
pub use templates::{ReloadMode, RenderError, TemplateConfig, TemplateEnvironment};
